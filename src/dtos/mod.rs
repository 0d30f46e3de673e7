//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod profile;
pub mod question;
pub mod user;
pub mod validation;

// Re-exports per facilitare l'import
pub use auth::{ForgotPasswordDTO, LoginDTO, RegisterDTO, ResetPasswordDTO, SessionDTO};
pub use cart::{
    Cart, CartItemDTO, CartLine, CartLineView, CartView, MAX_CART_LINES, normalize_quantity,
};
pub use catalog::{
    AdminProductDTO, CategoryDTO, CategoryPayloadDTO, CertificateDTO, CreatePackagingDTO,
    CreateProductDTO, LookupDTO, LookupPayloadDTO, PackagingDTO, PackagingOptionDTO,
    ProductDetailDTO, ProductQuery, ProductSummaryDTO, UpdatePackagingDTO, UpdateProductDTO,
};
pub use order::{
    AdminOrderQuery, OrderDTO, OrderDetailDTO, OrderItemDTO, StatusDTO, UpdateOrderStatusDTO,
};
pub use profile::{ChangePasswordDTO, ClientProfileDTO, ProfileDTO, UpdateProfileDTO};
pub use question::{CreateQuestionDTO, QuestionDTO, UpdateQuestionDTO};
pub use user::{ClientSummaryDTO, CreateUserDTO, NewUser, UpdateUserDTO, UserChanges, UserDTO};
