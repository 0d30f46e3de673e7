//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità (models) che rappresentano i dati persistiti nel database.
//! Ogni entity corrisponde a una tabella nel database.

pub mod catalog;
pub mod client;
pub mod enums;
pub mod order;
pub mod password_reset;
pub mod question;
pub mod user;

// Re-exports per facilitare l'import
pub use catalog::{
    Category, CertificateFile, Lookup, PackagingDetails, PackagingType, Product, ProductListing,
};
pub use client::{Client, ClientDetails, ClientProfile, Individual, LegalEntity};
pub use enums::{ClientType, OrderStatus, Role};
pub use order::{LinePricing, Order, OrderItem, OrderItemDetails, Status, round_money};
pub use password_reset::PasswordReset;
pub use question::Question;
pub use user::User;
