//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati per una migliore manutenibilità.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod profile;
pub mod question;
pub mod upload;

// Re-exports per facilitare l'import
pub use auth::{forgot_password, login_user, logout_user, register_user, reset_password};
pub use cart::{add_item, clear_cart, get_cart, remove_item, update_item};
pub use catalog::{get_product, list_categories, list_form_types, list_products};
pub use order::{cancel_my_order, get_my_order, list_my_orders, place_order};
pub use profile::{change_password, get_profile, update_profile};
pub use question::submit_question;
pub use upload::upload_contract;

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Root endpoint - health check
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
