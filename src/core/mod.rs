//! Core Module - Componenti infrastrutturali dell'applicazione
//!
//! Questo modulo contiene tutti i componenti "core" dell'applicazione:
//! - Autenticazione, JWT e controllo accessi per ruolo
//! - Configurazione
//! - Gestione errori ed extractor
//! - Cookie e file caricati
//! - Stato applicazione

pub mod access;
pub mod auth;
pub mod config;
pub mod cookies;
pub mod error;
pub mod extract;
pub mod state;
pub mod storage;

// Re-exports per facilitare l'import
pub use access::{require_manageable, route_access_middleware};
pub use auth::{Claims, CurrentUser, authentication_middleware, decode_jwt, encode_jwt};
pub use config::Config;
pub use error::AppError;
pub use state::AppState;
pub use storage::{FileStore, UploadKind};
