//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Questo modulo organizza i repository in sotto-moduli separati per una migliore manutenibilità.
//! Ogni repository gestisce le operazioni di database per una specifica entità.
//!
//! Le query usano `sqlx::query_as` con entità `FromRow` invece delle macro
//! `query!`: così il crate compila anche senza un database raggiungibile.

pub mod category;
pub mod certificate;
pub mod client;
pub mod lookup;
pub mod order;
pub mod packaging;
pub mod password_reset;
pub mod product;
pub mod question;
pub mod traits;
pub mod user;

pub use category::CategoryRepository;
pub use certificate::CertificateRepository;
pub use client::ClientRepository;
pub use lookup::{LookupKind, LookupRepository};
pub use order::OrderRepository;
pub use packaging::PackagingRepository;
pub use password_reset::PasswordResetRepository;
pub use product::ProductRepository;
pub use question::QuestionRepository;
pub use traits::{Create, Delete, Read, Update};
pub use user::UserRepository;

/// Id AUTO_INCREMENT della riga appena inserita; le colonne id sono INT
pub(crate) fn inserted_id(last_insert_id: u64) -> Result<i32, sqlx::Error> {
    i32::try_from(last_insert_id).map_err(|_| {
        sqlx::Error::Protocol(format!(
            "Inserted id {} does not fit an INT column",
            last_insert_id
        ))
    })
}
