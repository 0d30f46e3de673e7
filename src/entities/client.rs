//! Client entities - Acquirente registrato e dati anagrafici per tipologia

use super::enums::ClientType;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Client {
    pub client_id: i32,
    pub user_id: i32,
    pub client_type: ClientType,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Individual {
    pub client_id: i32,
    pub full_name: String,
    pub tax_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct LegalEntity {
    pub client_id: i32,
    pub company_name: String,
    pub tax_id: String,
    pub registration_number: Option<String>,
    pub legal_address: Option<String>,
    pub contract_path: Option<String>,
}

/// Registration data that depends on the client type
#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum ClientDetails {
    Individual(Individual),
    LegalEntity(LegalEntity),
}

impl ClientDetails {
    /// Name shown in the session and in admin listings
    pub fn display_name(&self) -> &str {
        match self {
            ClientDetails::Individual(individual) => &individual.full_name,
            ClientDetails::LegalEntity(entity) => &entity.company_name,
        }
    }
}

/// Client with its type-specific row
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ClientProfile {
    pub client: Client,
    pub details: ClientDetails,
}
