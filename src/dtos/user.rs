//! User DTOs - Data Transfer Objects per utenti

use crate::entities::{ClientProfile, ClientType, Role, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// struct per gestire io col client
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserDTO {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientSummaryDTO>,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            user_id: value.user_id,
            email: value.email,
            role: value.role,
            is_active: value.is_active,
            created_at: value.created_at,
            client: None, // da popolare manualmente se necessario
        }
    }
}

impl UserDTO {
    pub fn with_client(mut self, profile: Option<&ClientProfile>) -> Self {
        self.client = profile.map(ClientSummaryDTO::from);
        self
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummaryDTO {
    pub client_id: i32,
    pub client_type: ClientType,
    pub display_name: String,
}

impl From<&ClientProfile> for ClientSummaryDTO {
    fn from(value: &ClientProfile) -> Self {
        Self {
            client_id: value.client.client_id,
            client_type: value.client.client_type,
            display_name: value.details.display_name().to_string(),
        }
    }
}

/// DTO per creare un nuovo utente dal back office
#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserDTO {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,
    pub role_id: i32,
}

/// DTO per aggiornare un utente (solo i campi `Some(_)` vengono modificati)
#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDTO {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: Option<String>,
    pub role_id: Option<i32>,
    pub is_active: Option<bool>,
}

/// Riga da inserire: la password è già hashata
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Modifiche già validate, con password hashata
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}
