//! Auth DTOs - Login, registrazione e recupero password

use super::validation::{PHONE_RE, TAX_ID_RE};
use crate::entities::{ClientProfile, ClientType, Role, User};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// DTO per il login (solo email e password)
#[derive(Deserialize, Debug)]
pub struct LoginDTO {
    pub email: String,
    pub password: String,
}

/// Self-registration of a client account
#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDTO {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,
    pub client_type: ClientType,
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number"))]
    pub phone: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    /// Individuals only
    #[validate(length(min = 2, max = 255))]
    pub full_name: Option<String>,
    /// Legal entities only
    #[validate(length(min = 2, max = 255))]
    pub company_name: Option<String>,
    #[validate(regex(path = *TAX_ID_RE, message = "Tax id must have 10 or 12 digits"))]
    pub tax_id: Option<String>,
    #[validate(length(max = 32))]
    pub registration_number: Option<String>,
    #[validate(length(max = 255))]
    pub legal_address: Option<String>,
}

#[derive(Deserialize, Debug, Validate)]
pub struct ForgotPasswordDTO {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[derive(Deserialize, Debug, Validate)]
pub struct ResetPasswordDTO {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,
}

/// Profilo di sessione restituito al login
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionDTO {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
    pub client_id: Option<i32>,
    pub client_type: Option<ClientType>,
    pub display_name: Option<String>,
}

impl SessionDTO {
    pub fn new(user: &User, profile: Option<&ClientProfile>) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email.clone(),
            role: user.role,
            client_id: profile.map(|p| p.client.client_id),
            client_type: profile.map(|p| p.client.client_type),
            display_name: profile.map(|p| p.details.display_name().to_string()),
        }
    }
}
