//! Profile DTOs - Profilo dell'utente autenticato

use super::validation::{PHONE_RE, TAX_ID_RE};
use crate::core::FileStore;
use crate::entities::{ClientDetails, ClientProfile, ClientType, Role, User};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDTO {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
    pub client: Option<ClientProfileDTO>,
}

impl ProfileDTO {
    pub fn new(user: &User, profile: Option<&ClientProfile>) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email.clone(),
            role: user.role,
            client: profile.map(ClientProfileDTO::from),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfileDTO {
    pub client_id: i32,
    pub client_type: ClientType,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub tax_id: Option<String>,
    pub registration_number: Option<String>,
    pub legal_address: Option<String>,
    pub contract_url: Option<String>,
}

impl From<&ClientProfile> for ClientProfileDTO {
    fn from(value: &ClientProfile) -> Self {
        let mut dto = Self {
            client_id: value.client.client_id,
            client_type: value.client.client_type,
            phone: value.client.phone.clone(),
            address: value.client.address.clone(),
            full_name: None,
            company_name: None,
            tax_id: None,
            registration_number: None,
            legal_address: None,
            contract_url: None,
        };
        match &value.details {
            ClientDetails::Individual(individual) => {
                dto.full_name = Some(individual.full_name.clone());
                dto.tax_id = individual.tax_id.clone();
            }
            ClientDetails::LegalEntity(entity) => {
                dto.company_name = Some(entity.company_name.clone());
                dto.tax_id = Some(entity.tax_id.clone());
                dto.registration_number = entity.registration_number.clone();
                dto.legal_address = entity.legal_address.clone();
                dto.contract_url = entity.contract_path.as_deref().map(FileStore::public_url);
            }
        }
        dto
    }
}

/// Campi modificabili dal cliente; quelli non pertinenti al tipo vengono ignorati
#[derive(Deserialize, Debug, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileDTO {
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number"))]
    pub phone: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(min = 2, max = 255))]
    pub full_name: Option<String>,
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
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordDTO {
    pub current_password: String,
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub new_password: String,
}
