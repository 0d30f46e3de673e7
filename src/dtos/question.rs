//! Question DTOs - Modulo contatti

use super::validation::PHONE_RE;
use crate::entities::Question;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Deserialize, Debug, Validate)]
pub struct CreateQuestionDTO {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "Message must be between 1 and 5000 characters"))]
    pub message: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDTO {
    pub question_id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub is_answered: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Question> for QuestionDTO {
    fn from(value: Question) -> Self {
        Self {
            question_id: value.question_id,
            name: value.name,
            email: value.email,
            phone: value.phone,
            message: value.message,
            is_answered: value.is_answered,
            created_at: value.created_at,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionDTO {
    pub is_answered: bool,
}
