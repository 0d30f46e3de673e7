//! Question entity - Richieste inviate dal modulo contatti

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Question {
    pub question_id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub is_answered: bool,
    pub created_at: DateTime<Utc>,
}
