use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PasswordReset {
    pub token: String,
    pub user_id: i32,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl PasswordReset {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.used && self.expires_at > now
    }
}
