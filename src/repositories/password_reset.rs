//! PasswordResetRepository - Token monouso per il recupero password

use crate::entities::PasswordReset;
use chrono::{DateTime, Utc};
use sqlx::{Error, MySqlPool};
use tracing::{info, instrument};

pub struct PasswordResetRepository {
    connection_pool: MySqlPool,
}

impl PasswordResetRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self, token))]
    pub async fn create(
        &self,
        token: &str,
        user_id: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        sqlx::query("INSERT INTO password_resets (token, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.connection_pool)
            .await?;
        Ok(())
    }

    pub async fn find(&self, token: &str) -> Result<Option<PasswordReset>, Error> {
        sqlx::query_as::<_, PasswordReset>(
            "SELECT token, user_id, expires_at, used FROM password_resets WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.connection_pool)
        .await
    }

    /// Marks the token used and stores the new password in one transaction.
    /// Returns `false` when the token was consumed concurrently.
    #[instrument(skip(self, reset, password_hash), fields(user_id = %reset.user_id))]
    pub async fn consume(&self, reset: &PasswordReset, password_hash: &str) -> Result<bool, Error> {
        let mut tx = self.connection_pool.begin().await?;

        let claimed = sqlx::query(
            "UPDATE password_resets SET used = TRUE WHERE token = ? AND used = FALSE",
        )
        .bind(&reset.token)
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() != 1 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("UPDATE users SET password = ? WHERE user_id = ?")
            .bind(password_hash)
            .bind(reset.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Password reset completed");
        Ok(true)
    }
}
