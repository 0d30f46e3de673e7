//! UserRepository - Repository per la gestione degli utenti

use super::{Create, Delete, Read, Update, inserted_id};
use crate::dtos::{NewUser, UserChanges};
use crate::entities::{Role, User};
use sqlx::{Error, MySqlPool};
use tracing::{debug, info, instrument};

const USER_COLUMNS: &str = "user_id, email, password, role_id, is_active, created_at";

// USER REPO
pub struct UserRepository {
    connection_pool: MySqlPool,
}

impl UserRepository {
    pub fn new(connection_pool: MySqlPool) -> UserRepository {
        Self { connection_pool }
    }

    /// L'email è univoca e fa da credenziale di login
    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }

    /// Whether another user already owns `email`
    pub async fn email_taken(&self, email: &str, exclude_user_id: Option<i32>) -> Result<bool, Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE email = ? AND user_id <> COALESCE(?, 0)",
        )
        .bind(email)
        .bind(exclude_user_id)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(count > 0)
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<User>, Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY user_id",
            USER_COLUMNS
        ))
        .fetch_all(&self.connection_pool)
        .await?;

        debug!("Loaded {} users", users.len());
        Ok(users)
    }

    #[instrument(skip(self, password_hash))]
    pub async fn set_password(&self, user_id: i32, password_hash: &str) -> Result<(), Error> {
        let result = sqlx::query("UPDATE users SET password = ? WHERE user_id = ?")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;

        if result.rows_affected() == 0 && self.read(&user_id).await?.is_none() {
            return Err(Error::RowNotFound);
        }
        info!("Password updated");
        Ok(())
    }
}

impl Create<User, NewUser> for UserRepository {
    #[instrument(skip(self, data), fields(email = %data.email, role = ?data.role))]
    async fn create(&self, data: &NewUser) -> Result<User, Error> {
        let result = sqlx::query("INSERT INTO users (email, password, role_id) VALUES (?, ?, ?)")
            .bind(&data.email)
            .bind(&data.password_hash)
            .bind(data.role.id())
            .execute(&self.connection_pool)
            .await?;

        // Get the last inserted ID
        let new_id = inserted_id(result.last_insert_id())?;
        info!("User created with id {}", new_id);

        self.read(&new_id).await?.ok_or(Error::RowNotFound)
    }
}

impl Read<User, i32> for UserRepository {
    async fn read(&self, id: &i32) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE user_id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }
}

impl Update<User, UserChanges, i32> for UserRepository {
    #[instrument(skip(self, data), fields(user_id = %id))]
    async fn update(&self, id: &i32, data: &UserChanges) -> Result<User, Error> {
        // First, ensure the user exists
        self.read(id).await?.ok_or(Error::RowNotFound)?;

        sqlx::query(
            r#"
            UPDATE users SET
                email = COALESCE(?, email),
                password = COALESCE(?, password),
                role_id = COALESCE(?, role_id),
                is_active = COALESCE(?, is_active)
            WHERE user_id = ?
            "#,
        )
        .bind(data.email.as_deref())
        .bind(data.password_hash.as_deref())
        .bind(data.role.map(Role::id))
        .bind(data.is_active)
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        info!("User updated");
        self.read(id).await?.ok_or(Error::RowNotFound)
    }
}

impl Delete<i32> for UserRepository {
    /// Hard delete: client rows, registration details and reset tokens
    /// cascade. Callers must check for orders first.
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn delete(&self, user_id: &i32) -> Result<(), Error> {
        sqlx::query("DELETE FROM users WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;

        info!("User deleted");
        Ok(())
    }
}
