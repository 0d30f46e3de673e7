//! ClientRepository - Repository per clienti e dati anagrafici

use super::inserted_id;
use crate::dtos::{NewUser, RegisterDTO, UpdateProfileDTO};
use crate::entities::{
    Client, ClientDetails, ClientProfile, ClientType, Individual, LegalEntity, User,
};
use sqlx::{Error, MySqlConnection, MySqlPool};
use tracing::{debug, info, instrument};

pub struct ClientRepository {
    connection_pool: MySqlPool,
}

impl ClientRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    async fn load_details(
        conn: &mut MySqlConnection,
        client: &Client,
    ) -> Result<ClientDetails, Error> {
        let details = match client.client_type {
            ClientType::Individual => ClientDetails::Individual(
                sqlx::query_as::<_, Individual>(
                    "SELECT client_id, full_name, tax_id FROM individuals WHERE client_id = ?",
                )
                .bind(client.client_id)
                .fetch_one(&mut *conn)
                .await?,
            ),
            ClientType::LegalEntity => ClientDetails::LegalEntity(
                sqlx::query_as::<_, LegalEntity>(
                    r#"
                    SELECT client_id, company_name, tax_id, registration_number,
                           legal_address, contract_path
                    FROM legal_entities WHERE client_id = ?
                    "#,
                )
                .bind(client.client_id)
                .fetch_one(&mut *conn)
                .await?,
            ),
        };
        Ok(details)
    }

    async fn profile_where(
        conn: &mut MySqlConnection,
        column: &str,
        id: i32,
    ) -> Result<Option<ClientProfile>, Error> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT client_id, user_id, client_type, phone, address FROM clients WHERE {} = ?",
            column
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        match client {
            Some(client) => {
                let details = Self::load_details(conn, &client).await?;
                Ok(Some(ClientProfile { client, details }))
            }
            None => Ok(None),
        }
    }

    /// Profilo cliente collegato all'utente, `None` per lo staff
    #[instrument(skip(self))]
    pub async fn find_by_user_id(&self, user_id: i32) -> Result<Option<ClientProfile>, Error> {
        let mut conn = self.connection_pool.acquire().await?;
        Self::profile_where(&mut conn, "user_id", user_id).await
    }

    #[instrument(skip(self))]
    pub async fn find_by_client_id(&self, client_id: i32) -> Result<Option<ClientProfile>, Error> {
        let mut conn = self.connection_pool.acquire().await?;
        Self::profile_where(&mut conn, "client_id", client_id).await
    }

    /// Inserts user, client and the type-specific row in one transaction
    #[instrument(skip(self, user, data), fields(email = %user.email, client_type = ?data.client_type))]
    pub async fn register(
        &self,
        user: &NewUser,
        data: &RegisterDTO,
    ) -> Result<(User, ClientProfile), Error> {
        let mut tx = self.connection_pool.begin().await?;

        let inserted = sqlx::query("INSERT INTO users (email, password, role_id) VALUES (?, ?, ?)")
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.id())
            .execute(&mut *tx)
            .await?;
        let user_id = inserted_id(inserted.last_insert_id())?;

        let inserted = sqlx::query(
            "INSERT INTO clients (user_id, client_type, phone, address) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(data.client_type)
        .bind(data.phone.as_deref())
        .bind(data.address.as_deref())
        .execute(&mut *tx)
        .await?;
        let client_id = inserted_id(inserted.last_insert_id())?;

        match data.client_type {
            ClientType::Individual => {
                sqlx::query(
                    "INSERT INTO individuals (client_id, full_name, tax_id) VALUES (?, ?, ?)",
                )
                .bind(client_id)
                .bind(data.full_name.as_deref().unwrap_or_default())
                .bind(data.tax_id.as_deref())
                .execute(&mut *tx)
                .await?;
            }
            ClientType::LegalEntity => {
                sqlx::query(
                    r#"
                    INSERT INTO legal_entities
                        (client_id, company_name, tax_id, registration_number, legal_address)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(client_id)
                .bind(data.company_name.as_deref().unwrap_or_default())
                .bind(data.tax_id.as_deref().unwrap_or_default())
                .bind(data.registration_number.as_deref())
                .bind(data.legal_address.as_deref())
                .execute(&mut *tx)
                .await?;
            }
        }

        let created_user = sqlx::query_as::<_, User>(
            "SELECT user_id, email, password, role_id, is_active, created_at FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        let profile = Self::profile_where(&mut tx, "client_id", client_id)
            .await?
            .ok_or(Error::RowNotFound)?;

        tx.commit().await?;
        info!("Registered client {} for user {}", client_id, user_id);
        Ok((created_user, profile))
    }

    /// Updates the shared and the type-specific fields; fields not relevant
    /// to the client type are ignored
    #[instrument(skip(self, data))]
    pub async fn update_profile(
        &self,
        client_id: i32,
        data: &UpdateProfileDTO,
    ) -> Result<ClientProfile, Error> {
        let mut tx = self.connection_pool.begin().await?;

        let current = Self::profile_where(&mut tx, "client_id", client_id)
            .await?
            .ok_or(Error::RowNotFound)?;

        sqlx::query(
            "UPDATE clients SET phone = COALESCE(?, phone), address = COALESCE(?, address) WHERE client_id = ?",
        )
        .bind(data.phone.as_deref())
        .bind(data.address.as_deref())
        .bind(client_id)
        .execute(&mut *tx)
        .await?;

        match current.client.client_type {
            ClientType::Individual => {
                sqlx::query(
                    r#"
                    UPDATE individuals SET
                        full_name = COALESCE(?, full_name),
                        tax_id = COALESCE(?, tax_id)
                    WHERE client_id = ?
                    "#,
                )
                .bind(data.full_name.as_deref())
                .bind(data.tax_id.as_deref())
                .bind(client_id)
                .execute(&mut *tx)
                .await?;
            }
            ClientType::LegalEntity => {
                sqlx::query(
                    r#"
                    UPDATE legal_entities SET
                        company_name = COALESCE(?, company_name),
                        tax_id = COALESCE(?, tax_id),
                        registration_number = COALESCE(?, registration_number),
                        legal_address = COALESCE(?, legal_address)
                    WHERE client_id = ?
                    "#,
                )
                .bind(data.company_name.as_deref())
                .bind(data.tax_id.as_deref())
                .bind(data.registration_number.as_deref())
                .bind(data.legal_address.as_deref())
                .bind(client_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        let updated = Self::profile_where(&mut tx, "client_id", client_id)
            .await?
            .ok_or(Error::RowNotFound)?;
        tx.commit().await?;
        debug!("Client profile updated");
        Ok(updated)
    }

    /// Stores the contract path and returns the previous one
    #[instrument(skip(self))]
    pub async fn set_contract_path(
        &self,
        client_id: i32,
        contract_path: &str,
    ) -> Result<Option<String>, Error> {
        let mut tx = self.connection_pool.begin().await?;
        let previous: Option<Option<String>> = sqlx::query_scalar(
            "SELECT contract_path FROM legal_entities WHERE client_id = ? FOR UPDATE",
        )
        .bind(client_id)
        .fetch_optional(&mut *tx)
        .await?;
        let previous = previous.ok_or(Error::RowNotFound)?;

        sqlx::query("UPDATE legal_entities SET contract_path = ? WHERE client_id = ?")
            .bind(contract_path)
            .bind(client_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Contract stored for client {}", client_id);
        Ok(previous)
    }

    pub async fn has_orders(&self, client_id: i32) -> Result<bool, Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE client_id = ?")
            .bind(client_id)
            .fetch_one(&self.connection_pool)
            .await?;
        Ok(count > 0)
    }
}
