//! CertificateRepository - Certificati allegati ai prodotti

use super::{Delete, Read, inserted_id};
use crate::entities::CertificateFile;
use sqlx::{Error, MySqlPool};
use tracing::{info, instrument};

pub struct CertificateRepository {
    connection_pool: MySqlPool,
}

impl CertificateRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    pub async fn list_for_product(&self, product_id: i32) -> Result<Vec<CertificateFile>, Error> {
        sqlx::query_as::<_, CertificateFile>(
            r#"
            SELECT certificate_id, product_id, file_name, file_path, uploaded_at
            FROM certificate_file WHERE product_id = ?
            ORDER BY uploaded_at, certificate_id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// File paths of every certificate of the product, for disk cleanup
    pub async fn paths_for_product(&self, product_id: i32) -> Result<Vec<String>, Error> {
        sqlx::query_scalar("SELECT file_path FROM certificate_file WHERE product_id = ?")
            .bind(product_id)
            .fetch_all(&self.connection_pool)
            .await
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        product_id: i32,
        file_name: &str,
        file_path: &str,
    ) -> Result<CertificateFile, Error> {
        let result = sqlx::query(
            "INSERT INTO certificate_file (product_id, file_name, file_path) VALUES (?, ?, ?)",
        )
        .bind(product_id)
        .bind(file_name)
        .bind(file_path)
        .execute(&self.connection_pool)
        .await?;

        let new_id = inserted_id(result.last_insert_id())?;
        info!("Certificate {} attached", new_id);
        self.read(&new_id).await?.ok_or(Error::RowNotFound)
    }
}

impl Read<CertificateFile, i32> for CertificateRepository {
    async fn read(&self, id: &i32) -> Result<Option<CertificateFile>, Error> {
        sqlx::query_as::<_, CertificateFile>(
            r#"
            SELECT certificate_id, product_id, file_name, file_path, uploaded_at
            FROM certificate_file WHERE certificate_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Delete<i32> for CertificateRepository {
    async fn delete(&self, id: &i32) -> Result<(), Error> {
        sqlx::query("DELETE FROM certificate_file WHERE certificate_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        Ok(())
    }
}
