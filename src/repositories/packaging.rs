//! PackagingRepository - Repository per le tipologie di imballaggio

use super::{Create, Read, Update, inserted_id};
use crate::dtos::{CreatePackagingDTO, UpdatePackagingDTO};
use crate::entities::{PackagingDetails, PackagingType};
use sqlx::{Error, MySql, MySqlPool, QueryBuilder};
use tracing::{debug, info, instrument};

const DETAILS_SELECT: &str = r#"
    SELECT
        pt.packaging_id, pt.name, pt.volume,
        pt.material_id, m.name AS material_name,
        pt.unit_id, u.name AS unit_name,
        pt.image_path
    FROM packaging_types pt
    JOIN materials m ON m.material_id = pt.material_id
    JOIN units u ON u.unit_id = pt.unit_id
"#;

pub struct PackagingRepository {
    connection_pool: MySqlPool,
}

impl PackagingRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<PackagingDetails>, Error> {
        sqlx::query_as::<_, PackagingDetails>(&format!(
            "{} ORDER BY pt.volume, pt.name",
            DETAILS_SELECT
        ))
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn read_details(&self, packaging_id: i32) -> Result<Option<PackagingDetails>, Error> {
        sqlx::query_as::<_, PackagingDetails>(&format!(
            "{} WHERE pt.packaging_id = ?",
            DETAILS_SELECT
        ))
        .bind(packaging_id)
        .fetch_optional(&self.connection_pool)
        .await
    }

    /// Packaging offered for a product, smallest first
    #[instrument(skip(self))]
    pub async fn options_for_product(&self, product_id: i32) -> Result<Vec<PackagingDetails>, Error> {
        let options = sqlx::query_as::<_, PackagingDetails>(&format!(
            r#"{}
            JOIN product_packaging pp ON pp.packaging_id = pt.packaging_id
            WHERE pp.product_id = ?
            ORDER BY pt.volume, pt.name"#,
            DETAILS_SELECT
        ))
        .bind(product_id)
        .fetch_all(&self.connection_pool)
        .await?;

        debug!("Product offers {} packaging options", options.len());
        Ok(options)
    }

    /// The packaging if it exists and is offered for the product
    pub async fn find_offered(
        &self,
        product_id: i32,
        packaging_id: i32,
    ) -> Result<Option<PackagingDetails>, Error> {
        sqlx::query_as::<_, PackagingDetails>(&format!(
            r#"{}
            JOIN product_packaging pp ON pp.packaging_id = pt.packaging_id
            WHERE pp.product_id = ? AND pt.packaging_id = ?"#,
            DETAILS_SELECT
        ))
        .bind(product_id)
        .bind(packaging_id)
        .fetch_optional(&self.connection_pool)
        .await
    }

    /// Subset of `ids` that exists
    pub async fn existing_ids(&self, ids: &[i32]) -> Result<Vec<i32>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut query: QueryBuilder<MySql> =
            QueryBuilder::new("SELECT packaging_id FROM packaging_types WHERE packaging_id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        query
            .build_query_scalar::<i32>()
            .fetch_all(&self.connection_pool)
            .await
    }

    pub async fn is_ordered(&self, packaging_id: i32) -> Result<bool, Error> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE packaging_id = ?")
                .bind(packaging_id)
                .fetch_one(&self.connection_pool)
                .await?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    pub async fn set_image(
        &self,
        packaging_id: i32,
        image_path: &str,
    ) -> Result<Option<String>, Error> {
        let previous = self
            .read(&packaging_id)
            .await?
            .ok_or(Error::RowNotFound)?
            .image_path;

        sqlx::query("UPDATE packaging_types SET image_path = ? WHERE packaging_id = ?")
            .bind(image_path)
            .bind(packaging_id)
            .execute(&self.connection_pool)
            .await?;

        info!("Packaging image replaced");
        Ok(previous)
    }

    /// Removes the packaging and its product links in one transaction.
    /// Callers must check order references first.
    #[instrument(skip(self))]
    pub async fn delete_with_links(&self, packaging_id: i32) -> Result<(), Error> {
        let mut tx = self.connection_pool.begin().await?;

        sqlx::query("DELETE FROM product_packaging WHERE packaging_id = ?")
            .bind(packaging_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM packaging_types WHERE packaging_id = ?")
            .bind(packaging_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Packaging {} deleted", packaging_id);
        Ok(())
    }
}

impl Create<PackagingType, CreatePackagingDTO> for PackagingRepository {
    #[instrument(skip(self, data), fields(name = %data.name))]
    async fn create(&self, data: &CreatePackagingDTO) -> Result<PackagingType, Error> {
        let result = sqlx::query(
            "INSERT INTO packaging_types (name, volume, material_id, unit_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&data.name)
        .bind(data.volume)
        .bind(data.material_id)
        .bind(data.unit_id)
        .execute(&self.connection_pool)
        .await?;

        let new_id = inserted_id(result.last_insert_id())?;
        info!("Packaging created with id {}", new_id);

        Ok(PackagingType {
            packaging_id: new_id,
            name: data.name.clone(),
            volume: data.volume,
            material_id: data.material_id,
            unit_id: data.unit_id,
            image_path: None,
        })
    }
}

impl Read<PackagingType, i32> for PackagingRepository {
    async fn read(&self, id: &i32) -> Result<Option<PackagingType>, Error> {
        sqlx::query_as::<_, PackagingType>(
            "SELECT packaging_id, name, volume, material_id, unit_id, image_path FROM packaging_types WHERE packaging_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Update<PackagingType, UpdatePackagingDTO, i32> for PackagingRepository {
    #[instrument(skip(self, data), fields(packaging_id = %id))]
    async fn update(&self, id: &i32, data: &UpdatePackagingDTO) -> Result<PackagingType, Error> {
        sqlx::query(
            r#"
            UPDATE packaging_types SET
                name = COALESCE(?, name),
                volume = COALESCE(?, volume),
                material_id = COALESCE(?, material_id),
                unit_id = COALESCE(?, unit_id)
            WHERE packaging_id = ?
            "#,
        )
        .bind(data.name.as_deref())
        .bind(data.volume)
        .bind(data.material_id)
        .bind(data.unit_id)
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        self.read(id).await?.ok_or(Error::RowNotFound)
    }
}
