//! CategoryRepository - Repository per le categorie di prodotto

use super::{Create, Delete, Read, Update, inserted_id};
use crate::dtos::CategoryPayloadDTO;
use crate::entities::Category;
use sqlx::{Error, MySqlPool};
use tracing::{info, instrument};

pub struct CategoryRepository {
    connection_pool: MySqlPool,
}

impl CategoryRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    pub async fn list(&self) -> Result<Vec<Category>, Error> {
        sqlx::query_as::<_, Category>(
            "SELECT category_id, name, description FROM categories ORDER BY name",
        )
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Whether another category already uses `name`
    pub async fn name_taken(&self, name: &str, exclude_id: Option<i32>) -> Result<bool, Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM categories WHERE name = ? AND category_id <> COALESCE(?, 0)",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.connection_pool)
        .await?;
        Ok(count > 0)
    }
}

impl Create<Category, CategoryPayloadDTO> for CategoryRepository {
    #[instrument(skip(self, data), fields(name = %data.name))]
    async fn create(&self, data: &CategoryPayloadDTO) -> Result<Category, Error> {
        let result = sqlx::query("INSERT INTO categories (name, description) VALUES (?, ?)")
            .bind(&data.name)
            .bind(data.description.as_deref())
            .execute(&self.connection_pool)
            .await?;

        let new_id = inserted_id(result.last_insert_id())?;
        info!("Category created with id {}", new_id);

        Ok(Category {
            category_id: new_id,
            name: data.name.clone(),
            description: data.description.clone(),
        })
    }
}

impl Read<Category, i32> for CategoryRepository {
    async fn read(&self, id: &i32) -> Result<Option<Category>, Error> {
        sqlx::query_as::<_, Category>(
            "SELECT category_id, name, description FROM categories WHERE category_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Update<Category, CategoryPayloadDTO, i32> for CategoryRepository {
    #[instrument(skip(self, data), fields(category_id = %id))]
    async fn update(&self, id: &i32, data: &CategoryPayloadDTO) -> Result<Category, Error> {
        sqlx::query("UPDATE categories SET name = ?, description = ? WHERE category_id = ?")
            .bind(&data.name)
            .bind(data.description.as_deref())
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        self.read(id).await?.ok_or(Error::RowNotFound)
    }
}

impl Delete<i32> for CategoryRepository {
    #[instrument(skip(self), fields(category_id = %id))]
    async fn delete(&self, id: &i32) -> Result<(), Error> {
        sqlx::query("DELETE FROM categories WHERE category_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        info!("Category deleted");
        Ok(())
    }
}
