//! ProductRepository - Repository per i prodotti del catalogo

use super::{Create, Read, Update, inserted_id};
use crate::dtos::{CreateProductDTO, ProductQuery, UpdateProductDTO};
use crate::entities::{Product, ProductListing};
use sqlx::{Error, MySql, MySqlConnection, MySqlPool, QueryBuilder};
use tracing::{debug, info, instrument};

const PRODUCT_COLUMNS: &str = "product_id, name, description, price_per_gram, category_id, \
     form_type_id, image_path, is_active, created_at";

const LISTING_SELECT: &str = r#"
    SELECT
        p.product_id, p.name, p.description, p.price_per_gram,
        p.category_id, c.name AS category_name,
        p.form_type_id, f.name AS form_type_name,
        p.image_path, p.is_active,
        (SELECT MIN(pt.volume)
           FROM product_packaging pp
           JOIN packaging_types pt ON pt.packaging_id = pp.packaging_id
          WHERE pp.product_id = p.product_id) AS min_volume
    FROM products p
    JOIN categories c ON c.category_id = p.category_id
    LEFT JOIN form_types f ON f.form_type_id = p.form_type_id
"#;

pub struct ProductRepository {
    connection_pool: MySqlPool,
}

impl ProductRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Catalog listing; `only_active` hides deactivated products
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &ProductQuery,
        only_active: bool,
    ) -> Result<Vec<ProductListing>, Error> {
        let mut query: QueryBuilder<MySql> = QueryBuilder::new(LISTING_SELECT);
        query.push(" WHERE 1 = 1");
        if only_active {
            query.push(" AND p.is_active = TRUE");
        }
        if let Some(category_id) = filter.category_id {
            query.push(" AND p.category_id = ").push_bind(category_id);
        }
        if let Some(form_type_id) = filter.form_type_id {
            query.push(" AND p.form_type_id = ").push_bind(form_type_id);
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query
                .push(" AND p.name LIKE ")
                .push_bind(format!("%{}%", search));
        }
        query.push(" ORDER BY p.name");

        let products = query
            .build_query_as::<ProductListing>()
            .fetch_all(&self.connection_pool)
            .await?;

        debug!("Found {} products", products.len());
        Ok(products)
    }

    pub async fn read_listing(&self, product_id: i32) -> Result<Option<ProductListing>, Error> {
        let product = sqlx::query_as::<_, ProductListing>(&format!(
            "{} WHERE p.product_id = ?",
            LISTING_SELECT
        ))
        .bind(product_id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(product)
    }

    pub async fn packaging_ids(&self, product_id: i32) -> Result<Vec<i32>, Error> {
        sqlx::query_scalar(
            "SELECT packaging_id FROM product_packaging WHERE product_id = ? ORDER BY packaging_id",
        )
        .bind(product_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Whether any order line references the product
    pub async fn is_ordered(&self, product_id: i32) -> Result<bool, Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE product_id = ?")
            .bind(product_id)
            .fetch_one(&self.connection_pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn count_by_category(&self, category_id: i32) -> Result<i64, Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = ?")
            .bind(category_id)
            .fetch_one(&self.connection_pool)
            .await
    }

    #[instrument(skip(self))]
    pub async fn set_image(
        &self,
        product_id: i32,
        image_path: &str,
    ) -> Result<Option<String>, Error> {
        let previous = self
            .read(&product_id)
            .await?
            .ok_or(Error::RowNotFound)?
            .image_path;

        sqlx::query("UPDATE products SET image_path = ? WHERE product_id = ?")
            .bind(image_path)
            .bind(product_id)
            .execute(&self.connection_pool)
            .await?;

        info!("Product image replaced");
        Ok(previous)
    }

    async fn replace_packaging_links(
        conn: &mut MySqlConnection,
        product_id: i32,
        packaging_ids: &[i32],
    ) -> Result<(), Error> {
        sqlx::query("DELETE FROM product_packaging WHERE product_id = ?")
            .bind(product_id)
            .execute(&mut *conn)
            .await?;

        if packaging_ids.is_empty() {
            return Ok(());
        }
        let mut insert: QueryBuilder<MySql> =
            QueryBuilder::new("INSERT INTO product_packaging (product_id, packaging_id) ");
        insert.push_values(packaging_ids, |mut row, packaging_id| {
            row.push_bind(product_id).push_bind(*packaging_id);
        });
        insert.build().execute(&mut *conn).await?;
        Ok(())
    }

    /// Removes the product with its packaging links and certificate rows.
    /// Callers must check order references first.
    #[instrument(skip(self))]
    pub async fn delete_with_links(&self, product_id: i32) -> Result<(), Error> {
        let mut tx = self.connection_pool.begin().await?;

        sqlx::query("DELETE FROM product_packaging WHERE product_id = ?")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM certificate_file WHERE product_id = ?")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM products WHERE product_id = ?")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Product {} deleted", product_id);
        Ok(())
    }
}

impl Create<Product, CreateProductDTO> for ProductRepository {
    #[instrument(skip(self, data), fields(name = %data.name))]
    async fn create(&self, data: &CreateProductDTO) -> Result<Product, Error> {
        let mut tx = self.connection_pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO products (name, description, price_per_gram, category_id, form_type_id, is_active)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&data.name)
        .bind(data.description.as_deref())
        .bind(data.price_per_gram)
        .bind(data.category_id)
        .bind(data.form_type_id)
        .bind(data.is_active)
        .execute(&mut *tx)
        .await?;

        let new_id = inserted_id(result.last_insert_id())?;
        Self::replace_packaging_links(&mut tx, new_id, &data.packaging_ids).await?;
        tx.commit().await?;

        info!("Product created with id {}", new_id);
        self.read(&new_id).await?.ok_or(Error::RowNotFound)
    }
}

impl Read<Product, i32> for ProductRepository {
    async fn read(&self, id: &i32) -> Result<Option<Product>, Error> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE product_id = ?",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(product)
    }
}

impl Update<Product, UpdateProductDTO, i32> for ProductRepository {
    #[instrument(skip(self, data), fields(product_id = %id))]
    async fn update(&self, id: &i32, data: &UpdateProductDTO) -> Result<Product, Error> {
        let mut tx = self.connection_pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = COALESCE(?, name),
                description = COALESCE(?, description),
                price_per_gram = COALESCE(?, price_per_gram),
                category_id = COALESCE(?, category_id),
                form_type_id = COALESCE(?, form_type_id),
                is_active = COALESCE(?, is_active)
            WHERE product_id = ?
            "#,
        )
        .bind(data.name.as_deref())
        .bind(data.description.as_deref())
        .bind(data.price_per_gram)
        .bind(data.category_id)
        .bind(data.form_type_id)
        .bind(data.is_active)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        debug!("Product update touched {} rows", result.rows_affected());

        if let Some(packaging_ids) = &data.packaging_ids {
            Self::replace_packaging_links(&mut tx, *id, packaging_ids).await?;
        }
        tx.commit().await?;

        self.read(id).await?.ok_or(Error::RowNotFound)
    }
}
