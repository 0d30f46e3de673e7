//! OrderRepository - Repository per ordini e righe d'ordine
//!
//! Il piazzamento dell'ordine è orchestrato dal service dentro una singola
//! transazione: le funzioni associate che accettano `&mut MySqlConnection`
//! lavorano sulla transazione aperta con [`OrderRepository::begin`].

use super::inserted_id;
use crate::dtos::{AdminOrderQuery, CartLine};
use crate::entities::{
    LinePricing, Order, OrderItemDetails, OrderStatus, PackagingType, Product, Status,
};
use sqlx::{Error, MySql, MySqlConnection, MySqlPool, QueryBuilder, Transaction};
use tracing::{debug, info, instrument, warn};

const ORDER_COLUMNS: &str =
    "order_id, client_id, status_id, total_amount, created_at, updated_at";

pub struct OrderRepository {
    connection_pool: MySqlPool,
}

impl OrderRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, MySql>, Error> {
        self.connection_pool.begin().await
    }

    // ********************* PIAZZAMENTO (in transazione) ********************* //

    /// Inserts the order shell (PENDING, total 0) and returns its id
    pub async fn insert_placeholder(
        conn: &mut MySqlConnection,
        client_id: i32,
    ) -> Result<i32, Error> {
        let result = sqlx::query(
            "INSERT INTO orders (client_id, status_id, total_amount) VALUES (?, ?, 0)",
        )
        .bind(client_id)
        .bind(OrderStatus::Pending.id())
        .execute(&mut *conn)
        .await?;

        inserted_id(result.last_insert_id())
    }

    pub async fn fetch_product(
        conn: &mut MySqlConnection,
        product_id: i32,
    ) -> Result<Option<Product>, Error> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT product_id, name, description, price_per_gram, category_id,
                   form_type_id, image_path, is_active, created_at
            FROM products WHERE product_id = ?
            "#,
        )
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// The packaging when it exists and is linked to the product
    pub async fn fetch_offered_packaging(
        conn: &mut MySqlConnection,
        product_id: i32,
        packaging_id: i32,
    ) -> Result<Option<PackagingType>, Error> {
        sqlx::query_as::<_, PackagingType>(
            r#"
            SELECT pt.packaging_id, pt.name, pt.volume, pt.material_id, pt.unit_id, pt.image_path
            FROM packaging_types pt
            JOIN product_packaging pp ON pp.packaging_id = pt.packaging_id
            WHERE pp.product_id = ? AND pt.packaging_id = ?
            "#,
        )
        .bind(product_id)
        .bind(packaging_id)
        .fetch_optional(&mut *conn)
        .await
    }

    pub async fn insert_item(
        conn: &mut MySqlConnection,
        order_id: i32,
        line: &CartLine,
        pricing: &LinePricing,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO order_items
                (order_id, product_id, packaging_id, quantity, unit_price, batch_volume)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(line.packaging_id)
        .bind(line.quantity)
        .bind(pricing.unit_price)
        .bind(pricing.batch_volume)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Stores the final total and confirms the order
    pub async fn finalize(
        conn: &mut MySqlConnection,
        order_id: i32,
        total_amount: f64,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE orders SET total_amount = ?, status_id = ? WHERE order_id = ?")
            .bind(total_amount)
            .bind(OrderStatus::Confirmed.id())
            .bind(order_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Cleanup after a failed placement; a no-op when the rollback already
    /// removed the rows
    #[instrument(skip(self))]
    pub async fn purge(&self, order_id: i32) -> Result<(), Error> {
        let items = sqlx::query("DELETE FROM order_items WHERE order_id = ?")
            .bind(order_id)
            .execute(&self.connection_pool)
            .await?;
        let orders = sqlx::query("DELETE FROM orders WHERE order_id = ?")
            .bind(order_id)
            .execute(&self.connection_pool)
            .await?;

        if items.rows_affected() + orders.rows_affected() > 0 {
            warn!(
                "Purged {} leftover rows of failed order",
                items.rows_affected() + orders.rows_affected()
            );
        }
        Ok(())
    }

    // ********************* LETTURA ********************* //

    pub async fn read(&self, order_id: i32) -> Result<Option<Order>, Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE order_id = ?",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(&self.connection_pool)
        .await
    }

    /// The order only if it belongs to the client
    pub async fn read_for_client(
        &self,
        order_id: i32,
        client_id: i32,
    ) -> Result<Option<Order>, Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE order_id = ? AND client_id = ?",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .bind(client_id)
        .fetch_optional(&self.connection_pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn list_by_client(&self, client_id: i32) -> Result<Vec<Order>, Error> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE client_id = ? ORDER BY created_at DESC, order_id DESC",
            ORDER_COLUMNS
        ))
        .bind(client_id)
        .fetch_all(&self.connection_pool)
        .await?;

        debug!("Client has {} orders", orders.len());
        Ok(orders)
    }

    #[instrument(skip(self))]
    pub async fn list_filtered(&self, filter: &AdminOrderQuery) -> Result<Vec<Order>, Error> {
        let mut query: QueryBuilder<MySql> = QueryBuilder::new(format!(
            "SELECT {} FROM orders WHERE 1 = 1",
            ORDER_COLUMNS
        ));
        if let Some(status_id) = filter.status_id {
            query.push(" AND status_id = ").push_bind(status_id);
        }
        if let Some(client_id) = filter.client_id {
            query.push(" AND client_id = ").push_bind(client_id);
        }
        query.push(" ORDER BY created_at DESC, order_id DESC");

        query
            .build_query_as::<Order>()
            .fetch_all(&self.connection_pool)
            .await
    }

    pub async fn items_with_details(&self, order_id: i32) -> Result<Vec<OrderItemDetails>, Error> {
        sqlx::query_as::<_, OrderItemDetails>(
            r#"
            SELECT
                oi.order_item_id, oi.product_id, p.name AS product_name,
                oi.packaging_id, pt.name AS packaging_name,
                oi.quantity, oi.unit_price, oi.batch_volume
            FROM order_items oi
            JOIN products p ON p.product_id = oi.product_id
            JOIN packaging_types pt ON pt.packaging_id = oi.packaging_id
            WHERE oi.order_id = ?
            ORDER BY oi.order_item_id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn statuses(&self) -> Result<Vec<Status>, Error> {
        sqlx::query_as::<_, Status>("SELECT status_id, code, name FROM statuses ORDER BY status_id")
            .fetch_all(&self.connection_pool)
            .await
    }

    // ********************* MODIFICA ********************* //

    #[instrument(skip(self))]
    pub async fn update_status(&self, order_id: i32, status: OrderStatus) -> Result<Order, Error> {
        sqlx::query("UPDATE orders SET status_id = ? WHERE order_id = ?")
            .bind(status.id())
            .bind(order_id)
            .execute(&self.connection_pool)
            .await?;

        info!("Order status set to {:?}", status);
        self.read(order_id).await?.ok_or(Error::RowNotFound)
    }

    /// Cancels the order if it is still cancellable; returns `false` otherwise
    #[instrument(skip(self))]
    pub async fn cancel(&self, order_id: i32) -> Result<bool, Error> {
        let result = sqlx::query(
            "UPDATE orders SET status_id = ? WHERE order_id = ? AND status_id IN (?, ?)",
        )
        .bind(OrderStatus::Cancelled.id())
        .bind(order_id)
        .bind(OrderStatus::Pending.id())
        .bind(OrderStatus::Confirmed.id())
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Removes items and order in one transaction
    #[instrument(skip(self))]
    pub async fn delete(&self, order_id: i32) -> Result<(), Error> {
        let mut tx = self.connection_pool.begin().await?;

        sqlx::query("DELETE FROM order_items WHERE order_id = ?")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM orders WHERE order_id = ?")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(Error::RowNotFound);
        }
        tx.commit().await?;
        info!("Order {} deleted", order_id);
        Ok(())
    }
}
