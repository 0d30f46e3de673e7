//! Integration tests per il piazzamento e lo storico ordini del cliente
//!
//! Endpoints testati:
//! - POST /api/orders
//! - GET  /api/orders
//! - GET  /api/orders/{order_id}
//! - POST /api/orders/{order_id}/cancel

mod common;

#[cfg(test)]
mod order_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use sqlx::MySqlPool;
    use std::sync::Arc;
    use storefront::AppState;

    // ============================================================
    // POST /api/orders
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "catalog")))]
    async fn test_place_order_success(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool.clone());
        let token = token_for(&state, BUYER_ID).await;
        let server = create_test_server(state);

        let response = server
            .post("/api/orders")
            .bearer(&token)
            .cookie(&cart_cookie(&[(1, 1, 200)]))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(
            response.headers().get("location").and_then(|v| v.to_str().ok()),
            Some("/orders")
        );
        let cleared = set_cookie(&response, "cart").expect("cart cookie cleared");
        assert!(cleared.contains("Max-Age=0"));

        let order: serde_json::Value = response.json();
        assert_eq!(order["status"], "CONFIRMED");
        assert_eq!(order["clientId"], 1);
        assert_eq!(order["totalAmount"].as_f64(), Some(5000.0));
        let item = &order["items"][0];
        assert_eq!(item["productName"], "Whey Protein");
        assert_eq!(item["quantity"], 200);
        assert_eq!(item["unitPrice"].as_f64(), Some(25.0));
        assert_eq!(item["batchVolume"].as_f64(), Some(100_000.0));

        assert_eq!(count_rows(&pool, "orders").await, 1);
        assert_eq!(count_rows(&pool, "order_items").await, 1);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "catalog")))]
    async fn test_place_order_renormalizes_cookie_quantities(
        pool: MySqlPool,
    ) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let token = token_for(&state, BUYER_ID).await;
        let server = create_test_server(state);

        let response = server
            .post("/api/orders")
            .bearer(&token)
            .cookie(&cart_cookie(&[(1, 1, 333)]))
            .await;

        response.assert_status(StatusCode::CREATED);
        let order: serde_json::Value = response.json();
        assert_eq!(order["items"][0]["quantity"], 350);
        assert_eq!(order["totalAmount"].as_f64(), Some(8750.0));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "catalog")))]
    async fn test_place_order_below_minimum_writes_nothing(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool.clone());
        let token = token_for(&state, BUYER_ID).await;
        let server = create_test_server(state);

        // 200 sacchetti di collagene a 2.00 = 400
        let response = server
            .post("/api/orders")
            .bearer(&token)
            .cookie(&cart_cookie(&[(2, 2, 200)]))
            .await;

        response.assert_status_bad_request();
        // il cookie del carrello non viene toccato
        assert!(set_cookie(&response, "cart").is_none());
        assert_eq!(count_rows(&pool, "orders").await, 0);
        assert_eq!(count_rows(&pool, "order_items").await, 0);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "catalog")))]
    async fn test_place_order_with_inactive_product_rolls_back(
        pool: MySqlPool,
    ) -> sqlx::Result<()> {
        let state = create_test_state(pool.clone());
        let token = token_for(&state, BUYER_ID).await;
        let server = create_test_server(state);

        // la prima riga è valida, la seconda no
        let response = server
            .post("/api/orders")
            .bearer(&token)
            .cookie(&cart_cookie(&[(1, 1, 400), (3, 1, 200)]))
            .await;

        response.assert_status_bad_request();
        assert_eq!(count_rows(&pool, "orders").await, 0);
        assert_eq!(count_rows(&pool, "order_items").await, 0);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "catalog")))]
    async fn test_place_order_with_packaging_not_offered(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool.clone());
        let token = token_for(&state, BUYER_ID).await;
        let server = create_test_server(state);

        let response = server
            .post("/api/orders")
            .bearer(&token)
            .cookie(&cart_cookie(&[(1, 3, 400)]))
            .await;

        response.assert_status_bad_request();
        assert_eq!(count_rows(&pool, "orders").await, 0);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "catalog")))]
    async fn test_place_order_empty_cart(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool.clone());
        let token = token_for(&state, BUYER_ID).await;
        let server = create_test_server(state);

        server
            .post("/api/orders")
            .bearer(&token)
            .await
            .assert_status_bad_request();
        assert_eq!(count_rows(&pool, "orders").await, 0);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "catalog")))]
    async fn test_place_order_rejects_cart_over_line_limit(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool.clone());
        let token = token_for(&state, BUYER_ID).await;
        let server = create_test_server(state);

        // 31 distinct lines, one more than a cart can hold
        let lines: Vec<(i32, i32, i32)> = (0..31).map(|i| (1, 1000 + i, 200)).collect();
        let response = server
            .post("/api/orders")
            .bearer(&token)
            .cookie(&cart_cookie(&lines))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Cart has too many lines");
        assert!(set_cookie(&response, "cart").is_none());
        assert_eq!(count_rows(&pool, "orders").await, 0);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "catalog")))]
    async fn test_minimum_is_configurable(pool: MySqlPool) -> sqlx::Result<()> {
        let state = Arc::new(
            AppState::new(pool, JWT_SECRET.to_string()).with_min_order_amount(100.0),
        );
        let token = token_for(&state, PERSON_ID).await;
        let server = create_test_server(state);

        let response = server
            .post("/api/orders")
            .bearer(&token)
            .cookie(&cart_cookie(&[(2, 2, 200)]))
            .await;

        response.assert_status(StatusCode::CREATED);
        let order: serde_json::Value = response.json();
        assert_eq!(order["clientId"], 2);
        assert_eq!(order["totalAmount"].as_f64(), Some(400.0));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "catalog")))]
    async fn test_staff_cannot_place_orders(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let token = token_for(&state, ADMIN_ID).await;
        let server = create_test_server(state);

        server
            .post("/api/orders")
            .bearer(&token)
            .cookie(&cart_cookie(&[(1, 1, 200)]))
            .await
            .assert_status_forbidden();
        Ok(())
    }

    // ============================================================
    // Storico ordini
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "catalog", "orders")))]
    async fn test_list_my_orders_only_own(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let token = token_for(&state, BUYER_ID).await;
        let server = create_test_server(state);

        let response = server.get("/api/orders").bearer(&token).await;

        response.assert_status_ok();
        let orders: Vec<serde_json::Value> = response.json();
        let ids: Vec<i64> = orders.iter().filter_map(|o| o["orderId"].as_i64()).collect();
        assert_eq!(ids, vec![2, 1]);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "catalog", "orders")))]
    async fn test_get_my_order_with_items(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let token = token_for(&state, BUYER_ID).await;
        let server = create_test_server(state);

        let response = server.get("/api/orders/1").bearer(&token).await;

        response.assert_status_ok();
        let order: serde_json::Value = response.json();
        assert_eq!(order["items"].as_array().unwrap().len(), 1);
        assert_eq!(order["items"][0]["packagingName"], "Jar 500");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "catalog", "orders")))]
    async fn test_foreign_order_not_found(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let token = token_for(&state, BUYER_ID).await;
        let server = create_test_server(state);

        // l'ordine 3 appartiene al cliente 2
        server
            .get("/api/orders/3")
            .bearer(&token)
            .await
            .assert_status_not_found();
        server
            .post("/api/orders/3/cancel")
            .bearer(&token)
            .await
            .assert_status_not_found();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "catalog", "orders")))]
    async fn test_cancel_order(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let token = token_for(&state, BUYER_ID).await;
        let server = create_test_server(state);

        let response = server.post("/api/orders/1/cancel").bearer(&token).await;
        response.assert_status_ok();
        let order: serde_json::Value = response.json();
        assert_eq!(order["status"], "CANCELLED");

        // una volta annullato non si annulla di nuovo
        server
            .post("/api/orders/1/cancel")
            .bearer(&token)
            .await
            .assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "catalog", "orders")))]
    async fn test_shipped_order_cannot_be_cancelled(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let token = token_for(&state, BUYER_ID).await;
        let server = create_test_server(state);

        server
            .post("/api/orders/2/cancel")
            .bearer(&token)
            .await
            .assert_status_bad_request();
        Ok(())
    }
}
