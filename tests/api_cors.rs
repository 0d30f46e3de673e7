//! Integration tests per il layer CORS
//!
//! In sviluppo ogni origin viene rispecchiata con credenziali,
//! in produzione solo quella configurata.

mod common;

#[cfg(test)]
mod cors_tests {
    use super::common::*;
    use axum::http::{HeaderValue, Method, header};
    use sqlx::MySqlPool;
    use std::sync::Arc;
    use storefront::AppState;

    const FRONTEND: &str = "http://localhost:5173";
    const SHOP_ORIGIN: &str = "https://shop.example.com";

    fn allowed_origin(response: &axum_test::TestResponse) -> Option<String> {
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    fn production_state(pool: MySqlPool) -> Arc<AppState> {
        Arc::new(
            AppState::new(pool, JWT_SECRET.to_string())
                .for_production(Some(SHOP_ORIGIN.to_string())),
        )
    }

    #[sqlx::test]
    async fn test_development_mirrors_any_origin(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .get("/api/health")
            .add_header(header::ORIGIN, HeaderValue::from_static(FRONTEND))
            .await;

        response.assert_status_ok();
        assert_eq!(allowed_origin(&response).as_deref(), Some(FRONTEND));
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .and_then(|value| value.to_str().ok()),
            Some("true")
        );
        Ok(())
    }

    #[sqlx::test]
    async fn test_development_preflight_allows_cart_patch(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .method(Method::OPTIONS, "/api/cart/items")
            .add_header(header::ORIGIN, HeaderValue::from_static(FRONTEND))
            .add_header(
                header::ACCESS_CONTROL_REQUEST_METHOD,
                HeaderValue::from_static("PATCH"),
            )
            .await;

        response.assert_status_ok();
        assert_eq!(allowed_origin(&response).as_deref(), Some(FRONTEND));
        let methods = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(methods.contains("PATCH"));
        Ok(())
    }

    #[sqlx::test]
    async fn test_production_allows_only_configured_origin(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(production_state(pool));

        let response = server
            .get("/api/health")
            .add_header(header::ORIGIN, HeaderValue::from_static(SHOP_ORIGIN))
            .await;
        response.assert_status_ok();
        assert_eq!(allowed_origin(&response).as_deref(), Some(SHOP_ORIGIN));

        let response = server
            .get("/api/health")
            .add_header(header::ORIGIN, HeaderValue::from_static(FRONTEND))
            .await;
        response.assert_status_ok();
        assert_eq!(allowed_origin(&response), None);
        Ok(())
    }

    #[sqlx::test]
    async fn test_production_without_origin_refuses_cross_origin(
        pool: MySqlPool,
    ) -> sqlx::Result<()> {
        let state = Arc::new(AppState::new(pool, JWT_SECRET.to_string()).for_production(None));
        let server = create_test_server(state);

        let response = server
            .get("/api/health")
            .add_header(header::ORIGIN, HeaderValue::from_static(FRONTEND))
            .await;

        response.assert_status_ok();
        assert_eq!(allowed_origin(&response), None);
        Ok(())
    }
}
