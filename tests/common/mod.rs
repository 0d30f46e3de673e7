use axum::http::{HeaderName, HeaderValue, header};
use axum_test::{TestRequest, TestServer};
use sqlx::MySqlPool;
use std::path::Path;
use std::sync::Arc;
use storefront::AppState;
use storefront::auth::encode_jwt;
use storefront::repositories::Read;

pub const JWT_SECRET: &str = "ilmiobellissimosegretochevaassolutamentecambiato";

// id dei fixture `users`
pub const ADMIN_ID: i32 = 1;
pub const MANAGER_ID: i32 = 2;
pub const OTHER_MANAGER_ID: i32 = 3;
pub const BUYER_ID: i32 = 4;
pub const PERSON_ID: i32 = 5;
pub const OTHER_ADMIN_ID: i32 = 7;

/// Crea un AppState per i test
///
/// # Arguments
/// * `pool` - Connection pool MySQL
///
/// # Returns
/// Arc<AppState> configurato con il JWT secret di test
pub fn create_test_state(pool: MySqlPool) -> Arc<AppState> {
    Arc::new(AppState::new(pool, JWT_SECRET.to_string()))
}

/// Come `create_test_state`, con i file caricati sotto `upload_dir`
pub fn create_test_state_with_uploads(pool: MySqlPool, upload_dir: &Path) -> Arc<AppState> {
    Arc::new(AppState::new(pool, JWT_SECRET.to_string()).with_upload_dir(upload_dir))
}

/// Crea un TestServer per i test
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = storefront::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Session token for a fixture user, signed with the crate's own encoder
pub async fn token_for(state: &AppState, user_id: i32) -> String {
    let user = state
        .user
        .read(&user_id)
        .await
        .expect("query user")
        .expect("fixture user exists");
    let profile = state
        .client
        .find_by_user_id(user_id)
        .await
        .expect("query client");
    encode_jwt(&user, profile.as_ref(), JWT_SECRET, 1).expect("token")
}

pub trait RequestExt {
    fn bearer(self, token: &str) -> Self;
    fn cookie(self, cookie: &str) -> Self;
}

impl RequestExt for TestRequest {
    fn bearer(self, token: &str) -> Self {
        self.add_header(
            HeaderName::from_static("authorization"),
            format!("Bearer {}", token),
        )
    }

    fn cookie(self, cookie: &str) -> Self {
        self.add_header(header::COOKIE, HeaderValue::from_str(cookie).expect("cookie"))
    }
}

/// `name=value` part of the first Set-Cookie header for `name`
pub fn set_cookie(response: &axum_test::TestResponse, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .map(str::to_string)
}

/// Cookie header value carrying the cart from a Set-Cookie header
pub fn cart_cookie_from(response: &axum_test::TestResponse) -> String {
    let set_cookie = set_cookie(response, "cart").expect("cart cookie set");
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

/// Cart cookie with the given `(product, packaging, quantity)` lines
pub fn cart_cookie(lines: &[(i32, i32, i32)]) -> String {
    let items: Vec<serde_json::Value> = lines
        .iter()
        .map(|(product_id, packaging_id, quantity)| {
            serde_json::json!({
                "productId": product_id,
                "packagingId": packaging_id,
                "quantity": quantity
            })
        })
        .collect();
    let json = serde_json::json!({ "items": items }).to_string();
    format!("cart={}", urlencoding::encode(&json))
}

pub async fn count_rows(pool: &MySqlPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .expect("count rows")
}
