//! Integration tests per gli endpoints di autenticazione e profilo
//!
//! Questi test usano `#[sqlx::test]` che:
//! - Crea automaticamente un database di test isolato
//! - Applica le migrations da `migrations/`
//! - Applica i fixtures specificati da `fixtures/`
//! - Pulisce il database al termine

mod common;

#[cfg(test)]
mod auth_tests {
    use super::common::*;
    use serde_json::json;
    use sqlx::MySqlPool;

    fn legal_entity_body(email: &str, password: &str) -> serde_json::Value {
        json!({
            "email": email,
            "password": password,
            "clientType": "LEGAL_ENTITY",
            "phone": "+39 02 7654321",
            "companyName": "Nuova Srl",
            "taxId": "0987654321"
        })
    }

    // ============================================================
    // POST /api/auth/register
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_legal_entity_logs_in(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));

        let response = server
            .post("/api/auth/register")
            .json(&legal_entity_body("New.Buyer@Example.com", "Password123"))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        assert!(set_cookie(&response, "token").is_some());
        let session: serde_json::Value = response.json();
        assert_eq!(session["email"], "new.buyer@example.com");
        assert_eq!(session["role"], "Client");
        assert_eq!(session["clientType"], "LEGAL_ENTITY");
        assert_eq!(session["displayName"], "Nuova Srl");

        let entities: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM legal_entities le JOIN clients c ON c.client_id = le.client_id
             JOIN users u ON u.user_id = c.user_id WHERE u.email = 'new.buyer@example.com'",
        )
        .fetch_one(&pool)
        .await?;
        assert_eq!(entities, 1);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_duplicate_email_conflict(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));
        let users_before = count_rows(&pool, "users").await;

        let response = server
            .post("/api/auth/register")
            .json(&legal_entity_body("buyer@example.com", "Password123"))
            .await;

        response.assert_status_conflict();
        assert_eq!(count_rows(&pool, "users").await, users_before);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_individual_requires_full_name(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/api/auth/register")
            .json(&json!({
                "email": "someone@example.com",
                "password": "Password123",
                "clientType": "INDIVIDUAL"
            }))
            .await;

        response.assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_rejects_short_password(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/api/auth/register")
            .json(&legal_entity_body("short@example.com", "abc"))
            .await;

        response.assert_status_bad_request();
        Ok(())
    }

    // ============================================================
    // POST /api/auth/login, /api/auth/logout
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_login_success(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        // Prima registriamo un nuovo utente
        server
            .post("/api/auth/register")
            .json(&legal_entity_body("logintest@example.com", "TestLogin123"))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "LoginTest@example.com", "password": "TestLogin123" }))
            .await;

        response.assert_status_ok();
        let cookie = set_cookie(&response, "token").expect("session cookie");
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));

        let auth_header = response
            .headers()
            .get("authorization")
            .expect("bearer header")
            .to_str()
            .unwrap();
        assert!(auth_header.starts_with("Bearer "));

        let session: serde_json::Value = response.json();
        assert_eq!(session["displayName"], "Nuova Srl");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_login_wrong_password(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        server
            .post("/api/auth/register")
            .json(&legal_entity_body("wrongpw@example.com", "Password123"))
            .await;

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "wrongpw@example.com", "password": "Password124" }))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_login_nonexistent_user(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "nobody@example.com", "password": "Password123" }))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_login_deactivated_account_forbidden(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));
        server
            .post("/api/auth/register")
            .json(&legal_entity_body("soon.disabled@example.com", "Password123"))
            .await;
        sqlx::query("UPDATE users SET is_active = FALSE WHERE email = 'soon.disabled@example.com'")
            .execute(&pool)
            .await?;

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "soon.disabled@example.com", "password": "Password123" }))
            .await;

        response.assert_status_forbidden();
        Ok(())
    }

    #[sqlx::test]
    async fn test_logout_expires_session_cookie(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server.post("/api/auth/logout").await;

        response.assert_status_ok();
        let cookie = set_cookie(&response, "token").expect("cleared cookie");
        assert!(cookie.contains("Max-Age=0"));
        Ok(())
    }

    // ============================================================
    // Recupero password
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_forgot_password_unknown_email_is_silent(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));

        let response = server
            .post("/api/auth/forgot-password")
            .json(&json!({ "email": "ghost@example.com" }))
            .await;

        response.assert_status_ok();
        assert_eq!(count_rows(&pool, "password_resets").await, 0);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_password_reset_flow(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));
        server
            .post("/api/auth/register")
            .json(&legal_entity_body("forgetful@example.com", "Password123"))
            .await;

        server
            .post("/api/auth/forgot-password")
            .json(&json!({ "email": "forgetful@example.com" }))
            .await
            .assert_status_ok();

        let token: String = sqlx::query_scalar(
            "SELECT pr.token FROM password_resets pr JOIN users u ON u.user_id = pr.user_id
             WHERE u.email = 'forgetful@example.com'",
        )
        .fetch_one(&pool)
        .await?;

        server
            .post("/api/auth/reset-password")
            .json(&json!({ "token": token, "password": "BrandNew456" }))
            .await
            .assert_status_ok();

        server
            .post("/api/auth/login")
            .json(&json!({ "email": "forgetful@example.com", "password": "BrandNew456" }))
            .await
            .assert_status_ok();

        // il token è monouso
        server
            .post("/api/auth/reset-password")
            .json(&json!({ "token": token, "password": "Another789" }))
            .await
            .assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_expired_reset_token_rejected(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));
        sqlx::query(
            "INSERT INTO password_resets (token, user_id, expires_at) VALUES ('old-token', 4, NOW() - INTERVAL 1 HOUR)",
        )
        .execute(&pool)
        .await?;

        let response = server
            .post("/api/auth/reset-password")
            .json(&json!({ "token": "old-token", "password": "BrandNew456" }))
            .await;

        response.assert_status_bad_request();
        Ok(())
    }

    // ============================================================
    // Sessione e profilo
    // ============================================================

    #[sqlx::test]
    async fn test_health(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server.get("/api/health").await;

        response.assert_status_ok();
        response.assert_text("Server is running!");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_profile_requires_session(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server.get("/api/profile").await.assert_status_unauthorized();
        server
            .get("/api/profile")
            .bearer("not.a.token")
            .await
            .assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_session_cookie_is_accepted(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let token = token_for(&state, BUYER_ID).await;
        let server = create_test_server(state);

        let response = server
            .get("/api/profile")
            .cookie(&format!("token={}", token))
            .await;

        response.assert_status_ok();
        let profile: serde_json::Value = response.json();
        assert_eq!(profile["client"]["companyName"], "Acme Trading");
        assert_eq!(profile["client"]["clientType"], "LEGAL_ENTITY");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_deactivated_user_session_rejected(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let token = token_for(&state, 6).await;
        let server = create_test_server(state);

        server
            .get("/api/profile")
            .bearer(&token)
            .await
            .assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_update_profile_reissues_session(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let token = token_for(&state, BUYER_ID).await;
        let server = create_test_server(state);

        let response = server
            .patch("/api/profile")
            .bearer(&token)
            .json(&json!({ "phone": "+39 02 0000000", "companyName": "Acme Trading Spa" }))
            .await;

        response.assert_status_ok();
        assert!(set_cookie(&response, "token").is_some());
        let profile: serde_json::Value = response.json();
        assert_eq!(profile["client"]["phone"], "+39 02 0000000");
        assert_eq!(profile["client"]["companyName"], "Acme Trading Spa");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_staff_profile_update_rejected(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let token = token_for(&state, MANAGER_ID).await;
        let server = create_test_server(state);

        server
            .patch("/api/profile")
            .bearer(&token)
            .json(&json!({ "phone": "+39 02 0000000" }))
            .await
            .assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_change_password(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));
        let register = server
            .post("/api/auth/register")
            .json(&legal_entity_body("changer@example.com", "Password123"))
            .await;
        let bearer = register
            .headers()
            .get("authorization")
            .expect("bearer header")
            .to_str()
            .unwrap()
            .trim_start_matches("Bearer ")
            .to_string();

        server
            .put("/api/profile/password")
            .bearer(&bearer)
            .json(&json!({ "currentPassword": "wrong-one", "newPassword": "Changed123" }))
            .await
            .assert_status_bad_request();

        server
            .put("/api/profile/password")
            .bearer(&bearer)
            .json(&json!({ "currentPassword": "Password123", "newPassword": "Changed123" }))
            .await
            .assert_status_ok();

        server
            .post("/api/auth/login")
            .json(&json!({ "email": "changer@example.com", "password": "Changed123" }))
            .await
            .assert_status_ok();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_login_missing_field_is_json_bad_request(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "buyer@example.com" }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Invalid JSON body");
        assert!(body["details"].as_str().unwrap_or_default().contains("password"));
        Ok(())
    }
}
