//! Integration tests per la gestione utenti nel back office
//!
//! Endpoints testati:
//! - GET    /api/admin/users
//! - POST   /api/admin/users
//! - GET    /api/admin/users/{user_id}
//! - PATCH  /api/admin/users/{user_id}
//! - DELETE /api/admin/users/{user_id}

mod common;

#[cfg(test)]
mod admin_user_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use sqlx::MySqlPool;

    async fn server_as(pool: MySqlPool, user_id: i32) -> (TestServer, String) {
        let state = create_test_state(pool);
        let token = token_for(&state, user_id).await;
        (create_test_server(state), token)
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_list_users_with_client_summary(pool: MySqlPool) -> sqlx::Result<()> {
        let (server, token) = server_as(pool, ADMIN_ID).await;

        let response = server.get("/api/admin/users").bearer(&token).await;

        response.assert_status_ok();
        let users: Vec<serde_json::Value> = response.json();
        assert_eq!(users.len(), 7);
        let buyer = users.iter().find(|u| u["userId"] == BUYER_ID).unwrap();
        assert_eq!(buyer["client"]["displayName"], "Acme Trading");
        let admin = users.iter().find(|u| u["userId"] == ADMIN_ID).unwrap();
        assert!(admin["client"].is_null());
        // la password non esce mai
        assert!(users.iter().all(|u| u.get("password").is_none()));
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_get_user(pool: MySqlPool) -> sqlx::Result<()> {
        let (server, token) = server_as(pool, MANAGER_ID).await;

        let user: serde_json::Value = server
            .get(&format!("/api/admin/users/{}", PERSON_ID))
            .bearer(&token)
            .await
            .json();
        assert_eq!(user["client"]["clientType"], "INDIVIDUAL");

        server
            .get("/api/admin/users/999")
            .bearer(&token)
            .await
            .assert_status_not_found();
        Ok(())
    }

    // ============================================================
    // Creazione
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_admin_creates_manager(pool: MySqlPool) -> sqlx::Result<()> {
        let (server, token) = server_as(pool, ADMIN_ID).await;

        let response = server
            .post("/api/admin/users")
            .bearer(&token)
            .json(&json!({
                "email": "New.Manager@example.com",
                "password": "Password123",
                "roleId": 2
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let user: serde_json::Value = response.json();
        assert_eq!(user["email"], "new.manager@example.com");
        assert_eq!(user["role"], "Manager");
        assert_eq!(user["isActive"], true);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_manager_creates_only_clients(pool: MySqlPool) -> sqlx::Result<()> {
        let (server, token) = server_as(pool, MANAGER_ID).await;

        server
            .post("/api/admin/users")
            .bearer(&token)
            .json(&json!({ "email": "m@example.com", "password": "Password123", "roleId": 2 }))
            .await
            .assert_status_forbidden();
        server
            .post("/api/admin/users")
            .bearer(&token)
            .json(&json!({ "email": "a@example.com", "password": "Password123", "roleId": 1 }))
            .await
            .assert_status_forbidden();
        server
            .post("/api/admin/users")
            .bearer(&token)
            .json(&json!({ "email": "c@example.com", "password": "Password123", "roleId": 3 }))
            .await
            .assert_status(StatusCode::CREATED);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_create_user_rejections(pool: MySqlPool) -> sqlx::Result<()> {
        let (server, token) = server_as(pool, ADMIN_ID).await;

        server
            .post("/api/admin/users")
            .bearer(&token)
            .json(&json!({ "email": "buyer@example.com", "password": "Password123", "roleId": 3 }))
            .await
            .assert_status_conflict();
        server
            .post("/api/admin/users")
            .bearer(&token)
            .json(&json!({ "email": "x@example.com", "password": "Password123", "roleId": 9 }))
            .await
            .assert_status_bad_request();
        Ok(())
    }

    // ============================================================
    // Modifica
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_cannot_edit_own_account(pool: MySqlPool) -> sqlx::Result<()> {
        let (server, token) = server_as(pool, ADMIN_ID).await;

        server
            .patch(&format!("/api/admin/users/{}", ADMIN_ID))
            .bearer(&token)
            .json(&json!({ "isActive": false }))
            .await
            .assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_manager_edit_restrictions(pool: MySqlPool) -> sqlx::Result<()> {
        let (server, token) = server_as(pool, MANAGER_ID).await;

        server
            .patch(&format!("/api/admin/users/{}", OTHER_MANAGER_ID))
            .bearer(&token)
            .json(&json!({ "isActive": false }))
            .await
            .assert_status_forbidden();
        server
            .patch(&format!("/api/admin/users/{}", ADMIN_ID))
            .bearer(&token)
            .json(&json!({ "isActive": false }))
            .await
            .assert_status_forbidden();
        // promuovere un cliente a manager non è consentito
        server
            .patch(&format!("/api/admin/users/{}", PERSON_ID))
            .bearer(&token)
            .json(&json!({ "roleId": 2 }))
            .await
            .assert_status_forbidden();

        let updated: serde_json::Value = server
            .patch(&format!("/api/admin/users/{}", PERSON_ID))
            .bearer(&token)
            .json(&json!({ "email": "Maria@Example.com" }))
            .await
            .json();
        assert_eq!(updated["email"], "maria@example.com");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_update_email_conflict(pool: MySqlPool) -> sqlx::Result<()> {
        let (server, token) = server_as(pool, ADMIN_ID).await;

        server
            .patch(&format!("/api/admin/users/{}", PERSON_ID))
            .bearer(&token)
            .json(&json!({ "email": "buyer@example.com" }))
            .await
            .assert_status_conflict();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_deactivated_manager_loses_access(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let admin = token_for(&state, ADMIN_ID).await;
        let manager = token_for(&state, MANAGER_ID).await;
        let server = create_test_server(state);

        let updated: serde_json::Value = server
            .patch(&format!("/api/admin/users/{}", MANAGER_ID))
            .bearer(&admin)
            .json(&json!({ "isActive": false }))
            .await
            .json();
        assert_eq!(updated["isActive"], false);

        server
            .get("/api/admin/users")
            .bearer(&manager)
            .await
            .assert_status_unauthorized();
        Ok(())
    }

    // ============================================================
    // Cancellazione
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_admin_cannot_delete_admin(pool: MySqlPool) -> sqlx::Result<()> {
        let (server, token) = server_as(pool, OTHER_ADMIN_ID).await;

        server
            .delete(&format!("/api/admin/users/{}", ADMIN_ID))
            .bearer(&token)
            .await
            .assert_status_forbidden();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "catalog", "orders")))]
    async fn test_client_with_orders_cannot_be_deleted(pool: MySqlPool) -> sqlx::Result<()> {
        let (server, token) = server_as(pool.clone(), ADMIN_ID).await;

        server
            .delete(&format!("/api/admin/users/{}", BUYER_ID))
            .bearer(&token)
            .await
            .assert_status_bad_request();
        assert_eq!(count_rows(&pool, "users").await, 7);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_delete_client_cascades(pool: MySqlPool) -> sqlx::Result<()> {
        let (server, token) = server_as(pool.clone(), MANAGER_ID).await;

        server
            .delete(&format!("/api/admin/users/{}", BUYER_ID))
            .bearer(&token)
            .await
            .assert_status_ok();

        assert_eq!(count_rows(&pool, "users").await, 6);
        assert_eq!(count_rows(&pool, "clients").await, 2);
        assert_eq!(count_rows(&pool, "legal_entities").await, 0);
        Ok(())
    }
}
