//! Integration tests per il catalogo pubblico e il modulo contatti
//!
//! Endpoints testati:
//! - GET  /api/products
//! - GET  /api/products/{product_id}
//! - GET  /api/categories
//! - GET  /api/form-types
//! - POST /api/questions

mod common;

#[cfg(test)]
mod catalog_tests {
    use super::common::*;
    use serde_json::json;
    use sqlx::MySqlPool;

    #[sqlx::test(fixtures(path = "../fixtures", scripts("catalog")))]
    async fn test_list_products_hides_inactive(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server.get("/api/products").await;

        response.assert_status_ok();
        let products: Vec<serde_json::Value> = response.json();
        let names: Vec<&str> = products.iter().filter_map(|p| p["name"].as_str()).collect();
        assert_eq!(names, vec!["Collagen", "Glycerin", "Whey Protein"]);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("catalog")))]
    async fn test_list_products_price_from_smallest_packaging(
        pool: MySqlPool,
    ) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let products: Vec<serde_json::Value> = server.get("/api/products").await.json();
        let whey = products
            .iter()
            .find(|p| p["productId"] == 1)
            .expect("whey listed");

        // sacchetto da 100 g a 0.05 al grammo
        assert_eq!(whey["priceFrom"].as_f64(), Some(5.0));
        assert_eq!(whey["categoryName"], "Powders");
        assert_eq!(whey["formTypeName"], "Powder");
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("catalog")))]
    async fn test_list_products_filters(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let by_category: Vec<serde_json::Value> = server
            .get("/api/products")
            .add_query_param("categoryId", 2)
            .await
            .json();
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0]["name"], "Glycerin");

        let by_search: Vec<serde_json::Value> = server
            .get("/api/products")
            .add_query_param("search", "coll")
            .await
            .json();
        assert_eq!(by_search.len(), 1);
        assert_eq!(by_search[0]["productId"], 2);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("catalog")))]
    async fn test_product_detail_prices_each_packaging(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server.get("/api/products/1").await;

        response.assert_status_ok();
        let product: serde_json::Value = response.json();
        assert_eq!(product["name"], "Whey Protein");
        let packaging = product["packaging"].as_array().expect("packaging array");
        assert_eq!(packaging.len(), 2);
        // ordinati per volume
        assert_eq!(packaging[0]["name"], "Bag 100");
        assert_eq!(packaging[0]["unitPrice"].as_f64(), Some(5.0));
        assert_eq!(packaging[1]["name"], "Jar 500");
        assert_eq!(packaging[1]["unitPrice"].as_f64(), Some(25.0));
        assert_eq!(packaging[1]["materialName"], "Plastic");
        assert!(product["certificates"].as_array().unwrap().is_empty());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("catalog")))]
    async fn test_inactive_product_not_found(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server.get("/api/products/3").await.assert_status_not_found();
        server.get("/api/products/999").await.assert_status_not_found();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("catalog")))]
    async fn test_reference_lists(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let categories: Vec<serde_json::Value> = server.get("/api/categories").await.json();
        assert_eq!(categories.len(), 3);

        let form_types: Vec<serde_json::Value> = server.get("/api/form-types").await.json();
        assert_eq!(form_types.len(), 3);
        assert!(form_types.iter().any(|f| f["name"] == "Capsules"));
        Ok(())
    }

    // ============================================================
    // POST /api/questions
    // ============================================================

    #[sqlx::test]
    async fn test_submit_question(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));

        let response = server
            .post("/api/questions")
            .json(&json!({
                "name": "Giulia",
                "email": "giulia@example.com",
                "message": "Do you ship to Switzerland?"
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let question: serde_json::Value = response.json();
        assert_eq!(question["isAnswered"], false);
        assert_eq!(count_rows(&pool, "questions").await, 1);
        Ok(())
    }

    #[sqlx::test]
    async fn test_submit_question_invalid_email(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));

        let response = server
            .post("/api/questions")
            .json(&json!({
                "name": "Giulia",
                "email": "not-an-email",
                "message": "Hello"
            }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(count_rows(&pool, "questions").await, 0);
        Ok(())
    }

    #[sqlx::test]
    async fn test_submit_question_wrong_type_is_json_bad_request(
        pool: MySqlPool,
    ) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone()));

        let response = server
            .post("/api/questions")
            .json(&json!({ "name": 5 }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Invalid JSON body");
        assert_eq!(count_rows(&pool, "questions").await, 0);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("catalog")))]
    async fn test_malformed_path_and_query_are_json_bad_request(
        pool: MySqlPool,
    ) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server.get("/api/products/abc").await;
        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Invalid path parameter");

        let response = server.get("/api/products?categoryId=abc").await;
        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Invalid query string");
        Ok(())
    }
}
