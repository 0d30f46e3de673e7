//! Server library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Extension, Router,
    extract::DefaultBodyLimit,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{delete, get, patch, post},
};
use crate::repositories::LookupKind;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
};
use tracing::warn;

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state);

    let api = Router::new()
        .route("/health", get(root))
        .nest("/auth", configure_auth_routes())
        .merge(configure_public_routes())
        .merge(configure_shop_routes(state.clone()))
        .nest("/admin", configure_admin_routes(state.clone()));

    Router::new()
        .nest("/api", api)
        .nest_service("/uploads", ServeDir::new(state.files.root()))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

/// CORS con credenziali: sessione e carrello viaggiano nei cookie.
/// In sviluppo rispecchia l'origin della richiesta, in produzione ammette solo `cors_origin`.
fn cors_layer(state: &AppState) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    if !state.production {
        return cors
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true);
    }

    match state
        .cors_origin
        .as_deref()
        .map(HeaderValue::from_str)
    {
        Some(Ok(origin)) => cors.allow_origin(origin).allow_credentials(true),
        Some(Err(_)) => {
            warn!("CORS_ORIGIN is not a valid header value, cross-origin requests are refused");
            cors
        }
        None => cors,
    }
}

/// Autenticazione + controllo del ruolo per prefisso di rotta.
/// L'ultimo layer aggiunto gira per primo: prima si autentica, poi si controlla l'accesso.
fn protect(router: Router<Arc<AppState>>, state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{authentication_middleware, route_access_middleware};

    router
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            route_access_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes di autenticazione (login, register, recupero password)
fn configure_auth_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route("/login", post(login_user))
        .route("/register", post(register_user))
        .route("/logout", post(logout_user))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

/// Catalogo e modulo contatti, senza sessione
fn configure_public_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route("/products", get(list_products))
        .route("/products/{product_id}", get(get_product))
        .route("/categories", get(list_categories))
        .route("/form-types", get(list_form_types))
        .route("/questions", post(submit_question))
}

/// Profilo, carrello, ordini e contratto
fn configure_shop_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use services::*;

    let routes = Router::new()
        .route("/profile", get(get_profile).patch(update_profile))
        .route("/profile/password", patch(change_password).put(change_password))
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_item).patch(update_item))
        .route("/cart/items/{product_id}/{packaging_id}", delete(remove_item))
        .route("/orders", get(list_my_orders).post(place_order))
        .route("/orders/{order_id}", get(get_my_order))
        .route("/orders/{order_id}/cancel", post(cancel_my_order))
        .route("/uploads/contract", post(upload_contract));

    protect(routes, state)
}

/// Rotte condivise da materiali, unità e forme
fn lookup_routes(kind: LookupKind) -> Router<Arc<AppState>> {
    use services::admin::lookups::*;
    Router::new()
        .route("/", get(list_lookups).post(create_lookup))
        .route(
            "/{id}",
            get(get_lookup).put(update_lookup).delete(delete_lookup),
        )
        .layer(Extension(kind))
}

/// Back office, riservato allo staff
fn configure_admin_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use services::admin::{categories, orders, packaging, products, questions, users};
    use services::{list_categories, upload};

    let routes = Router::new()
        // prodotti
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/{product_id}",
            get(products::get_product)
                .patch(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/products/{product_id}/image",
            post(upload::upload_product_image),
        )
        .route(
            "/products/{product_id}/certificates",
            post(upload::upload_certificate),
        )
        .route(
            "/certificates/{certificate_id}",
            delete(upload::delete_certificate),
        )
        // imballaggi
        .route(
            "/packaging",
            get(packaging::list_packaging).post(packaging::create_packaging),
        )
        .route(
            "/packaging/{packaging_id}",
            get(packaging::get_packaging)
                .patch(packaging::update_packaging)
                .delete(packaging::delete_packaging),
        )
        .route(
            "/packaging/{packaging_id}/image",
            post(upload::upload_packaging_image),
        )
        // tabelle di riferimento
        .nest("/materials", lookup_routes(LookupKind::Material))
        .nest("/units", lookup_routes(LookupKind::Unit))
        .nest("/form-types", lookup_routes(LookupKind::FormType))
        .route(
            "/categories",
            get(list_categories).post(categories::create_category),
        )
        .route(
            "/categories/{category_id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        // utenti
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{user_id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        // ordini
        .route("/orders", get(orders::list_orders))
        .route(
            "/orders/{order_id}",
            get(orders::get_order)
                .patch(orders::update_order_status)
                .delete(orders::delete_order),
        )
        .route("/statuses", get(orders::list_statuses))
        // richieste
        .route("/questions", get(questions::list_questions))
        .route(
            "/questions/{question_id}",
            patch(questions::update_question).delete(questions::delete_question),
        );

    protect(routes, state)
}
