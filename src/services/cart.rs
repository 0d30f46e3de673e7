//! Cart services - Carrello conservato nel cookie del cliente
//!
//! Ogni lettura riconcilia il contenuto del cookie con il catalogo: le righe
//! di prodotti disattivati o di imballaggi non più offerti vengono scartate e
//! il cookie riscritto.

use crate::core::cookies::{build_cookie, expired_cookie, read_cookie, to_header_value};
use crate::core::{AppError, AppState, FileStore};
use crate::dtos::cart::{CART_COOKIE, CART_COOKIE_MAX_AGE_SECS};
use crate::dtos::{Cart, CartItemDTO, CartLineView, CartView};
use crate::entities::{LinePricing, round_money};
use axum::{
    extract::State,
    http::{HeaderMap, header},
    response::IntoResponse,
};
use crate::core::extract::{Json, Path};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

pub(crate) fn read_cart(headers: &HeaderMap) -> Cart {
    read_cookie(headers, CART_COOKIE)
        .map(|raw| Cart::from_cookie_value(&raw))
        .unwrap_or_default()
}

/// Set-Cookie for the cart; an empty cart expires the cookie
pub(crate) fn cart_cookie_headers(cart: &Cart, secure: bool) -> HeaderMap {
    let cookie = if cart.is_empty() {
        expired_cookie(CART_COOKIE, secure)
    } else {
        build_cookie(
            CART_COOKIE,
            &cart.to_cookie_value(),
            CART_COOKIE_MAX_AGE_SECS,
            secure,
        )
    };
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, to_header_value(&cookie));
    headers
}

/// Drops lines no longer orderable or beyond the line limit and prices the rest.
/// Returns the cleaned cart with its view.
async fn reconcile(state: &AppState, cart: &Cart) -> Result<(Cart, CartView), AppError> {
    let normalized = cart.normalized();
    let mut kept = Cart::default();
    let mut lines = Vec::with_capacity(normalized.items.len());

    for line in &normalized.items {
        let product = match state.product.read_listing(line.product_id).await? {
            Some(product) if product.is_active => product,
            _ => {
                debug!("Dropping line of unavailable product {}", line.product_id);
                continue;
            }
        };
        let Some(packaging) = state
            .packaging
            .find_offered(line.product_id, line.packaging_id)
            .await?
        else {
            debug!(
                "Dropping line with packaging {} not offered for product {}",
                line.packaging_id, line.product_id
            );
            continue;
        };

        let pricing = LinePricing::compute(product.price_per_gram, packaging.volume, line.quantity);
        lines.push(CartLineView {
            product_id: product.product_id,
            product_name: product.name,
            packaging_id: packaging.packaging_id,
            packaging_name: packaging.name,
            packaging_volume: packaging.volume,
            unit_name: packaging.unit_name,
            quantity: line.quantity,
            unit_price: pricing.unit_price,
            batch_volume: pricing.batch_volume,
            line_total: pricing.line_total,
            image_url: product.image_path.as_deref().map(FileStore::public_url),
        });
        kept.items.push(line.clone());
    }

    let removed_lines = cart.overflow_lines() + normalized.items.len() - kept.items.len();
    let total = round_money(lines.iter().map(|l| l.line_total).sum());
    let view = CartView {
        items: lines,
        total,
        min_order_amount: state.min_order_amount,
        meets_minimum: total >= state.min_order_amount,
        removed_lines,
    };
    Ok((kept, view))
}

/// Reconciles `cart` and answers with the view, rewriting the cookie when
/// `force_cookie` is set or the reconciliation changed the cart
async fn respond_with(
    state: &AppState,
    original: &Cart,
    force_cookie: bool,
) -> Result<(HeaderMap, Json<CartView>), AppError> {
    let (kept, view) = reconcile(state, original).await?;
    let headers = if force_cookie || kept != *original {
        cart_cookie_headers(&kept, state.secure_cookies)
    } else {
        HeaderMap::new()
    };
    Ok((headers, Json(view)))
}

#[instrument(skip(state, headers))]
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let cart = read_cart(&headers);
    respond_with(&state, &cart, false).await
}

#[instrument(skip(state, headers, body), fields(product_id = %body.product_id, packaging_id = %body.packaging_id))]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CartItemDTO>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Il prodotto deve esistere (404) ed essere attivo (400)
    // 2. L'imballaggio deve essere offerto per il prodotto (400)
    // 3. Unire con la riga esistente e normalizzare la quantità
    body.validate()?;

    let product = state
        .product
        .read_listing(body.product_id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;
    if !product.is_active {
        warn!("Attempt to add an inactive product");
        return Err(AppError::bad_request("Product is not available"));
    }
    if state
        .packaging
        .find_offered(body.product_id, body.packaging_id)
        .await?
        .is_none()
    {
        warn!("Packaging not offered for product");
        return Err(AppError::bad_request("Packaging is not offered for this product"));
    }

    let mut cart = read_cart(&headers).normalized();
    if !cart.add(body.product_id, body.packaging_id, body.quantity) {
        return Err(AppError::bad_request("Cart is full")
            .with_details("Remove a line before adding another product"));
    }

    info!("Cart line added");
    respond_with(&state, &cart, true).await
}

#[instrument(skip(state, headers, body), fields(product_id = %body.product_id, packaging_id = %body.packaging_id))]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CartItemDTO>,
) -> Result<impl IntoResponse, AppError> {
    body.validate()?;

    let mut cart = read_cart(&headers).normalized();
    if !cart.set_quantity(body.product_id, body.packaging_id, body.quantity) {
        return Err(AppError::not_found("Cart line not found"));
    }

    respond_with(&state, &cart, true).await
}

#[instrument(skip(state, headers))]
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((product_id, packaging_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    let mut cart = read_cart(&headers).normalized();
    if !cart.remove(product_id, packaging_id) {
        debug!("Line was not in the cart");
    }

    respond_with(&state, &cart, true).await
}

#[instrument(skip(state))]
pub async fn clear_cart(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let empty = Cart::default();
    (
        cart_cookie_headers(&empty, state.secure_cookies),
        Json(CartView {
            items: Vec::new(),
            total: 0.0,
            min_order_amount: state.min_order_amount,
            meets_minimum: false,
            removed_lines: 0,
        }),
    )
}
