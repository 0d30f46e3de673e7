//! Order services - Piazzamento e storico ordini del cliente
//!
//! Il piazzamento è tutto-o-niente: ordine e righe vengono scritti in un'unica
//! transazione e, in caso di errore, dopo il rollback l'ordine viene comunque
//! cancellato per id come pulizia.

use super::cart::{cart_cookie_headers, read_cart};
use crate::core::{AppError, AppState, CurrentUser};
use crate::dtos::{Cart, MAX_CART_LINES, OrderDTO, OrderDetailDTO};
use crate::entities::{ClientProfile, LinePricing, round_money};
use crate::repositories::OrderRepository;
use axum::{
    Extension,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use crate::core::extract::{Json, Path};
use sqlx::{MySql, Transaction};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Client record of the session user; staff sessions have none
async fn require_client(
    state: &AppState,
    current_user: &CurrentUser,
) -> Result<ClientProfile, AppError> {
    state
        .client
        .find_by_user_id(current_user.user_id())
        .await?
        .ok_or_else(|| {
            warn!("Session user has no client record");
            AppError::forbidden("Only clients can place orders")
        })
}

/// Writes items and final total inside `tx`; returns the order total
async fn write_order_lines(
    tx: &mut Transaction<'static, MySql>,
    order_id: i32,
    cart: &Cart,
    min_order_amount: f64,
) -> Result<f64, AppError> {
    let mut total = 0.0;

    for line in &cart.items {
        let product = OrderRepository::fetch_product(tx, line.product_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| {
                AppError::bad_request("Cart contains an unavailable product")
                    .with_details(format!("Product {} is not available", line.product_id))
            })?;

        let packaging =
            OrderRepository::fetch_offered_packaging(tx, line.product_id, line.packaging_id)
                .await?
                .ok_or_else(|| {
                    AppError::bad_request("Cart contains an unavailable packaging").with_details(
                        format!(
                            "Packaging {} is not offered for product {}",
                            line.packaging_id, line.product_id
                        ),
                    )
                })?;

        let pricing = LinePricing::compute(product.price_per_gram, packaging.volume, line.quantity);
        OrderRepository::insert_item(tx, order_id, line, &pricing).await?;
        total += pricing.unit_price * f64::from(line.quantity);
    }

    let total = round_money(total);
    if total < min_order_amount {
        return Err(AppError::bad_request("Order total is below the minimum").with_details(
            format!("Total {:.2} is below the minimum of {:.2}", total, min_order_amount),
        ));
    }

    OrderRepository::finalize(tx, order_id, total).await?;
    Ok(total)
}

#[instrument(skip(state, current_user, headers), fields(user_id = %current_user.user_id()))]
pub async fn place_order(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    // 1. Risolvere il cliente dell'utente in sessione
    // 2. Carrello vuoto o oltre il limite di righe -> BAD_REQUEST
    // 3. Aprire la transazione e inserire l'ordine segnaposto (PENDING, totale 0)
    // 4. Per ogni riga verificare prodotto e imballaggio, calcolare i prezzi e inserire la riga
    // 5. Totale sotto il minimo -> rollback
    // 6. Aggiornare il totale, stato CONFIRMED, commit
    // 7. 201 con Location, cookie del carrello svuotato e dettaglio ordine
    let client = require_client(&state, &current_user).await?;

    let raw_cart = read_cart(&headers);
    let overflow = raw_cart.overflow_lines();
    if overflow > 0 {
        return Err(AppError::bad_request("Cart has too many lines").with_details(format!(
            "At most {} lines can be ordered, remove {}",
            MAX_CART_LINES, overflow
        )));
    }
    let cart = raw_cart.normalized();
    if cart.is_empty() {
        return Err(AppError::bad_request("Cart is empty"));
    }
    debug!("Placing order with {} lines", cart.items.len());

    let mut tx = state.order.begin().await?;
    let order_id = OrderRepository::insert_placeholder(&mut tx, client.client.client_id).await?;

    let outcome = match write_order_lines(&mut tx, order_id, &cart, state.min_order_amount).await
    {
        Ok(total) => tx.commit().await.map(|_| total).map_err(AppError::from),
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!("Rollback of order {} failed: {}", order_id, rollback_err);
            }
            Err(err)
        }
    };

    let total = match outcome {
        Ok(total) => total,
        Err(err) => {
            warn!("Order placement failed: {}", err.message());
            if let Err(purge_err) = state.order.purge(order_id).await {
                error!("Cleanup of order {} failed: {}", order_id, purge_err);
            }
            return Err(err);
        }
    };

    let order = state
        .order
        .read(order_id)
        .await?
        .ok_or_else(|| AppError::internal_server_error("Order vanished after commit"))?;
    let items = state.order.items_with_details(order_id).await?;
    info!("Order {} placed, total {:.2}", order_id, total);

    let mut response_headers = cart_cookie_headers(&Cart::default(), state.secure_cookies);
    response_headers.insert(header::LOCATION, HeaderValue::from_static("/orders"));

    Ok((
        StatusCode::CREATED,
        response_headers,
        Json(OrderDetailDTO::new(order, items)),
    ))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id()))]
pub async fn list_my_orders(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<Vec<OrderDTO>>, AppError> {
    let client = require_client(&state, &current_user).await?;
    let orders = state.order.list_by_client(client.client.client_id).await?;
    Ok(Json(orders.into_iter().map(OrderDTO::from).collect()))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id(), order_id = %order_id))]
pub async fn get_my_order(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(order_id): Path<i32>,
) -> Result<Json<OrderDetailDTO>, AppError> {
    let client = require_client(&state, &current_user).await?;
    let order = state
        .order
        .read_for_client(order_id, client.client.client_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;
    let items = state.order.items_with_details(order_id).await?;
    Ok(Json(OrderDetailDTO::new(order, items)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id(), order_id = %order_id))]
pub async fn cancel_my_order(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(order_id): Path<i32>,
) -> Result<Json<OrderDTO>, AppError> {
    let client = require_client(&state, &current_user).await?;
    let order = state
        .order
        .read_for_client(order_id, client.client.client_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    if !order.status.is_cancellable() || !state.order.cancel(order_id).await? {
        warn!("Order in status {:?} cannot be cancelled", order.status);
        return Err(AppError::bad_request("Order can no longer be cancelled"));
    }

    info!("Order cancelled by client");
    let order = state
        .order
        .read(order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;
    Ok(Json(OrderDTO::from(order)))
}
