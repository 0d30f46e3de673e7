//! Admin orders - Consultazione e gestione degli ordini

use crate::core::{AppError, AppState};
use crate::dtos::{AdminOrderQuery, OrderDTO, OrderDetailDTO, StatusDTO, UpdateOrderStatusDTO};
use crate::entities::OrderStatus;
use axum::extract::State;
use crate::core::extract::{Json, Path, Query};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};

#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AdminOrderQuery>, // /admin/orders?statusId=2&clientId=5
) -> Result<Json<Vec<OrderDTO>>, AppError> {
    let orders = state.order.list_filtered(&params).await?;
    info!("Found {} orders", orders.len());
    Ok(Json(orders.into_iter().map(OrderDTO::from).collect()))
}

#[instrument(skip(state), fields(order_id = %order_id))]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<i32>,
) -> Result<Json<OrderDetailDTO>, AppError> {
    let order = state
        .order
        .read(order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;
    let items = state.order.items_with_details(order_id).await?;
    Ok(Json(OrderDetailDTO::new(order, items)))
}

#[instrument(skip(state, body), fields(order_id = %order_id, status_id = %body.status_id))]
pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<i32>,
    Json(body): Json<UpdateOrderStatusDTO>,
) -> Result<Json<OrderDTO>, AppError> {
    let status = OrderStatus::from_id(body.status_id).ok_or_else(|| {
        AppError::bad_request("Unknown status")
            .with_details(format!("statusId {} does not exist", body.status_id))
    })?;
    if state.order.read(order_id).await?.is_none() {
        return Err(AppError::not_found("Order not found"));
    }

    let order = state.order.update_status(order_id, status).await?;
    Ok(Json(OrderDTO::from(order)))
}

#[instrument(skip(state), fields(order_id = %order_id))]
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.order.delete(order_id).await?;
    Ok(Json(json!({ "message": "Order deleted" })))
}

pub async fn list_statuses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StatusDTO>>, AppError> {
    let statuses = state.order.statuses().await?;
    Ok(Json(statuses.into_iter().map(StatusDTO::from).collect()))
}
