//! Order DTOs - Data Transfer Objects per ordini

use crate::entities::{Order, OrderItemDetails, OrderStatus, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderDTO {
    pub order_id: i32,
    pub client_id: i32,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderDTO {
    fn from(value: Order) -> Self {
        Self {
            order_id: value.order_id,
            client_id: value.client_id,
            status: value.status,
            total_amount: value.total_amount,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDTO {
    pub order_item_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub packaging_id: i32,
    pub packaging_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub batch_volume: f64,
}

impl From<OrderItemDetails> for OrderItemDTO {
    fn from(value: OrderItemDetails) -> Self {
        Self {
            order_item_id: value.order_item_id,
            product_id: value.product_id,
            product_name: value.product_name,
            packaging_id: value.packaging_id,
            packaging_name: value.packaging_name,
            quantity: value.quantity,
            unit_price: value.unit_price,
            batch_volume: value.batch_volume,
        }
    }
}

/// Ordine con le sue righe
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailDTO {
    #[serde(flatten)]
    pub order: OrderDTO,
    pub items: Vec<OrderItemDTO>,
}

impl OrderDetailDTO {
    pub fn new(order: Order, items: Vec<OrderItemDetails>) -> Self {
        Self {
            order: OrderDTO::from(order),
            items: items.into_iter().map(OrderItemDTO::from).collect(),
        }
    }
}

/// Filtri della lista ordini nel back office
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderQuery {
    pub status_id: Option<i32>,
    pub client_id: Option<i32>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusDTO {
    pub status_id: i32,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatusDTO {
    pub status_id: i32,
    pub code: String,
    pub name: String,
}

impl From<Status> for StatusDTO {
    fn from(value: Status) -> Self {
        Self {
            status_id: value.status_id,
            code: value.code,
            name: value.name,
        }
    }
}
