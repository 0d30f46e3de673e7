//! Order entities - Ordini, righe d'ordine e stati

use super::enums::OrderStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Order {
    pub order_id: i32,
    pub client_id: i32,
    #[sqlx(rename = "status_id")]
    pub status: OrderStatus,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct OrderItem {
    pub order_item_id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub packaging_id: i32,
    pub quantity: i32,
    pub unit_price: f64,
    pub batch_volume: f64,
}

/// Order item joined with product and packaging names
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct OrderItemDetails {
    pub order_item_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub packaging_id: i32,
    pub packaging_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub batch_volume: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Status {
    pub status_id: i32,
    pub code: String,
    pub name: String,
}

/// Prices of one order line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePricing {
    /// price_per_gram × packaging volume
    pub unit_price: f64,
    /// quantity × packaging volume
    pub batch_volume: f64,
    /// unit_price × quantity
    pub line_total: f64,
}

impl LinePricing {
    pub fn compute(price_per_gram: f64, packaging_volume: f64, quantity: i32) -> Self {
        let unit_price = round_money(price_per_gram * packaging_volume);
        let quantity = f64::from(quantity);
        Self {
            unit_price,
            batch_volume: quantity * packaging_volume,
            line_total: round_money(unit_price * quantity),
        }
    }
}

/// Rounds an amount to cents
pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_multiplies_price_and_volume() {
        let pricing = LinePricing::compute(0.05, 500.0, 200);
        assert_eq!(pricing.unit_price, 25.0);
        assert_eq!(pricing.batch_volume, 100_000.0);
        assert_eq!(pricing.line_total, 5000.0);
    }

    #[test]
    fn amounts_are_rounded_to_cents() {
        assert_eq!(round_money(10.004), 10.0);
        assert_eq!(round_money(10.005_1), 10.01);
        let pricing = LinePricing::compute(0.0333, 100.0, 250);
        assert_eq!(pricing.unit_price, 3.33);
        assert_eq!(pricing.line_total, 832.5);
    }
}
