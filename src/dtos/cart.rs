//! Cart DTOs - Stato del carrello salvato nel cookie e vista arricchita
//!
//! Il carrello vive interamente nel cookie `cart` come JSON percent-encoded:
//! `{"items":[{"productId":1,"packagingId":2,"quantity":200}]}`.

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const CART_COOKIE: &str = "cart";
pub const CART_COOKIE_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

pub const QUANTITY_STEP: i64 = 50;
pub const MIN_QUANTITY: i32 = 200;
pub const MAX_QUANTITY: i32 = 1_000_000;
/// Keeps the encoded cookie below the 4 KB browser limit
pub const MAX_CART_LINES: usize = 30;

/// Rounds to the nearest multiple of 50 (ties up), clamped to [200, 1 000 000]
pub fn normalize_quantity(quantity: i64) -> i32 {
    let rounded = quantity.saturating_add(QUANTITY_STEP / 2).div_euclid(QUANTITY_STEP)
        * QUANTITY_STEP;
    rounded.clamp(i64::from(MIN_QUANTITY), i64::from(MAX_QUANTITY)) as i32
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: i32,
    pub packaging_id: i32,
    pub quantity: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartLine>,
}

impl Cart {
    /// Decodes the cookie value; anything unreadable is an empty cart
    pub fn from_cookie_value(raw: &str) -> Self {
        urlencoding::decode(raw)
            .ok()
            .and_then(|json| serde_json::from_str::<Cart>(&json).ok())
            .unwrap_or_default()
    }

    pub fn to_cookie_value(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{\"items\":[]}".to_string());
        urlencoding::encode(&json).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, product_id: i32, packaging_id: i32) -> Option<&CartLine> {
        self.items
            .iter()
            .find(|l| l.product_id == product_id && l.packaging_id == packaging_id)
    }

    /// Adds a line or grows the existing one; returns `false` when a new line
    /// would exceed the line limit
    pub fn add(&mut self, product_id: i32, packaging_id: i32, quantity: i64) -> bool {
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|l| l.product_id == product_id && l.packaging_id == packaging_id)
        {
            line.quantity = normalize_quantity(i64::from(line.quantity) + quantity);
            return true;
        }
        if self.items.len() >= MAX_CART_LINES {
            return false;
        }
        self.items.push(CartLine {
            product_id,
            packaging_id,
            quantity: normalize_quantity(quantity),
        });
        true
    }

    /// Sets the quantity of an existing line; `false` if the line is absent
    pub fn set_quantity(&mut self, product_id: i32, packaging_id: i32, quantity: i64) -> bool {
        match self
            .items
            .iter_mut()
            .find(|l| l.product_id == product_id && l.packaging_id == packaging_id)
        {
            Some(line) => {
                line.quantity = normalize_quantity(quantity);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, product_id: i32, packaging_id: i32) -> bool {
        let before = self.items.len();
        self.items
            .retain(|l| !(l.product_id == product_id && l.packaging_id == packaging_id));
        self.items.len() != before
    }

    /// Number of distinct (product, packaging) pairs, duplicates counted once
    pub fn distinct_lines(&self) -> usize {
        let mut seen: Vec<(i32, i32)> = Vec::with_capacity(self.items.len());
        for line in &self.items {
            let key = (line.product_id, line.packaging_id);
            if !seen.contains(&key) {
                seen.push(key);
            }
        }
        seen.len()
    }

    /// Lines that `normalized` drops because of the line limit
    pub fn overflow_lines(&self) -> usize {
        self.distinct_lines().saturating_sub(MAX_CART_LINES)
    }

    /// Merges duplicate lines, renormalizes quantities and enforces the line
    /// limit. Returns the cleaned cart.
    pub fn normalized(&self) -> Cart {
        let mut cart = Cart::default();
        for line in &self.items {
            cart.add(line.product_id, line.packaging_id, i64::from(line.quantity));
        }
        cart
    }
}

/// Body of `POST /api/cart/items` and `PATCH /api/cart/items`
#[derive(Deserialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartItemDTO {
    #[validate(range(min = 1, message = "productId must be positive"))]
    pub product_id: i32,
    #[validate(range(min = 1, message = "packagingId must be positive"))]
    pub packaging_id: i32,
    pub quantity: i64,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product_id: i32,
    pub product_name: String,
    pub packaging_id: i32,
    pub packaging_name: String,
    pub packaging_volume: f64,
    pub unit_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub batch_volume: f64,
    pub line_total: f64,
    pub image_url: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub total: f64,
    pub min_order_amount: f64,
    pub meets_minimum: bool,
    /// Lines dropped because the product or packaging is no longer offered
    pub removed_lines: usize,
}
