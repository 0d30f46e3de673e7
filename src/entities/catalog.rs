//! Catalog entities - Prodotti, imballaggi e tabelle di riferimento

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Product {
    pub product_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price_per_gram: f64,
    pub category_id: i32,
    pub form_type_id: Option<i32>,
    pub image_path: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Product row joined with the names of its category and form type
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct ProductListing {
    pub product_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price_per_gram: f64,
    pub category_id: i32,
    pub category_name: String,
    pub form_type_id: Option<i32>,
    pub form_type_name: Option<String>,
    pub image_path: Option<String>,
    pub is_active: bool,
    pub min_volume: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct PackagingType {
    pub packaging_id: i32,
    pub name: String,
    pub volume: f64,
    pub material_id: i32,
    pub unit_id: i32,
    pub image_path: Option<String>,
}

/// Packaging row joined with material and unit names
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct PackagingDetails {
    pub packaging_id: i32,
    pub name: String,
    pub volume: f64,
    pub material_id: i32,
    pub material_name: String,
    pub unit_id: i32,
    pub unit_name: String,
    pub image_path: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Category {
    pub category_id: i32,
    pub name: String,
    pub description: Option<String>,
}

/// Row of one of the name-only reference tables (materials, units, form types)
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Lookup {
    pub id: i32,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct CertificateFile {
    pub certificate_id: i32,
    pub product_id: i32,
    pub file_name: String,
    pub file_path: String,
    pub uploaded_at: DateTime<Utc>,
}
