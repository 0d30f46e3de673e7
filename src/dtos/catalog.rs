//! Catalog DTOs - Prodotti, imballaggi e tabelle di riferimento

use crate::core::FileStore;
use crate::entities::{
    Category, CertificateFile, LinePricing, Lookup, PackagingDetails, Product, ProductListing,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// ************************* PRODOTTI ************************* //

/// Riga del catalogo pubblico e della lista admin
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummaryDTO {
    pub product_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price_per_gram: f64,
    pub category_id: i32,
    pub category_name: String,
    pub form_type_id: Option<i32>,
    pub form_type_name: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    /// Unit price of the smallest packaging offered
    pub price_from: Option<f64>,
}

impl From<ProductListing> for ProductSummaryDTO {
    fn from(value: ProductListing) -> Self {
        Self {
            price_from: value
                .min_volume
                .map(|volume| LinePricing::compute(value.price_per_gram, volume, 1).unit_price),
            product_id: value.product_id,
            name: value.name,
            description: value.description,
            price_per_gram: value.price_per_gram,
            category_id: value.category_id,
            category_name: value.category_name,
            form_type_id: value.form_type_id,
            form_type_name: value.form_type_name,
            image_url: value.image_path.as_deref().map(FileStore::public_url),
            is_active: value.is_active,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailDTO {
    #[serde(flatten)]
    pub summary: ProductSummaryDTO,
    pub packaging: Vec<PackagingOptionDTO>,
    pub certificates: Vec<CertificateDTO>,
}

/// Packaging offered for a product, priced for that product
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PackagingOptionDTO {
    pub packaging_id: i32,
    pub name: String,
    pub volume: f64,
    pub material_name: String,
    pub unit_name: String,
    pub unit_price: f64,
    pub image_url: Option<String>,
}

impl PackagingOptionDTO {
    pub fn priced(packaging: PackagingDetails, price_per_gram: f64) -> Self {
        Self {
            unit_price: LinePricing::compute(price_per_gram, packaging.volume, 1).unit_price,
            packaging_id: packaging.packaging_id,
            name: packaging.name,
            volume: packaging.volume,
            material_name: packaging.material_name,
            unit_name: packaging.unit_name,
            image_url: packaging.image_path.as_deref().map(FileStore::public_url),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDTO {
    pub certificate_id: i32,
    pub file_name: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<CertificateFile> for CertificateDTO {
    fn from(value: CertificateFile) -> Self {
        Self {
            certificate_id: value.certificate_id,
            file_name: value.file_name,
            url: FileStore::public_url(&value.file_path),
            uploaded_at: value.uploaded_at,
        }
    }
}

/// Prodotto completo per il back office
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AdminProductDTO {
    pub product_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price_per_gram: f64,
    pub category_id: i32,
    pub form_type_id: Option<i32>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub packaging_ids: Vec<i32>,
}

impl AdminProductDTO {
    pub fn new(product: Product, packaging_ids: Vec<i32>) -> Self {
        Self {
            product_id: product.product_id,
            name: product.name,
            description: product.description,
            price_per_gram: product.price_per_gram,
            category_id: product.category_id,
            form_type_id: product.form_type_id,
            image_url: product.image_path.as_deref().map(FileStore::public_url),
            is_active: product.is_active,
            created_at: product.created_at,
            packaging_ids,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductDTO {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "pricePerGram must be positive"))]
    pub price_per_gram: f64,
    pub category_id: i32,
    pub form_type_id: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub packaging_ids: Vec<i32>,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, Debug, Clone, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductDTO {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "pricePerGram must be positive"))]
    pub price_per_gram: Option<f64>,
    pub category_id: Option<i32>,
    pub form_type_id: Option<i32>,
    pub is_active: Option<bool>,
    /// Replaces the whole link set when present
    pub packaging_ids: Option<Vec<i32>>,
}

/// Filtri del catalogo pubblico
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category_id: Option<i32>,
    pub form_type_id: Option<i32>,
    pub search: Option<String>,
}

// ************************* IMBALLAGGI ************************* //

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PackagingDTO {
    pub packaging_id: i32,
    pub name: String,
    pub volume: f64,
    pub material_id: i32,
    pub material_name: String,
    pub unit_id: i32,
    pub unit_name: String,
    pub image_url: Option<String>,
}

impl From<PackagingDetails> for PackagingDTO {
    fn from(value: PackagingDetails) -> Self {
        Self {
            packaging_id: value.packaging_id,
            name: value.name,
            volume: value.volume,
            material_id: value.material_id,
            material_name: value.material_name,
            unit_id: value.unit_id,
            unit_name: value.unit_name,
            image_url: value.image_path.as_deref().map(FileStore::public_url),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackagingDTO {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: String,
    #[validate(range(exclusive_min = 0.0, message = "Volume must be positive"))]
    pub volume: f64,
    pub material_id: i32,
    pub unit_id: i32,
}

#[derive(Deserialize, Debug, Clone, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePackagingDTO {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters"))]
    pub name: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "Volume must be positive"))]
    pub volume: Option<f64>,
    pub material_id: Option<i32>,
    pub unit_id: Option<i32>,
}

// ************************* RIFERIMENTI ************************* //

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDTO {
    pub category_id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl From<Category> for CategoryDTO {
    fn from(value: Category) -> Self {
        Self {
            category_id: value.category_id,
            name: value.name,
            description: value.description,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Validate)]
pub struct CategoryPayloadDTO {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct LookupDTO {
    pub id: i32,
    pub name: String,
}

impl From<Lookup> for LookupDTO {
    fn from(value: Lookup) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

/// Body for materials, units and form types
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct LookupPayloadDTO {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
}
