//! Catalog services - Catalogo pubblico

use crate::core::{AppError, AppState};
use crate::dtos::{
    CategoryDTO, CertificateDTO, LookupDTO, PackagingOptionDTO, ProductDetailDTO, ProductQuery,
    ProductSummaryDTO,
};
use crate::repositories::LookupKind;
use axum::extract::State;
use crate::core::extract::{Json, Path, Query};
use futures::future;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProductQuery>, // /products?categoryId=1&search=...
) -> Result<Json<Vec<ProductSummaryDTO>>, AppError> {
    let products = state.product.list(&params, true).await?;
    info!("Catalog returned {} products", products.len());
    Ok(Json(
        products.into_iter().map(ProductSummaryDTO::from).collect(),
    ))
}

#[instrument(skip(state), fields(product_id = %product_id))]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i32>,
) -> Result<Json<ProductDetailDTO>, AppError> {
    let product = match state.product.read_listing(product_id).await? {
        Some(product) if product.is_active => product,
        _ => {
            warn!("Product not available");
            return Err(AppError::not_found("Product not found"));
        }
    };

    // imballaggi e certificati in parallelo
    let (packaging, certificates) = future::try_join(
        state.packaging.options_for_product(product_id),
        state.certificate.list_for_product(product_id),
    )
    .await?;
    debug!(
        "Product has {} packaging options and {} certificates",
        packaging.len(),
        certificates.len()
    );

    let price_per_gram = product.price_per_gram;
    Ok(Json(ProductDetailDTO {
        summary: ProductSummaryDTO::from(product),
        packaging: packaging
            .into_iter()
            .map(|p| PackagingOptionDTO::priced(p, price_per_gram))
            .collect(),
        certificates: certificates.into_iter().map(CertificateDTO::from).collect(),
    }))
}

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategoryDTO>>, AppError> {
    let categories = state.category.list().await?;
    Ok(Json(categories.into_iter().map(CategoryDTO::from).collect()))
}

pub async fn list_form_types(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LookupDTO>>, AppError> {
    let form_types = state.lookup.list(LookupKind::FormType).await?;
    Ok(Json(form_types.into_iter().map(LookupDTO::from).collect()))
}
