//! Admin products - CRUD dei prodotti e dei collegamenti con gli imballaggi

use crate::core::{AppError, AppState};
use crate::dtos::{
    AdminProductDTO, CreateProductDTO, ProductQuery, ProductSummaryDTO, UpdateProductDTO,
};
use crate::repositories::{Create, LookupKind, Read, Update};
use axum::{
    extract::State,
    http::StatusCode,
};
use crate::core::extract::{Json, Path, Query};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

/// Checks that every referenced row exists before writing
async fn check_references(
    state: &AppState,
    category_id: Option<i32>,
    form_type_id: Option<i32>,
    packaging_ids: Option<&[i32]>,
) -> Result<(), AppError> {
    if let Some(category_id) = category_id {
        if state.category.read(&category_id).await?.is_none() {
            return Err(AppError::bad_request("Category does not exist"));
        }
    }
    if let Some(form_type_id) = form_type_id {
        if !state.lookup.exists(LookupKind::FormType, form_type_id).await? {
            return Err(AppError::bad_request("Form type does not exist"));
        }
    }
    if let Some(ids) = packaging_ids {
        let existing = state.packaging.existing_ids(ids).await?;
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !existing.contains(id))
            .map(i32::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::bad_request("Packaging does not exist")
                .with_details(format!("Unknown packaging ids: {}", missing.join(", "))));
        }
    }
    Ok(())
}

fn dedup_ids(ids: &mut Vec<i32>) {
    ids.sort_unstable();
    ids.dedup();
}

/// Listing includes inactive products
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProductQuery>,
) -> Result<Json<Vec<ProductSummaryDTO>>, AppError> {
    let products = state.product.list(&params, false).await?;
    Ok(Json(
        products.into_iter().map(ProductSummaryDTO::from).collect(),
    ))
}

#[instrument(skip(state), fields(product_id = %product_id))]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i32>,
) -> Result<Json<AdminProductDTO>, AppError> {
    let product = state
        .product
        .read(&product_id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;
    let packaging_ids = state.product.packaging_ids(product_id).await?;
    Ok(Json(AdminProductDTO::new(product, packaging_ids)))
}

#[instrument(skip(state, body), fields(name = %body.name))]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(mut body): Json<CreateProductDTO>,
) -> Result<(StatusCode, Json<AdminProductDTO>), AppError> {
    body.validate()?;
    dedup_ids(&mut body.packaging_ids);
    check_references(
        &state,
        Some(body.category_id),
        body.form_type_id,
        Some(&body.packaging_ids),
    )
    .await?;

    let product = state.product.create(&body).await?;
    info!("Product {} created", product.product_id);
    let packaging_ids = state.product.packaging_ids(product.product_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(AdminProductDTO::new(product, packaging_ids)),
    ))
}

#[instrument(skip(state, body), fields(product_id = %product_id))]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i32>,
    Json(mut body): Json<UpdateProductDTO>,
) -> Result<Json<AdminProductDTO>, AppError> {
    body.validate()?;
    if state.product.read(&product_id).await?.is_none() {
        return Err(AppError::not_found("Product not found"));
    }
    if let Some(ids) = body.packaging_ids.as_mut() {
        dedup_ids(ids);
    }
    check_references(
        &state,
        body.category_id,
        body.form_type_id,
        body.packaging_ids.as_deref(),
    )
    .await?;

    let product = state.product.update(&product_id, &body).await?;
    let packaging_ids = state.product.packaging_ids(product_id).await?;
    Ok(Json(AdminProductDTO::new(product, packaging_ids)))
}

#[instrument(skip(state), fields(product_id = %product_id))]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    let product = state
        .product
        .read(&product_id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    if state.product.is_ordered(product_id).await? {
        warn!("Refusing to delete an ordered product");
        return Err(AppError::bad_request("Product is referenced by orders")
            .with_details("Deactivate the product instead"));
    }

    let certificate_paths = state.certificate.paths_for_product(product_id).await?;
    state.product.delete_with_links(product_id).await?;

    // i file seguono le righe già cancellate
    for path in certificate_paths.iter().chain(product.image_path.iter()) {
        if let Err(e) = state.files.remove(path).await {
            warn!("Could not remove file {}: {}", path, e.message());
        }
    }

    info!("Product deleted");
    Ok(Json(json!({ "message": "Product deleted" })))
}
