//! Admin categories - CRUD delle categorie

use crate::core::{AppError, AppState};
use crate::dtos::{CategoryDTO, CategoryPayloadDTO};
use crate::repositories::{Create, Delete, Read, Update};
use axum::{
    extract::State,
    http::StatusCode,
};
use crate::core::extract::{Json, Path};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

#[instrument(skip(state), fields(category_id = %category_id))]
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<i32>,
) -> Result<Json<CategoryDTO>, AppError> {
    state
        .category
        .read(&category_id)
        .await?
        .map(|c| Json(CategoryDTO::from(c)))
        .ok_or_else(|| AppError::not_found("Category not found"))
}

#[instrument(skip(state, body), fields(name = %body.name))]
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(mut body): Json<CategoryPayloadDTO>,
) -> Result<(StatusCode, Json<CategoryDTO>), AppError> {
    body.validate()?;
    body.name = body.name.trim().to_string();
    if state.category.name_taken(&body.name, None).await? {
        return Err(AppError::conflict("Category name already in use"));
    }

    let category = state.category.create(&body).await?;
    Ok((StatusCode::CREATED, Json(CategoryDTO::from(category))))
}

#[instrument(skip(state, body), fields(category_id = %category_id))]
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<i32>,
    Json(mut body): Json<CategoryPayloadDTO>,
) -> Result<Json<CategoryDTO>, AppError> {
    body.validate()?;
    if state.category.read(&category_id).await?.is_none() {
        return Err(AppError::not_found("Category not found"));
    }
    body.name = body.name.trim().to_string();
    if state.category.name_taken(&body.name, Some(category_id)).await? {
        return Err(AppError::conflict("Category name already in use"));
    }

    let category = state.category.update(&category_id, &body).await?;
    Ok(Json(CategoryDTO::from(category)))
}

#[instrument(skip(state), fields(category_id = %category_id))]
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    if state.category.read(&category_id).await?.is_none() {
        return Err(AppError::not_found("Category not found"));
    }

    let products = state.product.count_by_category(category_id).await?;
    if products > 0 {
        warn!("Category still has {} products", products);
        return Err(AppError::bad_request("Category is still in use")
            .with_details(format!("Referenced by {} products", products)));
    }

    state.category.delete(&category_id).await?;
    info!("Category deleted");
    Ok(Json(json!({ "message": "Category deleted" })))
}
