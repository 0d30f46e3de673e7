//! Admin packaging - CRUD delle tipologie di imballaggio

use crate::core::{AppError, AppState};
use crate::dtos::{CreatePackagingDTO, PackagingDTO, UpdatePackagingDTO};
use crate::repositories::{Create, LookupKind, Read, Update};
use axum::{
    extract::State,
    http::StatusCode,
};
use crate::core::extract::{Json, Path};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

async fn check_references(
    state: &AppState,
    material_id: Option<i32>,
    unit_id: Option<i32>,
) -> Result<(), AppError> {
    if let Some(material_id) = material_id {
        if !state.lookup.exists(LookupKind::Material, material_id).await? {
            return Err(AppError::bad_request("Material does not exist"));
        }
    }
    if let Some(unit_id) = unit_id {
        if !state.lookup.exists(LookupKind::Unit, unit_id).await? {
            return Err(AppError::bad_request("Unit does not exist"));
        }
    }
    Ok(())
}

async fn details(state: &AppState, packaging_id: i32) -> Result<PackagingDTO, AppError> {
    state
        .packaging
        .read_details(packaging_id)
        .await?
        .map(PackagingDTO::from)
        .ok_or_else(|| AppError::not_found("Packaging not found"))
}

pub async fn list_packaging(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PackagingDTO>>, AppError> {
    let packaging = state.packaging.list().await?;
    Ok(Json(packaging.into_iter().map(PackagingDTO::from).collect()))
}

#[instrument(skip(state), fields(packaging_id = %packaging_id))]
pub async fn get_packaging(
    State(state): State<Arc<AppState>>,
    Path(packaging_id): Path<i32>,
) -> Result<Json<PackagingDTO>, AppError> {
    Ok(Json(details(&state, packaging_id).await?))
}

#[instrument(skip(state, body), fields(name = %body.name))]
pub async fn create_packaging(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreatePackagingDTO>,
) -> Result<(StatusCode, Json<PackagingDTO>), AppError> {
    body.validate()?;
    check_references(&state, Some(body.material_id), Some(body.unit_id)).await?;

    let packaging = state.packaging.create(&body).await?;
    info!("Packaging {} created", packaging.packaging_id);
    Ok((
        StatusCode::CREATED,
        Json(details(&state, packaging.packaging_id).await?),
    ))
}

#[instrument(skip(state, body), fields(packaging_id = %packaging_id))]
pub async fn update_packaging(
    State(state): State<Arc<AppState>>,
    Path(packaging_id): Path<i32>,
    Json(body): Json<UpdatePackagingDTO>,
) -> Result<Json<PackagingDTO>, AppError> {
    body.validate()?;
    if state.packaging.read(&packaging_id).await?.is_none() {
        return Err(AppError::not_found("Packaging not found"));
    }
    check_references(&state, body.material_id, body.unit_id).await?;

    state.packaging.update(&packaging_id, &body).await?;
    Ok(Json(details(&state, packaging_id).await?))
}

#[instrument(skip(state), fields(packaging_id = %packaging_id))]
pub async fn delete_packaging(
    State(state): State<Arc<AppState>>,
    Path(packaging_id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    let packaging = state
        .packaging
        .read(&packaging_id)
        .await?
        .ok_or_else(|| AppError::not_found("Packaging not found"))?;

    if state.packaging.is_ordered(packaging_id).await? {
        warn!("Refusing to delete ordered packaging");
        return Err(AppError::bad_request("Packaging is referenced by orders"));
    }

    state.packaging.delete_with_links(packaging_id).await?;
    if let Some(image) = packaging.image_path {
        if let Err(e) = state.files.remove(&image).await {
            warn!("Could not remove packaging image: {}", e.message());
        }
    }

    Ok(Json(json!({ "message": "Packaging deleted" })))
}
