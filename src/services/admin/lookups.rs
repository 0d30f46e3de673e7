//! Admin lookups - Materiali, unità di misura e forme
//!
//! Le tre tabelle condividono gli stessi handler: il router inietta il
//! [`LookupKind`] come Extension su ciascun gruppo di rotte.

use crate::core::{AppError, AppState};
use crate::dtos::{LookupDTO, LookupPayloadDTO};
use crate::repositories::LookupKind;
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
};
use crate::core::extract::{Json, Path};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

#[instrument(skip(state))]
pub async fn list_lookups(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<LookupKind>,
) -> Result<Json<Vec<LookupDTO>>, AppError> {
    let rows = state.lookup.list(kind).await?;
    Ok(Json(rows.into_iter().map(LookupDTO::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_lookup(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<LookupKind>,
    Path(id): Path<i32>,
) -> Result<Json<LookupDTO>, AppError> {
    state
        .lookup
        .read(kind, id)
        .await?
        .map(|row| Json(LookupDTO::from(row)))
        .ok_or_else(|| AppError::not_found("Record not found"))
}

#[instrument(skip(state, body), fields(name = %body.name))]
pub async fn create_lookup(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<LookupKind>,
    Json(body): Json<LookupPayloadDTO>,
) -> Result<(StatusCode, Json<LookupDTO>), AppError> {
    body.validate()?;
    let name = body.name.trim();
    if state.lookup.name_taken(kind, name, None).await? {
        return Err(AppError::conflict("Name already in use"));
    }

    let row = state.lookup.create(kind, name).await?;
    Ok((StatusCode::CREATED, Json(LookupDTO::from(row))))
}

#[instrument(skip(state, body), fields(name = %body.name))]
pub async fn update_lookup(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<LookupKind>,
    Path(id): Path<i32>,
    Json(body): Json<LookupPayloadDTO>,
) -> Result<Json<LookupDTO>, AppError> {
    body.validate()?;
    if !state.lookup.exists(kind, id).await? {
        return Err(AppError::not_found("Record not found"));
    }
    let name = body.name.trim();
    if state.lookup.name_taken(kind, name, Some(id)).await? {
        return Err(AppError::conflict("Name already in use"));
    }

    let row = state.lookup.rename(kind, id, name).await?;
    Ok(Json(LookupDTO::from(row)))
}

#[instrument(skip(state))]
pub async fn delete_lookup(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<LookupKind>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.lookup.exists(kind, id).await? {
        return Err(AppError::not_found("Record not found"));
    }

    let usage = state.lookup.usage_count(kind, id).await?;
    if usage > 0 {
        warn!("Refusing to delete {} {} used by {} rows", kind.label(), id, usage);
        return Err(AppError::bad_request("Record is still in use")
            .with_details(format!("Referenced by {} {}", usage, kind.referenced_by())));
    }

    state.lookup.delete(kind, id).await?;
    info!("Deleted {} {}", kind.label(), id);
    Ok(Json(json!({ "message": "Deleted" })))
}
