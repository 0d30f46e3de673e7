//! Upload services - Contratti, certificati e immagini
//!
//! Tutti gli upload arrivano come multipart con un unico campo `file`.
//! Il file precedente viene rimosso dal disco solo dopo che il nuovo
//! percorso è stato salvato nel database.

use crate::core::{AppError, AppState, CurrentUser, FileStore, UploadKind};
use crate::dtos::{AdminProductDTO, CertificateDTO, ClientProfileDTO, PackagingDTO};
use crate::entities::ClientDetails;
use crate::repositories::{Delete, Read};
use axum::{
    Extension,
    extract::{Multipart, State},
    http::StatusCode,
};
use crate::core::extract::{Json, Path};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const FILE_FIELD: &str = "file";

/// Uploaded file name and content
struct UploadedFile {
    file_name: String,
    bytes: Vec<u8>,
}

async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::bad_request("Uploaded file has no name"))?;
        let bytes = field.bytes().await?.to_vec();
        return Ok(UploadedFile { file_name, bytes });
    }
    Err(AppError::bad_request("Missing file field")
        .with_details(format!("Expected a multipart field named '{}'", FILE_FIELD)))
}

/// Removes a replaced file; failures are logged, the new file is already in place
async fn discard_previous(files: &FileStore, previous: Option<String>) {
    if let Some(path) = previous {
        if let Err(e) = files.remove(&path).await {
            warn!("Could not remove replaced file {}: {}", path, e.message());
        }
    }
}

#[instrument(skip(state, current_user, multipart), fields(user_id = %current_user.user_id()))]
pub async fn upload_contract(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Json<ClientProfileDTO>, AppError> {
    let profile = state
        .client
        .find_by_user_id(current_user.user_id())
        .await?
        .ok_or_else(|| AppError::forbidden("Only clients can upload contracts"))?;
    if !matches!(profile.details, ClientDetails::LegalEntity(_)) {
        return Err(AppError::bad_request("Only legal entities can upload a contract"));
    }

    let upload = read_file_field(&mut multipart).await?;
    let path = state
        .files
        .save(UploadKind::Contract, &upload.file_name, &upload.bytes)
        .await?;

    let previous = match state
        .client
        .set_contract_path(profile.client.client_id, &path)
        .await
    {
        Ok(previous) => previous,
        Err(e) => {
            discard_previous(&state.files, Some(path)).await;
            return Err(e.into());
        }
    };
    discard_previous(&state.files, previous).await;

    let updated = state
        .client
        .find_by_client_id(profile.client.client_id)
        .await?
        .ok_or_else(|| AppError::not_found("Client not found"))?;
    info!("Contract uploaded");
    Ok(Json(ClientProfileDTO::from(&updated)))
}

#[instrument(skip(state, multipart), fields(product_id = %product_id))]
pub async fn upload_certificate(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CertificateDTO>), AppError> {
    if state.product.read(&product_id).await?.is_none() {
        return Err(AppError::not_found("Product not found"));
    }

    let upload = read_file_field(&mut multipart).await?;
    let path = state
        .files
        .save(UploadKind::Certificate, &upload.file_name, &upload.bytes)
        .await?;

    let certificate = match state
        .certificate
        .create(product_id, &upload.file_name, &path)
        .await
    {
        Ok(certificate) => certificate,
        Err(e) => {
            discard_previous(&state.files, Some(path)).await;
            return Err(e.into());
        }
    };

    Ok((StatusCode::CREATED, Json(CertificateDTO::from(certificate))))
}

#[instrument(skip(state), fields(certificate_id = %certificate_id))]
pub async fn delete_certificate(
    State(state): State<Arc<AppState>>,
    Path(certificate_id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    let certificate = state
        .certificate
        .read(&certificate_id)
        .await?
        .ok_or_else(|| AppError::not_found("Certificate not found"))?;

    state.certificate.delete(&certificate_id).await?;
    discard_previous(&state.files, Some(certificate.file_path)).await;

    info!("Certificate deleted");
    Ok(Json(json!({ "message": "Certificate deleted" })))
}

#[instrument(skip(state, multipart), fields(product_id = %product_id))]
pub async fn upload_product_image(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<AdminProductDTO>, AppError> {
    if state.product.read(&product_id).await?.is_none() {
        return Err(AppError::not_found("Product not found"));
    }

    let upload = read_file_field(&mut multipart).await?;
    let path = state
        .files
        .save(UploadKind::ProductImage, &upload.file_name, &upload.bytes)
        .await?;

    let previous = match state.product.set_image(product_id, &path).await {
        Ok(previous) => previous,
        Err(e) => {
            discard_previous(&state.files, Some(path)).await;
            return Err(e.into());
        }
    };
    discard_previous(&state.files, previous).await;

    let product = state
        .product
        .read(&product_id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;
    let packaging_ids = state.product.packaging_ids(product_id).await?;
    Ok(Json(AdminProductDTO::new(product, packaging_ids)))
}

#[instrument(skip(state, multipart), fields(packaging_id = %packaging_id))]
pub async fn upload_packaging_image(
    State(state): State<Arc<AppState>>,
    Path(packaging_id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<PackagingDTO>, AppError> {
    if state.packaging.read(&packaging_id).await?.is_none() {
        return Err(AppError::not_found("Packaging not found"));
    }

    let upload = read_file_field(&mut multipart).await?;
    let path = state
        .files
        .save(UploadKind::PackagingImage, &upload.file_name, &upload.bytes)
        .await?;

    let previous = match state.packaging.set_image(packaging_id, &path).await {
        Ok(previous) => previous,
        Err(e) => {
            discard_previous(&state.files, Some(path)).await;
            return Err(e.into());
        }
    };
    discard_previous(&state.files, previous).await;

    let packaging = state
        .packaging
        .read_details(packaging_id)
        .await?
        .ok_or_else(|| AppError::not_found("Packaging not found"))?;
    Ok(Json(PackagingDTO::from(packaging)))
}
