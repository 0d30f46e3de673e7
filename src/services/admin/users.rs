//! Admin users - Gestione degli account secondo la matrice dei ruoli
//!
//! Regole: nessuno modifica o cancella il proprio account da qui, e si
//! possono toccare solo utenti (e assegnare ruoli) strettamente inferiori al
//! proprio ruolo.

use crate::core::{AppError, AppState, CurrentUser, require_manageable};
use crate::dtos::{CreateUserDTO, NewUser, UpdateUserDTO, UserChanges, UserDTO};
use crate::entities::{ClientDetails, Role, User};
use crate::repositories::{Create, Delete, Read, Update};
use crate::services::auth::normalize_email;
use axum::{
    Extension,
    extract::State,
    http::StatusCode,
};
use crate::core::extract::{Json, Path};
use futures::future;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

fn parse_role(role_id: i32) -> Result<Role, AppError> {
    Role::from_id(role_id).ok_or_else(|| {
        AppError::bad_request("Unknown role")
            .with_details(format!("roleId {} does not exist", role_id))
    })
}

fn reject_self(current_user: &CurrentUser, user_id: i32) -> Result<(), AppError> {
    if current_user.user_id() == user_id {
        warn!("User tried to administer their own account");
        return Err(AppError::bad_request("You cannot modify your own account here"));
    }
    Ok(())
}

async fn with_client(state: &AppState, user: User) -> Result<UserDTO, AppError> {
    let profile = state.client.find_by_user_id(user.user_id).await?;
    Ok(UserDTO::from(user).with_client(profile.as_ref()))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserDTO>>, AppError> {
    let users = state.user.list_all().await?;
    let dtos =
        future::try_join_all(users.into_iter().map(|user| with_client(&state, user))).await?;
    debug!("Listed {} users", dtos.len());
    Ok(Json(dtos))
}

#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<UserDTO>, AppError> {
    let user = state
        .user
        .read(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(with_client(&state, user).await?))
}

#[instrument(skip(state, current_user, body), fields(actor = %current_user.user_id(), role_id = %body.role_id))]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(body): Json<CreateUserDTO>,
) -> Result<(StatusCode, Json<UserDTO>), AppError> {
    body.validate()?;
    let role = parse_role(body.role_id)?;
    require_manageable(current_user.role(), role)?;

    let email = normalize_email(&body.email);
    if state.user.email_taken(&email, None).await? {
        return Err(AppError::conflict("Email already registered"));
    }

    let user = state
        .user
        .create(&NewUser {
            email,
            password_hash: User::hash_password(&body.password)?,
            role,
        })
        .await?;

    info!("User {} created with role {:?}", user.user_id, role);
    Ok((StatusCode::CREATED, Json(UserDTO::from(user))))
}

#[instrument(skip(state, current_user, body), fields(actor = %current_user.user_id(), user_id = %user_id))]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(user_id): Path<i32>,
    Json(body): Json<UpdateUserDTO>,
) -> Result<Json<UserDTO>, AppError> {
    // 1. Vietato modificare se stessi
    // 2. Il ruolo attuale del target e quello richiesto devono essere gestibili
    // 3. Email univoca, password hashata
    body.validate()?;
    reject_self(&current_user, user_id)?;

    let target = state
        .user
        .read(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    require_manageable(current_user.role(), target.role)?;

    let role = body.role_id.map(parse_role).transpose()?;
    if let Some(role) = role {
        require_manageable(current_user.role(), role)?;
    }

    let email = body.email.as_deref().map(normalize_email);
    if let Some(email) = &email {
        if state.user.email_taken(email, Some(user_id)).await? {
            return Err(AppError::conflict("Email already registered"));
        }
    }

    let changes = UserChanges {
        email,
        password_hash: body
            .password
            .as_deref()
            .map(User::hash_password)
            .transpose()?,
        role,
        is_active: body.is_active,
    };
    let user = state.user.update(&user_id, &changes).await?;
    Ok(Json(with_client(&state, user).await?))
}

#[instrument(skip(state, current_user), fields(actor = %current_user.user_id(), user_id = %user_id))]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Path(user_id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    reject_self(&current_user, user_id)?;

    let target = state
        .user
        .read(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    require_manageable(current_user.role(), target.role)?;

    let mut contract_path = None;
    if let Some(profile) = state.client.find_by_user_id(user_id).await? {
        if state.client.has_orders(profile.client.client_id).await? {
            warn!("Refusing to delete a client with orders");
            return Err(AppError::bad_request("User has orders")
                .with_details("Deactivate the account instead"));
        }
        if let ClientDetails::LegalEntity(entity) = profile.details {
            contract_path = entity.contract_path;
        }
    }

    state.user.delete(&user_id).await?;
    if let Some(path) = contract_path {
        if let Err(e) = state.files.remove(&path).await {
            warn!("Could not remove contract file: {}", e.message());
        }
    }
    info!("User deleted");
    Ok(Json(json!({ "message": "User deleted" })))
}
