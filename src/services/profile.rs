//! Profile services - Profilo dell'utente autenticato

use crate::core::auth::session_cookie;
use crate::core::cookies::to_header_value;
use crate::core::{AppError, AppState, CurrentUser, encode_jwt};
use crate::dtos::{ChangePasswordDTO, ProfileDTO, UpdateProfileDTO};
use crate::entities::User;
use axum::{
    Extension,
    extract::State,
    http::{HeaderMap, header},
    response::IntoResponse,
};
use crate::core::extract::Json;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id()))]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<ProfileDTO>, AppError> {
    let profile = state.client.find_by_user_id(current_user.user_id()).await?;
    Ok(Json(ProfileDTO::new(&current_user.user, profile.as_ref())))
}

/// Updates the client fields and re-issues the session so the claims carry
/// the new display name
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id()))]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(body): Json<UpdateProfileDTO>,
) -> Result<impl IntoResponse, AppError> {
    body.validate()?;

    let client = state
        .client
        .find_by_user_id(current_user.user_id())
        .await?
        .ok_or_else(|| {
            warn!("Profile update for a user without client record");
            AppError::bad_request("This account has no client profile")
        })?;

    let updated = state
        .client
        .update_profile(client.client.client_id, &body)
        .await?;

    let token = encode_jwt(
        &current_user.user,
        Some(&updated),
        &state.jwt_secret,
        state.session_ttl_hours,
    )?;
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        to_header_value(&session_cookie(
            &token,
            state.session_ttl_hours,
            state.secure_cookies,
        )),
    );

    info!("Profile updated");
    Ok((
        headers,
        Json(ProfileDTO::new(&current_user.user, Some(&updated))),
    ))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id()))]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(body): Json<ChangePasswordDTO>,
) -> Result<impl IntoResponse, AppError> {
    body.validate()?;

    if !current_user.user.verify_password(&body.current_password) {
        warn!("Wrong current password");
        return Err(AppError::bad_request("Current password is incorrect"));
    }

    let password_hash = User::hash_password(&body.new_password)?;
    state
        .user
        .set_password(current_user.user_id(), &password_hash)
        .await?;

    Ok(Json(json!({ "message": "Password updated" })))
}
