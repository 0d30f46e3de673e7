//! Auth services - Login, registrazione clienti e recupero password

use crate::core::auth::{clear_session_cookie, session_cookie};
use crate::core::cookies::to_header_value;
use crate::core::{AppError, AppState, encode_jwt};
use crate::dtos::{
    ForgotPasswordDTO, LoginDTO, NewUser, RegisterDTO, ResetPasswordDTO, SessionDTO,
};
use crate::entities::{ClientProfile, ClientType, Role, User};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use crate::core::extract::Json;
use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Set-Cookie and Authorization headers for a fresh session
fn session_headers(
    state: &AppState,
    user: &User,
    profile: Option<&ClientProfile>,
) -> Result<HeaderMap, AppError> {
    let token = encode_jwt(user, profile, &state.jwt_secret, state.session_ttl_hours)?;
    let cookie = session_cookie(&token, state.session_ttl_hours, state.secure_cookies);

    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, to_header_value(&cookie));
    headers.insert(
        header::AUTHORIZATION,
        to_header_value(&format!("Bearer {}", token)),
    );
    Ok(headers)
}

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginDTO>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Cercare l'utente per email, credenziali errate -> UNAUTHORIZED
    // 2. Verificare la password con bcrypt
    // 3. Account disattivato -> FORBIDDEN
    // 4. Caricare il profilo cliente (assente per lo staff) e firmare il JWT
    // 5. Ritornare cookie, header Bearer e profilo di sessione
    if body.password.is_empty() {
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    let user = match state.user.find_by_email(&normalize_email(&body.email)).await? {
        Some(user) => user,
        None => {
            warn!("Login attempt for unknown email");
            return Err(AppError::unauthorized("Invalid email or password"));
        }
    };

    if !user.verify_password(&body.password) {
        warn!("Wrong password for user {}", user.user_id);
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    if !user.is_active {
        warn!("Deactivated user {} tried to log in", user.user_id);
        return Err(AppError::forbidden("Account is disabled"));
    }

    let profile = state.client.find_by_user_id(user.user_id).await?;
    let headers = session_headers(&state, &user, profile.as_ref())?;

    info!("User {} logged in", user.user_id);
    Ok((
        StatusCode::OK,
        headers,
        Json(SessionDTO::new(&user, profile.as_ref())),
    ))
}

/// Type-specific required fields
fn check_registration_fields(body: &RegisterDTO) -> Result<(), AppError> {
    let present = |field: &Option<String>| field.as_deref().is_some_and(|v| !v.trim().is_empty());
    match body.client_type {
        ClientType::Individual if !present(&body.full_name) => {
            Err(AppError::bad_request("Validation error")
                .with_details("fullName is required for individuals"))
        }
        ClientType::LegalEntity if !present(&body.company_name) || !present(&body.tax_id) => {
            Err(AppError::bad_request("Validation error")
                .with_details("companyName and taxId are required for legal entities"))
        }
        _ => Ok(()),
    }
}

#[instrument(skip(state, body), fields(email = %body.email, client_type = ?body.client_type))]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterDTO>,
) -> Result<impl IntoResponse, AppError> {
    body.validate()?;
    check_registration_fields(&body)?;

    let email = normalize_email(&body.email);
    if state.user.email_taken(&email, None).await? {
        warn!("Registration with an email already in use");
        return Err(AppError::conflict("Email already registered"));
    }

    let new_user = NewUser {
        email,
        password_hash: User::hash_password(&body.password)?,
        role: Role::Client,
    };
    let (user, profile) = state.client.register(&new_user, &body).await?;
    let headers = session_headers(&state, &user, Some(&profile))?;

    info!("Client {} registered", profile.client.client_id);
    Ok((
        StatusCode::CREATED,
        headers,
        Json(SessionDTO::new(&user, Some(&profile))),
    ))
}

#[instrument(skip(state))]
pub async fn logout_user(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        to_header_value(&clear_session_cookie(state.secure_cookies)),
    );
    debug!("Session cookie cleared");
    (StatusCode::OK, headers, Json(json!({ "message": "Logged out" })))
}

/// Always answers 200 so the endpoint does not reveal registered emails
#[instrument(skip(state, body))]
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ForgotPasswordDTO>,
) -> Result<impl IntoResponse, AppError> {
    body.validate()?;

    if let Some(user) = state.user.find_by_email(&normalize_email(&body.email)).await? {
        if user.is_active {
            let token = Uuid::new_v4().to_string();
            let expires_at = Utc::now() + Duration::minutes(state.password_reset_ttl_minutes);
            state
                .password_reset
                .create(&token, user.user_id, expires_at)
                .await?;
            // la consegna del token avviene fuori da questo servizio
            info!(user_id = user.user_id, %token, %expires_at, "Password reset token issued");
        }
    } else {
        debug!("Password reset requested for unknown email");
    }

    Ok(Json(json!({
        "message": "If the account exists, password reset instructions have been sent"
    })))
}

#[instrument(skip(state, body))]
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResetPasswordDTO>,
) -> Result<impl IntoResponse, AppError> {
    body.validate()?;

    let reset = state
        .password_reset
        .find(body.token.trim())
        .await?
        .filter(|reset| reset.is_usable(Utc::now()))
        .ok_or_else(|| AppError::bad_request("Invalid or expired reset token"))?;

    let password_hash = User::hash_password(&body.password)?;
    if !state.password_reset.consume(&reset, &password_hash).await? {
        return Err(AppError::bad_request("Invalid or expired reset token"));
    }

    info!("Password reset for user {}", reset.user_id);
    Ok(Json(json!({ "message": "Password updated" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(client_type: ClientType) -> RegisterDTO {
        RegisterDTO {
            email: "a@b.com".to_string(),
            password: "password123".to_string(),
            client_type,
            phone: None,
            address: None,
            full_name: None,
            company_name: None,
            tax_id: None,
            registration_number: None,
            legal_address: None,
        }
    }

    #[test]
    fn individual_needs_full_name() {
        let mut body = registration(ClientType::Individual);
        assert!(check_registration_fields(&body).is_err());
        body.full_name = Some("Mario Rossi".to_string());
        assert!(check_registration_fields(&body).is_ok());
    }

    #[test]
    fn legal_entity_needs_company_and_tax_id() {
        let mut body = registration(ClientType::LegalEntity);
        body.company_name = Some("Acme".to_string());
        assert!(check_registration_fields(&body).is_err());
        body.tax_id = Some("1234567890".to_string());
        assert!(check_registration_fields(&body).is_ok());
    }

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Buyer@Example.COM "), "buyer@example.com");
    }
}
