use crate::core::cookies::{build_cookie, expired_cookie, read_cookie};
use crate::core::{AppError, AppState};
use crate::entities::{ClientProfile, ClientType, Role, User};
use crate::repositories::Read;
use axum::extract::State;
use axum::{body::Body, extract::Request, http, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub const SESSION_COOKIE: &str = "token";

// struct che codifica il contenuto del token jwt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub id: i32,
    pub email: String,
    pub role_id: i32,
    // profilo cliente denormalizzato, assente per lo staff
    pub client_id: Option<i32>,
    pub client_type: Option<ClientType>,
    pub display_name: Option<String>,
}

/// Utente autenticato, inserito nelle Extension dal middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub claims: Claims,
}

impl CurrentUser {
    pub fn user_id(&self) -> i32 {
        self.user.user_id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }
}

#[instrument(skip(user, profile, secret), fields(user_id = %user.user_id))]
pub fn encode_jwt(
    user: &User,
    profile: Option<&ClientProfile>,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, AppError> {
    debug!("Encoding JWT token for user");
    let now = Utc::now();
    let exp: usize = (now + Duration::hours(ttl_hours)).timestamp() as usize;
    let iat: usize = now.timestamp() as usize;
    let claim = Claims {
        iat,
        exp,
        id: user.user_id,
        email: user.email.clone(),
        role_id: user.role.id(),
        client_id: profile.map(|p| p.client.client_id),
        client_type: profile.map(|p| p.client.client_type),
        display_name: profile.map(|p| p.details.display_name().to_string()),
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map(|token| {
        info!("JWT token encoded successfully");
        token
    })
    .map_err(|e| {
        error!("Failed to encode JWT token: {:?}", e);
        AppError::internal_server_error("Error in encoding jwt token")
    })
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> Result<TokenData<Claims>, AppError> {
    debug!("Decoding JWT token");
    decode::<Claims>(
        jwt_token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| {
        debug!("JWT token decoded successfully for user: {}", data.claims.id);
        data
    })
    .map_err(|e| {
        warn!("Failed to decode JWT token: {:?}", e);
        AppError::unauthorized("Unable to decode token")
    })
}

/// Session cookie carrying the JWT
pub fn session_cookie(token: &str, ttl_hours: i64, secure: bool) -> String {
    build_cookie(SESSION_COOKIE, token, ttl_hours * 60 * 60, secure)
}

pub fn clear_session_cookie(secure: bool) -> String {
    expired_cookie(SESSION_COOKIE, secure)
}

/// Bearer header first, then the session cookie
fn extract_token(headers: &http::HeaderMap) -> Option<String> {
    let bearer = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            let mut parts = value.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => {
                    Some(token.to_string())
                }
                _ => None,
            }
        });
    bearer.or_else(|| read_cookie(headers, SESSION_COOKIE).filter(|t| !t.is_empty()))
}

#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let token = extract_token(req.headers()).ok_or_else(|| {
        warn!("Missing session token");
        AppError::unauthorized("Please log in to continue")
    })?;

    let token_data = decode_jwt(&token, &state.jwt_secret)?;

    // Fetch the user details from the database
    let user = match state.user.read(&token_data.claims.id).await? {
        Some(user) if user.is_active => user,
        Some(_) => {
            warn!("Deactivated user presented a session: {}", token_data.claims.id);
            return Err(AppError::unauthorized("Account is disabled"));
        }
        None => {
            warn!("User not found in database: {}", token_data.claims.id);
            return Err(AppError::unauthorized("You are not an authorized user"));
        }
    };
    debug!("User authenticated: {}", user.email);

    req.extensions_mut().insert(CurrentUser {
        user,
        claims: token_data.claims,
    });
    Ok(next.run(req).await)
}
