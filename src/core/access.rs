//! Route access - Liste di ruoli ammessi per prefisso di rotta
//!
//! Il middleware gira dopo `authentication_middleware` e confronta il ruolo
//! dell'utente con la regola dal prefisso più lungo che combacia col path.

use crate::core::{AppError, AppState, CurrentUser};
use crate::entities::Role;
use axum::extract::{OriginalUri, State};
use axum::{body::Body, extract::Request, http::Response, middleware::Next};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const STAFF: &[Role] = &[Role::Admin, Role::Manager];
const CLIENTS: &[Role] = &[Role::Client];
const EVERYONE: &[Role] = &[Role::Admin, Role::Manager, Role::Client];

pub const ACCESS_RULES: &[(&str, &[Role])] = &[
    ("/api/admin", STAFF),
    ("/api/cart", CLIENTS),
    ("/api/orders", CLIENTS),
    ("/api/uploads/contract", CLIENTS),
    ("/api/profile", EVERYONE),
];

/// Whether `path` is `prefix` or lies below it on a segment boundary
fn matches_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Roles allowed on `path`; `None` when no rule covers it
pub fn allowed_roles(path: &str) -> Option<&'static [Role]> {
    ACCESS_RULES
        .iter()
        .filter(|(prefix, _)| matches_prefix(path, prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, roles)| *roles)
}

#[instrument(skip(_state, req, next))]
pub async fn route_access_middleware(
    State(_state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let current_user = req.extensions().get::<CurrentUser>().ok_or_else(|| {
        warn!("User not found in request extensions");
        AppError::unauthorized("User not authenticated")
    })?;

    if let Some(roles) = allowed_roles(&path) {
        if !roles.contains(&current_user.role()) {
            warn!(
                "User {} with role {:?} denied on {}",
                current_user.user_id(),
                current_user.role(),
                path
            );
            return Err(AppError::forbidden("Insufficient role").with_details(format!(
                "This route requires one of the following roles: {:?}",
                roles
            )));
        }
    }

    debug!("Access granted on {}", path);
    Ok(next.run(req).await)
}

/// Role matrix check used by user administration
pub fn require_manageable(actor: Role, target: Role) -> Result<(), AppError> {
    if actor.can_manage(target) {
        Ok(())
    } else {
        warn!("Role {:?} cannot manage role {:?}", actor, target);
        Err(AppError::forbidden("You cannot manage users with this role"))
    }
}
