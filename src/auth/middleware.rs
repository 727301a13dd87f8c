//! Authentication middleware
//!
//! Resolves the caller's salt, verifies the bearer access token, and exposes
//! the resulting [`Credential`] to handlers through request extensions.

use crate::auth::permissions::{self, Capability};
use crate::auth::{AuthError, Credential};
use crate::error::AppError;
use crate::state::SharedState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};
use tracing::debug;
use uuid::Uuid;

/// Verify the access token and insert its credential into the request
pub async fn auth_middleware(
    State(state): State<SharedState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|e| {
        AppError::Unauthorized(if e.is_missing() {
            "Missing authorization header".to_string()
        } else {
            "Invalid authorization format".to_string()
        })
    })?;
    let token = bearer.token();

    // The salt is looked up by the claimed identity, then the signature
    // decides whether that claim holds.
    let claimed = state.tokens.peek_user_id(token)?;
    let user_id = Uuid::parse_str(&claimed)
        .map_err(|_| AuthError::Malformed("user_id is not a UUID".to_string()))?;
    let salt = state.users.salt_for(user_id).await.ok_or_else(|| {
        debug!(%user_id, "Token presented for unknown user");
        AppError::Unauthorized("Unknown user".to_string())
    })?;

    let credential = state.tokens.verify_access_token(token, salt.as_bytes())?;

    request.extensions_mut().insert(credential);

    Ok(next.run(request).await)
}

/// Require every listed capability
pub fn require_all(credential: &Credential, required: &[Capability]) -> Result<(), AppError> {
    if !permissions::has_all_permissions(credential.permission_mask(), required) {
        return Err(AppError::Forbidden(format!(
            "Requires all of: {}",
            join(required)
        )));
    }
    Ok(())
}

/// Require at least one listed capability
pub fn require_any(credential: &Credential, required: &[Capability]) -> Result<(), AppError> {
    if !permissions::has_any_permission(credential.permission_mask(), required) {
        return Err(AppError::Forbidden(format!(
            "Requires one of: {}",
            join(required)
        )));
    }
    Ok(())
}

fn join(capabilities: &[Capability]) -> String {
    capabilities
        .iter()
        .map(Capability::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
