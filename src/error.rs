//! Error handling module
//!
//! Provides unified error types and handling for the HTTP layer.

use crate::auth::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl AppError {
    /// Status, machine-readable code, client message, and optional details
    fn parts(&self) -> (StatusCode, &'static str, String, Option<String>) {
        match self {
            AppError::Auth(e) => auth_parts(e),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone(), None),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                Some(msg.clone()),
            ),
        }
    }
}

fn auth_parts(e: &AuthError) -> (StatusCode, &'static str, String, Option<String>) {
    match e {
        AuthError::Signing(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "SIGNING_ERROR",
            "Failed to issue credentials".to_string(),
            None,
        ),
        AuthError::InvalidSignature => (
            StatusCode::UNAUTHORIZED,
            "INVALID_TOKEN",
            e.to_string(),
            None,
        ),
        AuthError::Expired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED", e.to_string(), None),
        AuthError::WrongTokenType { .. } => (
            StatusCode::UNAUTHORIZED,
            "WRONG_TOKEN_TYPE",
            e.to_string(),
            None,
        ),
        AuthError::Malformed(_) => (
            StatusCode::BAD_REQUEST,
            "MALFORMED_TOKEN",
            "Malformed token".to_string(),
            None,
        ),
        AuthError::InvalidPermissionBits(_) => (
            StatusCode::BAD_REQUEST,
            "INVALID_PERMISSIONS",
            e.to_string(),
            None,
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = self.parts();

        if status.is_server_error() {
            error!("{}", self);
        } else {
            debug!(code = error_code, "Request rejected: {}", self);
        }

        let body = Json(ErrorResponse {
            success: false,
            message,
            error: details,
            code: Some(error_code.to_string()),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;
