//! Authentication route handlers
//!
//! Provides register, login, refresh, email verification, and session
//! endpoints.

use crate::auth::{
    hash_password, verify_password, AuthError, Credential, Role, TokenPair,
    REFRESH_TOKEN_EXPIRATION_DAYS,
};
use crate::error::AppError;
use crate::state::{AppState, SharedState};
use crate::users::{User, UserResponse};
use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// Name of the cookie carrying the refresh token
pub const REFRESH_COOKIE: &str = "refresh_token";

const REFRESH_COOKIE_PATH: &str = "/api/auth";

// ============================================
// Request/Response Types
// ============================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 72, message = "Password must be 8 to 72 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserResponse,
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

// ============================================
// Helpers
// ============================================

fn refresh_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path(REFRESH_COOKIE_PATH)
        .max_age(time::Duration::days(REFRESH_TOKEN_EXPIRATION_DAYS))
        .build()
}

/// Expire the refresh cookie whether or not the request carried one
fn clear_refresh_cookie(jar: CookieJar, secure: bool) -> CookieJar {
    let mut cookie = refresh_cookie(String::new(), secure);
    cookie.make_removal();
    jar.add(cookie)
}

fn session_for(state: &AppState, user: &User) -> Result<TokenPair, AppError> {
    Ok(state
        .tokens
        .issue_session_tokens(&user.id.to_string(), user.permissions, user.token_salt.as_bytes())?)
}

fn verification_token(state: &AppState, email: &str) -> Result<String, AppError> {
    let jti = Uuid::new_v4().to_string();
    let expires_at = state.tokens.now() + Duration::hours(state.auth.email_token_ttl_hours);
    Ok(state
        .tokens
        .issue_email_verification_token(email, &jti, expires_at)?)
}

async fn current_user(state: &AppState, credential: &Credential) -> Result<User, AppError> {
    let id = Uuid::parse_str(&credential.user_id)
        .map_err(|_| AuthError::Malformed("user_id is not a UUID".to_string()))?;
    state
        .users
        .find_by_id(id)
        .await
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))
}

// ============================================
// Route Handlers
// ============================================

/// POST /api/auth/register
///
/// Create an account with the requested role's preset permissions.
pub async fn register(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), AppError> {
    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if !req.role.is_self_assignable() {
        return Err(AppError::Forbidden(format!("Role {} cannot be self-assigned", req.role)));
    }

    let password_hash = hash_password(&req.password)?;
    let user = User::new(req.email, password_hash, req.name, req.role);

    // Tokens are minted before the account is stored.
    let tokens = session_for(&state, &user)?;
    let verification = verification_token(&state, &user.email)?;

    let user = state.users.create(user).await?;
    info!(user_id = %user.id, role = %user.role, "Registered user");

    if let Err(e) = state.mailer.send_verification(&user.email, &verification) {
        warn!(
            user_id = %user.id,
            error = %e,
            "Verification email not sent; user can request a resend"
        );
    }

    let jar = jar.add(refresh_cookie(tokens.refresh_token.clone(), state.auth.cookie_secure));
    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            success: true,
            user: UserResponse::from(&user),
            tokens,
        }),
    ))
}

/// POST /api/auth/login
///
/// Authenticate with email and password, receive JWT tokens.
pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let user = state
        .users
        .find_by_email(&req.email)
        .await
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid email or password".to_string()));
    }

    let tokens = session_for(&state, &user)?;

    let jar = jar.add(refresh_cookie(tokens.refresh_token.clone(), state.auth.cookie_secure));
    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            user: UserResponse::from(&user),
            tokens,
        }),
    ))
}

/// POST /api/auth/refresh
///
/// Exchange the refresh token (body or cookie) for a new pair carrying the
/// user's current permissions.
pub async fn refresh(
    State(state): State<SharedState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let from_body = body.and_then(|Json(req)| req.refresh_token);
    let refresh_token = from_body
        .or_else(|| jar.get(REFRESH_COOKIE).map(|c| c.value().to_string()))
        .ok_or_else(|| AppError::Unauthorized("Missing refresh token".to_string()))?;

    let user_id = Uuid::parse_str(&state.tokens.peek_user_id(&refresh_token)?)
        .map_err(|_| AuthError::Malformed("user_id is not a UUID".to_string()))?;
    let user = state
        .users
        .find_by_id(user_id)
        .await
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    let tokens = state.tokens.refresh_session(
        &refresh_token,
        user.token_salt.as_bytes(),
        user.permissions,
    )?;

    let jar = jar.add(refresh_cookie(tokens.refresh_token.clone(), state.auth.cookie_secure));
    Ok((
        jar,
        Json(TokenResponse {
            success: true,
            tokens,
        }),
    ))
}

/// POST /api/auth/verify-email
///
/// Consume an email-verification token.
pub async fn verify_email(
    State(state): State<SharedState>,
    Json(req): Json<VerifyEmailRequest>,
) -> Result<Json<MeResponse>, AppError> {
    let credential = state.tokens.verify_email_verification_token(&req.token)?;
    let email = credential
        .email
        .ok_or_else(|| AuthError::Malformed("missing email claim".to_string()))?;

    let user = state.users.mark_email_verified(&email).await?;

    Ok(Json(MeResponse {
        success: true,
        user: UserResponse::from(&user),
    }))
}

/// POST /api/auth/verify-email/resend
///
/// Send a fresh verification token to the authenticated user.
pub async fn resend_verification(
    State(state): State<SharedState>,
    Extension(credential): Extension<Credential>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let user = current_user(&state, &credential).await?;
    if user.email_verified {
        return Err(AppError::Conflict("Email already verified".to_string()));
    }

    let token = verification_token(&state, &user.email)?;
    state.mailer.send_verification(&user.email, &token)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            success: true,
            message: "Verification email sent".to_string(),
        }),
    ))
}

/// POST /api/auth/logout-all
///
/// Rotate the caller's salt. Every access and refresh token issued to them
/// so far stops verifying.
pub async fn logout_all(
    State(state): State<SharedState>,
    Extension(credential): Extension<Credential>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let user = current_user(&state, &credential).await?;
    state.users.rotate_salt(user.id).await?;

    Ok((
        clear_refresh_cookie(jar, state.auth.cookie_secure),
        Json(MessageResponse {
            success: true,
            message: "Signed out of all sessions".to_string(),
        }),
    ))
}

/// GET /api/auth/me
///
/// Current user, read fresh from the store.
pub async fn me(
    State(state): State<SharedState>,
    Extension(credential): Extension<Credential>,
) -> Result<Json<MeResponse>, AppError> {
    let user = current_user(&state, &credential).await?;

    Ok(Json(MeResponse {
        success: true,
        user: UserResponse::from(&user),
    }))
}
