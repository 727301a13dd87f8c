//! JWT token management
//!
//! Issues and verifies the three token families:
//!
//! - access and refresh ("session") tokens, signed with the base secret
//!   followed by the user's salt, so rotating one user's salt kills only that
//!   user's tokens;
//! - email-verification tokens, signed with their own secret.
//!
//! Every token is HS256. Verification rejects any other header algorithm.

use crate::auth::error::AuthError;
use crate::auth::permissions::PermissionMask;
use crate::config::AuthConfig;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Access token expiration (10 minutes)
pub const ACCESS_TOKEN_EXPIRATION_MINUTES: i64 = 10;

/// Refresh token expiration (7 days)
pub const REFRESH_TOKEN_EXPIRATION_DAYS: i64 = 7;

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Token-type discriminator carried in every token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
    EmailVerify,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
            TokenType::EmailVerify => "email_verify",
        }
    }

    /// Access and refresh tokens share the salted session secret
    pub fn is_session(&self) -> bool {
        matches!(self, TokenType::Access | TokenType::Refresh)
    }
}

/// Source of "now" for issuance and expiry checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ============================================
// Claims
// ============================================

#[derive(Debug, Serialize)]
struct SessionClaims<'a> {
    user_id: &'a str,
    permissions: PermissionMask,
    token_type: TokenType,
    exp: i64,
    iat: i64,
}

#[derive(Debug, Serialize)]
struct EmailVerificationClaims<'a> {
    email: &'a str,
    token_type: TokenType,
    jti: &'a str,
    exp: i64,
    iat: i64,
}

/// Union of both claim shapes. The token type is checked before any
/// family-specific field is trusted.
#[derive(Debug, Deserialize)]
struct RawClaims {
    user_id: Option<String>,
    permissions: Option<PermissionMask>,
    token_type: TokenType,
    exp: i64,
    iat: i64,
    jti: Option<String>,
    email: Option<String>,
}

/// Decoded payload of a verified token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// User id for session tokens, the address being verified for email tokens
    pub user_id: String,
    /// Present on access and refresh tokens only
    pub permissions: Option<PermissionMask>,
    pub token_type: TokenType,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Present on email-verification tokens only
    pub jti: Option<String>,
    /// Present on email-verification tokens only
    pub email: Option<String>,
}

impl Credential {
    /// Permission bitmask, or no permissions for tokens that carry none
    pub fn permission_mask(&self) -> PermissionMask {
        self.permissions.unwrap_or(0)
    }
}

/// Token pair response
///
/// The refresh token travels in a cookie, never in a response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

// ============================================
// Token service
// ============================================

/// Issues and verifies tokens
///
/// Built once from an immutable [`AuthConfig`] and shared across request
/// handlers. Holds no mutable state.
pub struct TokenService {
    base_secret: Vec<u8>,
    email_secret_configured: bool,
    email_encoding_key: EncodingKey,
    email_decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        let email_secret = config.email_verify_secret.as_bytes();

        // Expiry is checked against the injected clock, with no leeway.
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            base_secret: config.jwt_secret.as_bytes().to_vec(),
            email_secret_configured: !email_secret.is_empty(),
            email_encoding_key: EncodingKey::from_secret(email_secret),
            email_decoding_key: DecodingKey::from_secret(email_secret),
            validation,
            clock,
        }
    }

    /// Current time according to the service clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Base secret bytes followed by the salt bytes
    fn session_secret(&self, salt: &[u8]) -> Result<Vec<u8>, AuthError> {
        if self.base_secret.is_empty() {
            return Err(AuthError::Signing("session secret is not configured".to_string()));
        }
        let mut secret = Vec::with_capacity(self.base_secret.len() + salt.len());
        secret.extend_from_slice(&self.base_secret);
        secret.extend_from_slice(salt);
        Ok(secret)
    }

    /// Create access and refresh tokens for a user
    pub fn issue_session_tokens(
        &self,
        user_id: &str,
        permissions: PermissionMask,
        salt: &[u8],
    ) -> Result<TokenPair, AuthError> {
        let key = EncodingKey::from_secret(&self.session_secret(salt)?);
        let now = self.clock.now();
        let header = Header::new(SIGNING_ALGORITHM);

        let access_claims = SessionClaims {
            user_id,
            permissions,
            token_type: TokenType::Access,
            exp: (now + Duration::minutes(ACCESS_TOKEN_EXPIRATION_MINUTES)).timestamp(),
            iat: now.timestamp(),
        };
        let access_token = encode(&header, &access_claims, &key)
            .map_err(|e| AuthError::Signing(format!("access token: {}", e)))?;

        let refresh_claims = SessionClaims {
            user_id,
            permissions,
            token_type: TokenType::Refresh,
            exp: (now + Duration::days(REFRESH_TOKEN_EXPIRATION_DAYS)).timestamp(),
            iat: now.timestamp(),
        };
        let refresh_token = encode(&header, &refresh_claims, &key)
            .map_err(|e| AuthError::Signing(format!("refresh token: {}", e)))?;

        debug!(user_id, permissions, "Issued session tokens");

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: ACCESS_TOKEN_EXPIRATION_MINUTES * 60,
        })
    }

    /// Verify an access or refresh token signed with `salt`
    pub fn verify_session_token(&self, token: &str, salt: &[u8]) -> Result<Credential, AuthError> {
        let key = DecodingKey::from_secret(&self.session_secret(salt)?);
        let claims = self.decode_claims(token, &key)?;

        if !claims.token_type.is_session() {
            return Err(AuthError::WrongTokenType {
                expected: "access or refresh",
                actual: claims.token_type.as_str(),
            });
        }
        self.check_expiry(claims.exp)?;

        let user_id = claims
            .user_id
            .ok_or_else(|| AuthError::Malformed("missing user_id claim".to_string()))?;
        let permissions = claims
            .permissions
            .ok_or_else(|| AuthError::Malformed("missing permissions claim".to_string()))?;

        Ok(Credential {
            user_id,
            permissions: Some(permissions),
            token_type: claims.token_type,
            issued_at: timestamp(claims.iat)?,
            expires_at: timestamp(claims.exp)?,
            jti: None,
            email: None,
        })
    }

    /// Verify a session token and require it to be an access token
    pub fn verify_access_token(&self, token: &str, salt: &[u8]) -> Result<Credential, AuthError> {
        self.verify_session_token(token, salt)
            .and_then(|c| expect_type(c, TokenType::Access))
    }

    /// Verify a session token and require it to be a refresh token
    pub fn verify_refresh_token(&self, token: &str, salt: &[u8]) -> Result<Credential, AuthError> {
        self.verify_session_token(token, salt)
            .and_then(|c| expect_type(c, TokenType::Refresh))
    }

    /// Exchange a refresh token for a new pair carrying `permissions`
    ///
    /// Callers pass the user's current bitmask so edits made since the last
    /// login are picked up here.
    pub fn refresh_session(
        &self,
        refresh_token: &str,
        salt: &[u8],
        permissions: PermissionMask,
    ) -> Result<TokenPair, AuthError> {
        let credential = self.verify_refresh_token(refresh_token, salt)?;
        self.issue_session_tokens(&credential.user_id, permissions, salt)
    }

    /// Create an email-verification token expiring at `expires_at`
    pub fn issue_email_verification_token(
        &self,
        email: &str,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        if !self.email_secret_configured {
            return Err(AuthError::Signing(
                "email verification secret is not configured".to_string(),
            ));
        }

        let claims = EmailVerificationClaims {
            email,
            token_type: TokenType::EmailVerify,
            jti,
            exp: expires_at.timestamp(),
            iat: self.clock.now().timestamp(),
        };

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.email_encoding_key)
            .map_err(|e| AuthError::Signing(format!("email verification token: {}", e)))
    }

    pub fn verify_email_verification_token(&self, token: &str) -> Result<Credential, AuthError> {
        if !self.email_secret_configured {
            return Err(AuthError::Signing(
                "email verification secret is not configured".to_string(),
            ));
        }

        let claims = self.decode_claims(token, &self.email_decoding_key)?;
        let claims = expect_raw_type(claims, TokenType::EmailVerify)?;
        self.check_expiry(claims.exp)?;

        let email = claims
            .email
            .ok_or_else(|| AuthError::Malformed("missing email claim".to_string()))?;
        let jti = claims
            .jti
            .ok_or_else(|| AuthError::Malformed("missing jti claim".to_string()))?;

        Ok(Credential {
            user_id: email.clone(),
            permissions: None,
            token_type: TokenType::EmailVerify,
            issued_at: timestamp(claims.iat)?,
            expires_at: timestamp(claims.exp)?,
            jti: Some(jti),
            email: Some(email),
        })
    }

    /// Read the `user_id` claim WITHOUT checking the signature
    ///
    /// Only for resolving which salt to verify with. The result must not be
    /// trusted until [`TokenService::verify_session_token`] succeeds.
    pub fn peek_user_id(&self, token: &str) -> Result<String, AuthError> {
        check_header_algorithm(token)?;

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;

        let data = decode::<RawClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(AuthError::from)?;

        data.claims
            .user_id
            .ok_or_else(|| AuthError::Malformed("missing user_id claim".to_string()))
    }

    fn decode_claims(&self, token: &str, key: &DecodingKey) -> Result<RawClaims, AuthError> {
        check_header_algorithm(token)?;

        decode::<RawClaims>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                AuthError::from(e)
            })
    }

    /// A token is dead from the exact second named by `exp`
    fn check_expiry(&self, exp: i64) -> Result<(), AuthError> {
        if self.clock.now().timestamp() >= exp {
            return Err(AuthError::Expired);
        }
        Ok(())
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &SIGNING_ALGORITHM)
            .field("access_ttl_minutes", &ACCESS_TOKEN_EXPIRATION_MINUTES)
            .field("refresh_ttl_days", &REFRESH_TOKEN_EXPIRATION_DAYS)
            .finish()
    }
}

/// Reject any header `alg` other than HS256 as a bad signature
///
/// jsonwebtoken fails to parse algorithms it does not know (`none`, `HS999`)
/// and would report them as malformed input.
fn check_header_algorithm(token: &str) -> Result<(), AuthError> {
    let segment = token.split('.').next().unwrap_or_default();
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| AuthError::Malformed(format!("header is not base64url: {}", e)))?;
    let header: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::Malformed(format!("header is not JSON: {}", e)))?;

    match header.get("alg").and_then(serde_json::Value::as_str) {
        Some("HS256") => Ok(()),
        alg => {
            debug!(?alg, "Token rejected: unexpected header algorithm");
            Err(AuthError::InvalidSignature)
        }
    }
}

fn expect_type(credential: Credential, expected: TokenType) -> Result<Credential, AuthError> {
    if credential.token_type != expected {
        warn!(
            user_id = %credential.user_id,
            "{} token presented where {} token required",
            credential.token_type.as_str(),
            expected.as_str()
        );
        return Err(AuthError::WrongTokenType {
            expected: expected.as_str(),
            actual: credential.token_type.as_str(),
        });
    }
    Ok(credential)
}

fn expect_raw_type(claims: RawClaims, expected: TokenType) -> Result<RawClaims, AuthError> {
    if claims.token_type != expected {
        return Err(AuthError::WrongTokenType {
            expected: expected.as_str(),
            actual: claims.token_type.as_str(),
        });
    }
    Ok(claims)
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, AuthError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| AuthError::Malformed(format!("timestamp out of range: {}", secs)))
}

/// Clock that only moves when told to
#[cfg(test)]
pub(crate) struct ManualClock(std::sync::atomic::AtomicI64);

#[cfg(test)]
impl ManualClock {
    pub(crate) fn at(secs: i64) -> Arc<Self> {
        Arc::new(Self(std::sync::atomic::AtomicI64::new(secs)))
    }

    pub(crate) fn set(&self, secs: i64) {
        self.0.store(secs, std::sync::atomic::Ordering::SeqCst);
    }

    pub(crate) fn advance(&self, by: Duration) {
        self.0
            .fetch_add(by.num_seconds(), std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let secs = self.0.load(std::sync::atomic::Ordering::SeqCst);
        DateTime::from_timestamp(secs, 0).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::permissions::{PERM_ADMIN, PERM_INVESTOR, PERM_REGULAR};
    use pretty_assertions::assert_eq;

    const T0: i64 = 1_700_000_000;
    const SALT: &[u8] = b"user-salt-0001";

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "session-base-secret-for-tests-000000".to_string(),
            email_verify_secret: "email-verify-secret-for-tests-00000".to_string(),
            ..AuthConfig::default()
        }
    }

    fn service() -> (TokenService, Arc<ManualClock>) {
        let clock = ManualClock::at(T0);
        (TokenService::with_clock(&config(), clock.clone()), clock)
    }

    #[test]
    fn test_session_round_trip() {
        let (svc, _) = service();
        let pair = svc.issue_session_tokens("user-42", PERM_INVESTOR, SALT).unwrap();

        let access = svc.verify_session_token(&pair.access_token, SALT).unwrap();
        assert_eq!(access.user_id, "user-42");
        assert_eq!(access.permissions, Some(PERM_INVESTOR));
        assert_eq!(access.token_type, TokenType::Access);
        assert_eq!(access.issued_at.timestamp(), T0);
        assert_eq!(access.expires_at.timestamp(), T0 + 600);

        let refresh = svc.verify_session_token(&pair.refresh_token, SALT).unwrap();
        assert_eq!(refresh.token_type, TokenType::Refresh);
        assert_eq!(refresh.expires_at.timestamp(), T0 + 7 * 24 * 3600);
        assert_eq!(pair.expires_in, 600);
    }

    #[test]
    fn test_full_width_bitmask_survives() {
        let (svc, _) = service();
        for mask in [PERM_REGULAR, PERM_ADMIN, 1 << 31, u32::MAX] {
            let pair = svc.issue_session_tokens("u", mask, SALT).unwrap();
            let cred = svc.verify_access_token(&pair.access_token, SALT).unwrap();
            assert_eq!(cred.permission_mask(), mask);
        }
    }

    #[test]
    fn test_access_token_expires_at_ten_minutes() {
        let (svc, clock) = service();
        let pair = svc.issue_session_tokens("u", PERM_ADMIN, SALT).unwrap();

        clock.set(T0 + 599);
        assert!(svc.verify_access_token(&pair.access_token, SALT).is_ok());

        clock.set(T0 + 600);
        assert_eq!(
            svc.verify_access_token(&pair.access_token, SALT),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn test_refresh_token_expires_at_seven_days() {
        let (svc, clock) = service();
        let pair = svc.issue_session_tokens("u", PERM_ADMIN, SALT).unwrap();

        clock.advance(Duration::days(7) - Duration::seconds(1));
        assert!(svc.verify_refresh_token(&pair.refresh_token, SALT).is_ok());

        clock.advance(Duration::seconds(1));
        assert_eq!(
            svc.verify_refresh_token(&pair.refresh_token, SALT),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn test_salt_change_breaks_signature() {
        let (svc, _) = service();
        let pair = svc.issue_session_tokens("u", PERM_INVESTOR, SALT).unwrap();
        assert_eq!(
            svc.verify_session_token(&pair.access_token, b"rotated-salt"),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_base_secret_change_breaks_signature() {
        let clock = ManualClock::at(T0);
        let issuer = TokenService::with_clock(&config(), clock.clone());
        let other = AuthConfig {
            jwt_secret: "a-completely-different-base-secret".to_string(),
            ..config()
        };
        let verifier = TokenService::with_clock(&other, clock);

        let pair = issuer.issue_session_tokens("u", PERM_INVESTOR, SALT).unwrap();
        assert_eq!(
            verifier.verify_session_token(&pair.access_token, SALT),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_salt_is_appended_to_base_secret() {
        let (svc, _) = service();
        let pair = svc.issue_session_tokens("u", PERM_REGULAR, SALT).unwrap();

        let mut secret = config().jwt_secret.into_bytes();
        secret.extend_from_slice(SALT);
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let data = decode::<RawClaims>(
            &pair.access_token,
            &DecodingKey::from_secret(&secret),
            &validation,
        )
        .unwrap();
        assert_eq!(data.claims.user_id.as_deref(), Some("u"));
    }

    #[test]
    fn test_rejects_substituted_algorithm() {
        let (svc, _) = service();
        let mut secret = config().jwt_secret.into_bytes();
        secret.extend_from_slice(SALT);

        let claims = SessionClaims {
            user_id: "u",
            permissions: PERM_ADMIN,
            token_type: TokenType::Access,
            exp: T0 + 600,
            iat: T0,
        };
        let forged = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(&secret),
        )
        .unwrap();

        assert_eq!(
            svc.verify_session_token(&forged, SALT),
            Err(AuthError::InvalidSignature)
        );

        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        for alg in ["none", "HS999", "RS256"] {
            let header = URL_SAFE_NO_PAD.encode(format!(r#"{{"alg":"{}","typ":"JWT"}}"#, alg));
            let token = format!("{}.{}.", header, body);
            assert_eq!(
                svc.verify_session_token(&token, SALT),
                Err(AuthError::InvalidSignature),
                "alg={}",
                alg
            );
            assert_eq!(svc.peek_user_id(&token), Err(AuthError::InvalidSignature));
        }

        let no_alg = format!("{}.{}.", URL_SAFE_NO_PAD.encode(r#"{"typ":"JWT"}"#), body);
        assert_eq!(
            svc.verify_session_token(&no_alg, SALT),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let (svc, _) = service();
        for token in ["", "not-a-jwt", "a.b.c"] {
            assert!(matches!(
                svc.verify_session_token(token, SALT),
                Err(AuthError::Malformed(_))
            ));
        }
    }

    #[test]
    fn test_access_and_refresh_are_not_interchangeable() {
        let (svc, _) = service();
        let pair = svc.issue_session_tokens("u", PERM_INVESTOR, SALT).unwrap();

        assert!(matches!(
            svc.verify_access_token(&pair.refresh_token, SALT),
            Err(AuthError::WrongTokenType { expected: "access", .. })
        ));
        assert!(matches!(
            svc.verify_refresh_token(&pair.access_token, SALT),
            Err(AuthError::WrongTokenType { expected: "refresh", .. })
        ));
    }

    #[test]
    fn test_refresh_session_picks_up_new_permissions() {
        let (svc, clock) = service();
        let pair = svc.issue_session_tokens("u", PERM_REGULAR, SALT).unwrap();

        clock.advance(Duration::hours(1));
        let renewed = svc.refresh_session(&pair.refresh_token, SALT, PERM_INVESTOR).unwrap();
        let cred = svc.verify_access_token(&renewed.access_token, SALT).unwrap();
        assert_eq!(cred.permissions, Some(PERM_INVESTOR));
        assert_eq!(cred.issued_at.timestamp(), T0 + 3600);

        assert!(svc.refresh_session(&pair.access_token, SALT, PERM_INVESTOR).is_err());
    }

    #[test]
    fn test_email_token_round_trip() {
        let (svc, _) = service();
        let expiry = DateTime::from_timestamp(T0 + 3600, 0).unwrap();
        let token = svc
            .issue_email_verification_token("founder@example.com", "jti-1", expiry)
            .unwrap();

        let cred = svc.verify_email_verification_token(&token).unwrap();
        assert_eq!(cred.email.as_deref(), Some("founder@example.com"));
        assert_eq!(cred.jti.as_deref(), Some("jti-1"));
        assert_eq!(cred.token_type, TokenType::EmailVerify);
        assert_eq!(cred.expires_at, expiry);
        assert_eq!(cred.permissions, None);
    }

    #[test]
    fn test_email_token_expiry_is_caller_controlled() {
        let (svc, clock) = service();
        let expiry = DateTime::from_timestamp(T0 + 30, 0).unwrap();
        let token = svc.issue_email_verification_token("a@b.io", "j", expiry).unwrap();

        clock.set(T0 + 30);
        assert_eq!(
            svc.verify_email_verification_token(&token),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn test_token_families_are_isolated() {
        let (svc, _) = service();
        let pair = svc.issue_session_tokens("u", PERM_ADMIN, SALT).unwrap();
        let expiry = DateTime::from_timestamp(T0 + 3600, 0).unwrap();
        let email = svc.issue_email_verification_token("a@b.io", "j", expiry).unwrap();

        assert!(svc.verify_session_token(&email, SALT).is_err());
        assert!(svc.verify_session_token(&email, b"").is_err());
        assert!(svc.verify_email_verification_token(&pair.access_token).is_err());
        assert!(svc.verify_email_verification_token(&pair.refresh_token).is_err());
    }

    #[test]
    fn test_shared_secret_still_enforces_token_type() {
        let clock = ManualClock::at(T0);
        let shared = AuthConfig {
            jwt_secret: "one-secret-for-everything-000000000".to_string(),
            email_verify_secret: "one-secret-for-everything-000000000".to_string(),
            ..AuthConfig::default()
        };
        let svc = TokenService::with_clock(&shared, clock);

        let pair = svc.issue_session_tokens("u", PERM_ADMIN, b"").unwrap();
        assert!(matches!(
            svc.verify_email_verification_token(&pair.access_token),
            Err(AuthError::WrongTokenType { expected: "email_verify", .. })
        ));

        let expiry = DateTime::from_timestamp(T0 + 3600, 0).unwrap();
        let email = svc.issue_email_verification_token("a@b.io", "j", expiry).unwrap();
        assert!(matches!(
            svc.verify_session_token(&email, b""),
            Err(AuthError::WrongTokenType { .. })
        ));
    }

    #[test]
    fn test_missing_secrets_fail_signing() {
        let empty = AuthConfig {
            jwt_secret: String::new(),
            email_verify_secret: String::new(),
            ..AuthConfig::default()
        };
        let svc = TokenService::new(&empty);
        assert!(matches!(
            svc.issue_session_tokens("u", 0, SALT),
            Err(AuthError::Signing(_))
        ));
        assert!(matches!(
            svc.issue_email_verification_token("a@b.io", "j", Utc::now()),
            Err(AuthError::Signing(_))
        ));
    }

    #[test]
    fn test_peek_user_id_ignores_signature() {
        let (svc, _) = service();
        let pair = svc.issue_session_tokens("user-7", PERM_REGULAR, SALT).unwrap();
        assert_eq!(svc.peek_user_id(&pair.access_token).unwrap(), "user-7");
        assert!(svc.peek_user_id("garbage").is_err());
    }
}
