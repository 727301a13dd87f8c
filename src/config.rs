//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.
//! Secrets are read once here and never again; everything downstream receives
//! an immutable [`AuthConfig`].

use serde::Deserialize;
use std::net::Ipv4Addr;
use thiserror::Error;
use tracing::warn;

/// Development fallback for `JWT_SECRET`
const DEV_JWT_SECRET: &str = "launchpad-dev-session-secret-change-in-production";

/// Development fallback for `EMAIL_VERIFY_SECRET`
const DEV_EMAIL_VERIFY_SECRET: &str = "launchpad-dev-email-secret-change-in-production";

const RECOMMENDED_SECRET_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0), // Bind to 0.0.0.0 for Docker
            port: 3000,
        }
    }
}

/// Token secrets and lifetimes
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// Base secret for session tokens; the per-user salt is appended to it
    pub jwt_secret: String,
    /// Secret for email-verification tokens only
    pub email_verify_secret: String,
    pub email_token_ttl_hours: i64,
    /// Mark the refresh cookie `Secure`
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            email_verify_secret: String::new(),
            email_token_ttl_hours: 24,
            cookie_secure: true,
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::InvalidValue("JWT_SECRET must not be empty".to_string()));
        }
        if self.email_verify_secret.is_empty() {
            return Err(ConfigError::InvalidValue(
                "EMAIL_VERIFY_SECRET must not be empty".to_string(),
            ));
        }
        if self.email_token_ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue(
                "EMAIL_TOKEN_TTL_HOURS must be positive".to_string(),
            ));
        }
        if self.jwt_secret == self.email_verify_secret {
            warn!("JWT_SECRET and EMAIL_VERIFY_SECRET are identical; token families share a key");
        }
        if self.jwt_secret.len() < RECOMMENDED_SECRET_LEN
            || self.email_verify_secret.len() < RECOMMENDED_SECRET_LEN
        {
            warn!("Token secrets are shorter than recommended ({} bytes)", RECOMMENDED_SECRET_LEN);
        }
        Ok(())
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("email_verify_secret", &"<redacted>")
            .field("email_token_ttl_hours", &self.email_token_ttl_hours)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3001".to_string()],
        }
    }
}

/// Flat view of the environment as read by the `config` crate
#[derive(Debug, Default, Deserialize)]
struct EnvSettings {
    host: Option<Ipv4Addr>,
    port: Option<u16>,
    jwt_secret: Option<String>,
    email_verify_secret: Option<String>,
    email_token_ttl_hours: Option<i64>,
    cookie_secure: Option<bool>,
    allowed_origins: Option<String>,
    admin_email: Option<String>,
    admin_password: Option<String>,
}

/// Administrator account created at startup when both values are set
#[derive(Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Complete application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub admin: Option<AdminBootstrap>,
}

impl Settings {
    /// Load settings from `.env` and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();

        let env: EnvSettings = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()?;

        Self::from_env(env)
    }

    fn from_env(env: EnvSettings) -> Result<Self, ConfigError> {
        let server_defaults = ServerConfig::default();
        let server = ServerConfig {
            host: env.host.unwrap_or(server_defaults.host),
            port: env.port.unwrap_or(server_defaults.port),
        };

        let auth_defaults = AuthConfig::default();
        let auth = AuthConfig {
            jwt_secret: env.jwt_secret.unwrap_or_else(|| {
                warn!("JWT_SECRET not set, using default (INSECURE - set in production!)");
                DEV_JWT_SECRET.to_string()
            }),
            email_verify_secret: env.email_verify_secret.unwrap_or_else(|| {
                warn!("EMAIL_VERIFY_SECRET not set, using default (INSECURE - set in production!)");
                DEV_EMAIL_VERIFY_SECRET.to_string()
            }),
            email_token_ttl_hours: env
                .email_token_ttl_hours
                .unwrap_or(auth_defaults.email_token_ttl_hours),
            cookie_secure: env.cookie_secure.unwrap_or(auth_defaults.cookie_secure),
        };
        auth.validate()?;

        let cors = CorsConfig {
            allowed_origins: env
                .allowed_origins
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| CorsConfig::default().allowed_origins),
        };

        let admin = match (env.admin_email, env.admin_password) {
            (Some(email), Some(password)) => Some(AdminBootstrap { email, password }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::InvalidValue(
                    "ADMIN_EMAIL and ADMIN_PASSWORD must be set together".to_string(),
                ))
            }
        };

        Ok(Self {
            server,
            auth,
            cors,
            admin,
        })
    }
}
