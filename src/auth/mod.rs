//! Authentication and authorization module
//!
//! Provides salted JWT session tokens, email-verification tokens, and the
//! capability bitmask used to gate actions.

mod error;
mod jwt;
mod middleware;
mod password;
pub mod permissions;

pub use error::AuthError;
pub use jwt::{
    Clock, Credential, SystemClock, TokenPair, TokenService, TokenType,
    ACCESS_TOKEN_EXPIRATION_MINUTES, REFRESH_TOKEN_EXPIRATION_DAYS,
};
pub use middleware::{auth_middleware, require_all, require_any};
pub use password::{hash_password, verify_password};
pub use permissions::{Capability, PermissionMask};

use permissions::{PERM_ADMIN, PERM_INVESTOR, PERM_REGULAR, PERM_STARTUP_OWNER};
use serde::{Deserialize, Serialize};

/// User roles
///
/// A role only picks the starting permission bitmask. Admins may later edit a
/// user's bitmask away from the preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    StartupOwner,
    Investor,
    Regular,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::StartupOwner, Role::Investor, Role::Regular];

    /// Preset bitmask for new users with this role
    pub fn default_permissions(&self) -> PermissionMask {
        match self {
            Role::Admin => PERM_ADMIN,
            Role::StartupOwner => PERM_STARTUP_OWNER,
            Role::Investor => PERM_INVESTOR,
            Role::Regular => PERM_REGULAR,
        }
    }

    /// Roles a user may pick for themselves at registration
    pub fn is_self_assignable(&self) -> bool {
        !matches!(self, Role::Admin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Regular
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::StartupOwner => write!(f, "startup_owner"),
            Role::Investor => write!(f, "investor"),
            Role::Regular => write!(f, "regular"),
        }
    }
}
