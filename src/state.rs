//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::auth::{Clock, SystemClock, TokenService};
use crate::config::AuthConfig;
use crate::mailer::Mailer;
use crate::users::UserStore;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// User store holding salts and permission bitmasks
    pub users: UserStore,

    /// Token issuance and verification
    pub tokens: TokenService,

    /// Verification email sink
    pub mailer: Arc<dyn Mailer>,

    /// Immutable auth settings (email token lifetime, cookie flags)
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(auth: AuthConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self::with_clock(auth, mailer, Arc::new(SystemClock))
    }

    pub fn with_clock(auth: AuthConfig, mailer: Arc<dyn Mailer>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: UserStore::new(),
            tokens: TokenService::with_clock(&auth, clock),
            mailer,
            auth,
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
