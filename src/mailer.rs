//! Verification email delivery
//!
//! Delivery is an outside service. The server only needs somewhere to hand
//! verification tokens; the default sink writes them to the log.

use crate::error::AppError;
use std::sync::Mutex;
use tracing::info;

pub trait Mailer: Send + Sync {
    fn send_verification(&self, email: &str, token: &str) -> Result<(), AppError>;
}

/// Development mailer: emits the verification token as a log line
#[derive(Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_verification(&self, email: &str, token: &str) -> Result<(), AppError> {
        info!(
            to = email,
            "Verification email: POST /api/auth/verify-email {{\"token\":\"{}\"}}",
            token
        );
        Ok(())
    }
}

/// Keeps every message in memory
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    /// Most recent token sent to `email`
    pub fn last_token_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .ok()?
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token.clone())
    }
}

impl Mailer for RecordingMailer {
    fn send_verification(&self, email: &str, token: &str) -> Result<(), AppError> {
        self.sent
            .lock()
            .map_err(|_| AppError::Internal("mailer lock poisoned".to_string()))?
            .push((email.to_string(), token.to_string()));
        Ok(())
    }
}
