//! Password hashing and verification
//!
//! Uses bcrypt. Passwords never reach the token layer.

use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};

pub const MIN_PASSWORD_LENGTH: usize = 8;

// bcrypt ignores input past 72 bytes
pub const MAX_PASSWORD_LENGTH: usize = 72;

// Minimum bcrypt cost under test
const BCRYPT_COST: u32 = if cfg!(test) { 4 } else { DEFAULT_COST };

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String, AppError> {
    if password.len() < MIN_PASSWORD_LENGTH || password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "Password must be between {} and {} bytes",
            MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
        )));
    }
    hash(password, BCRYPT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    verify(password, password_hash)
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
}
