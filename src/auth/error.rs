//! Token and permission errors
//!
//! Verification failures are recoverable: callers answer with an auth-failure
//! response. Only [`AuthError::Signing`] points at a broken deployment.

use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Secret material or algorithm could not produce a signature
    #[error("Failed to sign token: {0}")]
    Signing(String),

    /// Signature mismatch or a header algorithm other than HS256
    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    /// Token presented to the verifier of another token family
    #[error("Wrong token type: expected {expected}, got {actual}")]
    WrongTokenType {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Permission bitmask contains undefined bits: {0:#x}")]
    InvalidPermissionBits(u32),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm
            | ErrorKind::InvalidKeyFormat => AuthError::InvalidSignature,
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Malformed(e.to_string()),
        }
    }
}
