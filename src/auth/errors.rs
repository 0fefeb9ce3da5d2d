//! # Auth Errors
//!
//! Error types for the auth stub.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth stub errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Email or password left empty
    #[error("Email and password are required")]
    MissingCredentials,

    /// Wrong password for a known account (generic, leaks nothing)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Password does not meet requirements
    #[error("Password does not meet requirements: {0}")]
    WeakPassword(String),

    /// Password hashing failed
    #[error("Internal error: password hashing failed")]
    HashingFailed,

    /// Session state could not be read or written
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl AuthError {
    /// Error code for envelopes and logs
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "AUTH_MISSING_CREDENTIALS",
            AuthError::InvalidCredentials => "AUTH_INVALID_CREDENTIALS",
            AuthError::WeakPassword(_) => "AUTH_WEAK_PASSWORD",
            AuthError::HashingFailed => "AUTH_HASHING_FAILED",
            AuthError::StorageError(_) => "AUTH_STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MissingCredentials => 400,
            AuthError::WeakPassword(_) => 422,
            AuthError::InvalidCredentials => 401,
            AuthError::HashingFailed => 500,
            AuthError::StorageError(_) => 500,
        }
    }
}

impl Serialize for AuthError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AuthError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), 401);
        assert_eq!(AuthError::MissingCredentials.status_code(), 400);
        assert_eq!(AuthError::HashingFailed.status_code(), 500);
    }

    #[test]
    fn test_error_messages_do_not_leak_info() {
        let err = AuthError::InvalidCredentials;
        assert!(!err.to_string().contains("password"));
        assert!(!err.to_string().contains("email"));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(AuthError::WeakPassword("too short".into())).unwrap();
        assert_eq!(json["code"], "AUTH_WEAK_PASSWORD");
        assert!(json["message"].as_str().unwrap().contains("too short"));
    }
}
