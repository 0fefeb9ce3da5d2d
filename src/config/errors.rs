//! Configuration and fixture loading errors.

use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration and fixture errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// File or directory could not be read
    #[error("Failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    /// File content is not the expected JSON
    #[error("Invalid JSON in {path}: {reason}")]
    Parse { path: String, reason: String },

    /// Configuration values are inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn read(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Read {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
