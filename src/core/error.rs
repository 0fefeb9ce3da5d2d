//! Engine Error Types
//!
//! Errors surfaced through the `error` half of a result envelope.
//! None of these are produced by default: they only appear in strict
//! mode or when a fault rule fires.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use super::operation::OperationKind;

/// Engine result type
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// An update located no row
    #[error("No row found in table '{table}'")]
    NotFound { table: String },

    /// A filter or ordering referenced a column no row carries
    #[error("Unknown column '{column}' in table '{table}'")]
    InvalidColumn { table: String, column: String },

    /// `single()` resolved over more than one row
    #[error("Expected a single row from '{table}', found {rows}")]
    ShapeMismatch { table: String, rows: usize },

    /// A payload entry was not an object
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// A fault rule fired
    #[error("Injected fault on {operation} '{table}': {message}")]
    Injected {
        table: String,
        operation: OperationKind,
        message: String,
    },

    /// Table store lock poisoned
    #[error("Storage error: {0}")]
    Storage(String),
}

impl EngineError {
    /// Create a not found error
    pub fn not_found(table: impl Into<String>) -> Self {
        Self::NotFound {
            table: table.into(),
        }
    }

    /// Create an invalid column error
    pub fn invalid_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::InvalidColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Get error code for envelopes and logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "MOCK_NOT_FOUND",
            Self::InvalidColumn { .. } => "MOCK_INVALID_COLUMN",
            Self::ShapeMismatch { .. } => "MOCK_SHAPE_MISMATCH",
            Self::InvalidPayload(_) => "MOCK_INVALID_PAYLOAD",
            Self::Injected { .. } => "MOCK_INJECTED_FAULT",
            Self::Storage(_) => "MOCK_STORAGE",
        }
    }

    /// HTTP status the real backend would have answered with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::InvalidColumn { .. } => 400,
            Self::ShapeMismatch { .. } => 406,
            Self::InvalidPayload(_) => 400,
            Self::Injected { .. } => 503,
            Self::Storage(_) => 500,
        }
    }
}

impl Serialize for EngineError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EngineError", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}
