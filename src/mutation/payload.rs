//! Write payloads
//!
//! Every verb accepts one row or many. Entries that are not JSON objects
//! are dropped at construction and counted in `rejected`.

use serde::Serialize;
use serde_json::Value;

use crate::core::{EngineError, EngineResult};
use crate::observability::Logger;
use crate::store::Row;

/// Rows handed to a mutation verb
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    rows: Vec<Row>,
    rejected: usize,
}

impl Payload {
    /// Serializes any value into a payload
    pub fn serialize<T: Serialize + ?Sized>(value: &T) -> EngineResult<Self> {
        serde_json::to_value(value)
            .map(Self::from)
            .map_err(|e| EngineError::InvalidPayload(e.to_string()))
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Entries dropped because they were not objects
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reports dropped entries: an error in strict mode, a WARN otherwise
    pub(crate) fn check(&self, table: &str, strict: bool) -> EngineResult<()> {
        if self.rejected == 0 {
            return Ok(());
        }

        let rejected = self.rejected.to_string();
        Logger::warn("PAYLOAD_REJECTED", &[("rejected", &rejected), ("table", table)]);

        if strict {
            return Err(EngineError::InvalidPayload(format!(
                "{} payload entries for '{}' are not objects",
                self.rejected, table
            )));
        }
        Ok(())
    }
}

impl From<Row> for Payload {
    fn from(row: Row) -> Self {
        Self {
            rows: vec![row],
            rejected: 0,
        }
    }
}

impl From<Vec<Row>> for Payload {
    fn from(rows: Vec<Row>) -> Self {
        Self { rows, rejected: 0 }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        let entries = match value {
            Value::Array(entries) => entries,
            other => vec![other],
        };

        let mut payload = Payload::default();
        for entry in entries {
            match entry {
                Value::Object(row) => payload.rows.push(row),
                _ => payload.rejected += 1,
            }
        }
        payload
    }
}
