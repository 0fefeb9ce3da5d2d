//! # Result Envelope
//!
//! `{ data, error }`, the shape every engine call resolves to.

use std::future::{ready, IntoFuture, Ready};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::core::EngineError;
use crate::store::Row;

/// The `data` half of an envelope
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Data {
    /// Nothing found
    #[default]
    Null,
    /// One row (`single`, `maybe_single`)
    One(Row),
    /// A row sequence
    Many(Vec<Row>),
}

impl Data {
    pub fn is_null(&self) -> bool {
        matches!(self, Data::Null)
    }

    /// Number of rows carried
    pub fn len(&self) -> usize {
        match self {
            Data::Null => 0,
            Data::One(_) => 1,
            Data::Many(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The single row, if this is one
    pub fn as_row(&self) -> Option<&Row> {
        match self {
            Data::One(row) => Some(row),
            _ => None,
        }
    }

    /// The row sequence, if this is one
    pub fn as_rows(&self) -> Option<&[Row]> {
        match self {
            Data::Many(rows) => Some(rows),
            _ => None,
        }
    }

    /// Every carried row, in order
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Data::Null => Vec::new(),
            Data::One(row) => vec![row],
            Data::Many(rows) => rows,
        }
    }

    /// The first carried row
    pub fn into_row(self) -> Option<Row> {
        self.into_rows().into_iter().next()
    }
}

/// Result envelope returned by every operation
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Response {
    pub data: Data,
    pub error: Option<EngineError>,
}

impl Response {
    /// A row sequence
    pub fn many(rows: Vec<Row>) -> Self {
        Self {
            data: Data::Many(rows),
            error: None,
        }
    }

    /// One row, or null
    pub fn optional(row: Option<Row>) -> Self {
        Self {
            data: row.map_or(Data::Null, Data::One),
            error: None,
        }
    }

    /// A failed call: null data
    pub fn failure(error: EngineError) -> Self {
        Self {
            data: Data::Null,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Deserializes every row into `T`
    pub fn rows<T: DeserializeOwned>(&self) -> Result<Vec<T>, serde_json::Error> {
        self.data
            .clone()
            .into_rows()
            .into_iter()
            .map(|row| serde_json::from_value(Value::Object(row)))
            .collect()
    }

    /// Deserializes the first row into `T`
    pub fn row<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        self.data
            .clone()
            .into_row()
            .map(|row| serde_json::from_value(Value::Object(row)))
            .transpose()
    }
}

impl IntoFuture for Response {
    type Output = Response;
    type IntoFuture = Ready<Response>;

    fn into_future(self) -> Self::IntoFuture {
        ready(self)
    }
}
