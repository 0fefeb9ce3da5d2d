//! Table handle
//!
//! `client.from(name)` returns one of these. Handles are cheap and
//! stateless; every handle to a name sees the same rows.

use serde_json::Value;

use crate::core::Engine;
use crate::mutation::{self, Payload, UpsertOptions, UpsertResponse};
use crate::query::{QueryBuilder, Response};

/// Entry point for reads and writes on one table
#[derive(Debug, Clone)]
pub struct TableHandle<'a> {
    engine: &'a Engine,
    name: String,
}

impl<'a> TableHandle<'a> {
    pub(crate) fn new(engine: &'a Engine, name: impl Into<String>) -> Self {
        Self {
            engine,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Starts a read over a copy of the current rows
    pub fn select(&self, columns: &str) -> QueryBuilder<'a> {
        QueryBuilder::new(self.engine, &self.name, columns)
    }

    /// `select("*")`
    pub fn select_all(&self) -> QueryBuilder<'a> {
        self.select("*")
    }

    /// Appends one row or many
    pub fn insert(&self, payload: impl Into<Payload>) -> Response {
        mutation::insert(self.engine, &self.name, payload.into())
    }

    /// Merges rows located by `id`, else by the table's key column
    pub fn update(&self, payload: impl Into<Payload>) -> Response {
        mutation::update(self.engine, &self.name, payload.into())
    }

    /// Merges rows located by `column`
    pub fn update_by(&self, column: &str, payload: impl Into<Payload>) -> Response {
        mutation::update_by(self.engine, &self.name, column, payload.into())
    }

    /// Clears the table
    pub fn delete(&self) -> Response {
        mutation::delete(self.engine, &self.name)
    }

    /// Removes rows whose `column` equals `value`
    pub fn delete_where(&self, column: &str, value: impl Into<Value>) -> Response {
        mutation::delete_where(self.engine, &self.name, column, &value.into())
    }

    /// Merges on `options.on_conflict`, appends otherwise
    pub fn upsert(&self, payload: impl Into<Payload>, options: UpsertOptions) -> UpsertResponse {
        mutation::upsert(self.engine, &self.name, payload.into(), &options)
    }
}
