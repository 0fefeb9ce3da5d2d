//! Upsert
//!
//! Merge-or-append per payload row, keyed on an optional conflict column.

use std::future::{ready, IntoFuture, Ready};

use super::payload::Payload;
use super::verbs::{locate, merge_into};
use crate::core::{Engine, EngineResult, OperationKind};
use crate::observability::Logger;
use crate::query::Response;
use crate::store::Row;

/// Options for `upsert`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertOptions {
    /// Column identifying an existing row
    pub on_conflict: Option<String>,
    /// Skip rows that would be appended
    pub ignore_duplicates: bool,
}

impl UpsertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_conflict(mut self, column: impl Into<String>) -> Self {
        self.on_conflict = Some(column.into());
        self
    }

    pub fn ignore_duplicates(mut self, ignore: bool) -> Self {
        self.ignore_duplicates = ignore;
        self
    }
}

/// Result of an upsert.
///
/// Awaiting it yields every processed row; `maybe_single` yields the
/// last one.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertResponse {
    response: Response,
}

impl UpsertResponse {
    /// Same rows; the column list is not applied
    pub fn select(self, _columns: &str) -> Self {
        self
    }

    /// The last processed row, or null
    pub fn maybe_single(self) -> Response {
        match self.response.error {
            Some(err) => Response::failure(err),
            None => Response::optional(self.response.data.into_rows().pop()),
        }
    }

    pub fn execute(self) -> Response {
        self.response
    }
}

impl IntoFuture for UpsertResponse {
    type Output = Response;
    type IntoFuture = Ready<Response>;

    fn into_future(self) -> Self::IntoFuture {
        ready(self.response)
    }
}

/// Merges or appends every payload row
pub fn upsert(engine: &Engine, table: &str, payload: Payload, options: &UpsertOptions) -> UpsertResponse {
    let response = match try_upsert(engine, table, payload, options) {
        Ok(rows) => Response::many(rows),
        Err(err) => Response::failure(err),
    };
    UpsertResponse { response }
}

fn try_upsert(
    engine: &Engine,
    table: &str,
    payload: Payload,
    options: &UpsertOptions,
) -> EngineResult<Vec<Row>> {
    engine.guard(table, OperationKind::Upsert)?;
    payload.check(table, engine.is_strict())?;

    let incoming = payload.into_rows();
    let conflict = options.on_conflict.as_deref();

    let (processed, merged) = engine.store().with_table(table, |rows| {
        let mut processed = Vec::new();
        let mut merged = 0u64;
        for row in incoming {
            let existing = conflict.and_then(|column| locate(rows, column, &row));
            match existing {
                Some(index) => {
                    merge_into(&mut rows[index], &row);
                    processed.push(rows[index].clone());
                    merged += 1;
                }
                None if options.ignore_duplicates => {}
                None => {
                    rows.push(row.clone());
                    processed.push(row);
                }
            }
        }
        (processed, merged)
    })?;

    let metrics = engine.metrics();
    metrics.increment_upserts();
    metrics.add_rows_updated(merged);
    metrics.add_rows_inserted(processed.len() as u64 - merged);

    let count = processed.len().to_string();
    Logger::trace(
        "ROWS_UPSERTED",
        &[
            ("on_conflict", conflict.unwrap_or("none")),
            ("rows", &count),
            ("table", table),
        ],
    );

    Ok(processed)
}
