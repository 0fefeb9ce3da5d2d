//! Table store subsystem
//!
//! Rows are schema-less JSON objects held in named, ordered tables.

mod fixtures;
mod table_store;

pub use fixtures::{FixtureSet, BUILTIN_TABLE_KEYS};
pub use table_store::{TableStore, DEFAULT_KEY};

/// One schema-less record
pub type Row = serde_json::Map<String, serde_json::Value>;
