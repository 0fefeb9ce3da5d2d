//! Table Store
//!
//! Owns the canonical row sequence of every table. A table is created
//! on first reference (seeded from fixtures when it has any) and is
//! never removed, so every handle to a name sees the same rows.

use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockWriteGuard};

use super::fixtures::{FixtureSet, BUILTIN_TABLE_KEYS};
use super::Row;
use crate::config::{ClientConfig, ConfigResult};
use crate::core::{EngineError, EngineResult};

/// Column used by `update` when a table has no configured key
pub const DEFAULT_KEY: &str = "id";

/// Named, ordered, in-memory tables
#[derive(Debug, Default)]
pub struct TableStore {
    /// Rows by table name
    tables: RwLock<HashMap<String, Vec<Row>>>,
    /// Rows handed to a table on first reference
    fixtures: FixtureSet,
    /// Identifying column per table
    keys: HashMap<String, String>,
}

impl TableStore {
    /// Create an empty store without fixtures
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded from the given fixtures
    pub fn with_fixtures(fixtures: FixtureSet) -> Self {
        Self {
            fixtures,
            ..Self::default()
        }
    }

    /// Builds the store described by a client configuration.
    ///
    /// Directory fixtures override built-in tables of the same name,
    /// configured keys override the built-in ones.
    pub fn from_config(config: &ClientConfig) -> ConfigResult<Self> {
        let mut fixtures = FixtureSet::new();
        let mut store = Self::new();

        if config.builtin_fixtures {
            fixtures.merge(FixtureSet::builtin()?);
            for (table, key) in BUILTIN_TABLE_KEYS {
                store.keys.insert(table.to_string(), key.to_string());
            }
        }
        if let Some(dir) = &config.fixtures_dir {
            fixtures.merge(FixtureSet::load_dir(dir)?);
        }
        store
            .keys
            .extend(config.table_keys.iter().map(|(t, k)| (t.clone(), k.clone())));

        store.fixtures = fixtures;
        Ok(store)
    }

    /// Set the identifying column of a table
    pub fn with_table_key(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.keys.insert(table.into(), column.into());
        self
    }

    /// Identifying column of a table (`id` unless configured)
    pub fn key_for(&self, table: &str) -> &str {
        self.keys.get(table).map(String::as_str).unwrap_or(DEFAULT_KEY)
    }

    /// Makes sure a table exists, seeding it on first reference
    pub fn ensure_table(&self, table: &str) -> EngineResult<()> {
        self.with_table(table, |_| ())
    }

    /// Returns a defensive copy of a table's rows
    pub fn snapshot(&self, table: &str) -> EngineResult<Vec<Row>> {
        {
            let tables = self
                .tables
                .read()
                .map_err(|_| EngineError::storage("Lock poisoned"))?;
            if let Some(rows) = tables.get(table) {
                return Ok(rows.clone());
            }
        }
        self.with_table(table, |rows| rows.clone())
    }

    /// Runs `f` against a table's rows under the write lock.
    ///
    /// This is the only write path: each call is atomic with respect
    /// to every other store access.
    pub fn with_table<F, R>(&self, table: &str, f: F) -> EngineResult<R>
    where
        F: FnOnce(&mut Vec<Row>) -> R,
    {
        let mut tables = self.write()?;
        let rows = tables
            .entry(table.to_string())
            .or_insert_with(|| self.fixtures.get(table).cloned().unwrap_or_default());
        Ok(f(rows))
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: &str) -> EngineResult<usize> {
        self.with_table(table, |rows| rows.len())
    }

    /// Names of every referenced or seedable table, sorted
    pub fn table_names(&self) -> EngineResult<Vec<String>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| EngineError::storage("Lock poisoned"))?;

        let names: BTreeSet<String> = tables
            .keys()
            .cloned()
            .chain(self.fixtures.table_names().map(str::to_string))
            .collect();
        Ok(names.into_iter().collect())
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, HashMap<String, Vec<Row>>>> {
        self.tables
            .write()
            .map_err(|_| EngineError::storage("Lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_unseen_table_is_empty() {
        let store = TableStore::new();
        assert!(store.snapshot("items").unwrap().is_empty());
        assert_eq!(store.table_names().unwrap(), vec!["items"]);
    }

    #[test]
    fn test_writes_visible_to_later_snapshots() {
        let store = TableStore::new();
        store
            .with_table("items", |rows| rows.push(row(json!({"id": 1}))))
            .unwrap();

        assert_eq!(store.snapshot("items").unwrap().len(), 1);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let store = TableStore::new();
        store
            .with_table("items", |rows| rows.push(row(json!({"id": 1}))))
            .unwrap();

        let mut copy = store.snapshot("items").unwrap();
        copy.clear();

        assert_eq!(store.row_count("items").unwrap(), 1);
    }

    #[test]
    fn test_fixtures_seed_on_first_reference() {
        let mut fixtures = FixtureSet::new();
        fixtures.insert("items", vec![row(json!({"id": 1})), row(json!({"id": 2}))]);
        let store = TableStore::with_fixtures(fixtures);

        assert_eq!(store.row_count("items").unwrap(), 2);
        store.with_table("items", |rows| rows.clear()).unwrap();
        // Fixtures are not re-applied once the table exists
        assert_eq!(store.row_count("items").unwrap(), 0);
    }

    #[test]
    fn test_key_resolution() {
        let store = TableStore::from_config(&ClientConfig::default()).unwrap();

        assert_eq!(store.key_for("provas"), "id_prova");
        assert_eq!(store.key_for("usuarios"), "auth_user_id");
        assert_eq!(store.key_for("anything_else"), DEFAULT_KEY);
    }

    #[test]
    fn test_table_names_include_fixture_tables() {
        let store = TableStore::from_config(&ClientConfig::default()).unwrap();
        let names = store.table_names().unwrap();
        assert_eq!(names, vec!["alternativas", "provas", "questoes", "temas"]);
    }
}
