//! Fixture loading
//!
//! Fixture rows are handed to a table the first time it is referenced.
//! The built-in set carries the exam tables; more can be read from a
//! directory holding one `<table>.json` file per table.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use super::Row;
use crate::config::{ConfigError, ConfigResult};
use crate::observability::Logger;

const BUILTIN: &[(&str, &str)] = &[
    ("provas", include_str!("../../fixtures/provas.json")),
    ("temas", include_str!("../../fixtures/temas.json")),
    ("questoes", include_str!("../../fixtures/questoes.json")),
    ("alternativas", include_str!("../../fixtures/alternativas.json")),
];

/// Identifying columns of the built-in tables
pub const BUILTIN_TABLE_KEYS: &[(&str, &str)] = &[
    ("provas", "id_prova"),
    ("temas", "id_tema"),
    ("questoes", "id_questao"),
    ("alternativas", "id_alternativa"),
    ("usuarios", "auth_user_id"),
];

/// Rows to seed, by table name
#[derive(Debug, Clone, Default)]
pub struct FixtureSet {
    tables: BTreeMap<String, Vec<Row>>,
}

impl FixtureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The exam tables embedded in the crate
    pub fn builtin() -> ConfigResult<Self> {
        let mut set = Self::new();
        for (table, content) in BUILTIN {
            let rows = parse_rows(&format!("<builtin:{}>", table), content)?;
            set.insert(*table, rows);
        }
        Ok(set)
    }

    /// Loads every `*.json` file of a directory.
    ///
    /// The file stem names the table; non-JSON files are skipped.
    pub fn load_dir(dir: &Path) -> ConfigResult<Self> {
        let display = dir.display().to_string();
        let entries = fs::read_dir(dir).map_err(|e| ConfigError::read(&display, e))?;

        let mut set = Self::new();
        for entry in entries {
            let path = entry.map_err(|e| ConfigError::read(&display, e))?.path();

            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let Some(table) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let content = fs::read_to_string(&path)
                .map_err(|e| ConfigError::read(path.display().to_string(), e))?;
            let rows = parse_rows(&path.display().to_string(), &content)?;
            set.insert(table, rows);
        }

        let count = set.tables.len().to_string();
        Logger::info("FIXTURES_LOADED", &[("dir", &display), ("tables", &count)]);
        Ok(set)
    }

    /// Adds or replaces a table's fixture rows
    pub fn insert(&mut self, table: impl Into<String>, rows: Vec<Row>) {
        self.tables.insert(table.into(), rows);
    }

    /// Merges another set over this one; its tables win
    pub fn merge(&mut self, other: FixtureSet) {
        self.tables.extend(other.tables);
    }

    pub fn get(&self, table: &str) -> Option<&Vec<Row>> {
        self.tables.get(table)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Parses a JSON array of objects
fn parse_rows(origin: &str, content: &str) -> ConfigResult<Vec<Row>> {
    let value: Value = serde_json::from_str(content).map_err(|e| ConfigError::parse(origin, e))?;

    let Value::Array(items) = value else {
        return Err(ConfigError::parse(origin, "expected an array of rows"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(row) => Ok(row),
            _ => Err(ConfigError::parse(origin, format!("row {} is not an object", i))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_tables() {
        let set = FixtureSet::builtin().unwrap();
        assert_eq!(set.get("provas").unwrap().len(), 5);
        assert_eq!(set.get("temas").unwrap().len(), 3);
        assert_eq!(set.get("questoes").unwrap().len(), 5);
        assert_eq!(set.get("alternativas").unwrap().len(), 25);
    }

    #[test]
    fn test_load_dir_skips_non_json() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("items.json"), r#"[{"id": 1}, {"id": 2}]"#).unwrap();
        fs::write(tmp.path().join("README.txt"), "not a table").unwrap();

        let set = FixtureSet::load_dir(tmp.path()).unwrap();
        assert_eq!(set.table_names().collect::<Vec<_>>(), vec!["items"]);
        assert_eq!(set.get("items").unwrap().len(), 2);
    }

    #[test]
    fn test_non_object_row_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("bad.json"), r#"[{"id": 1}, 7]"#).unwrap();

        let result = FixtureSet::load_dir(tmp.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_merge_overrides_table() {
        let mut base = FixtureSet::builtin().unwrap();
        let mut extra = FixtureSet::new();
        extra.insert("provas", Vec::new());

        base.merge(extra);
        assert!(base.get("provas").unwrap().is_empty());
        assert_eq!(base.get("temas").unwrap().len(), 3);
    }
}
