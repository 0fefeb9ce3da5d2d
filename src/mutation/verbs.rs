//! Insert, update and delete
//!
//! Each verb checks fault rules and the payload first, then runs its
//! whole read-modify-write inside one `TableStore::with_table` call.
//! A failed verb leaves the table untouched.

use serde_json::Value;

use super::payload::Payload;
use crate::core::{Engine, EngineError, EngineResult, OperationKind};
use crate::observability::Logger;
use crate::query::{values_equal, Response};
use crate::store::{Row, DEFAULT_KEY};

/// Appends copies of every payload row, in input order
pub fn insert(engine: &Engine, table: &str, payload: Payload) -> Response {
    into_response(try_insert(engine, table, payload))
}

/// Merges each payload row into the row it identifies.
///
/// A row is located by the payload's `id` field when it carries one,
/// else by the table's configured key column.
pub fn update(engine: &Engine, table: &str, payload: Payload) -> Response {
    into_response(try_update(engine, table, None, payload))
}

/// Like `update`, with the key column named explicitly
pub fn update_by(engine: &Engine, table: &str, column: &str, payload: Payload) -> Response {
    into_response(try_update(engine, table, Some(column), payload))
}

/// Removes every row of the table
pub fn delete(engine: &Engine, table: &str) -> Response {
    into_response(try_delete(engine, table, None).map(|_| Vec::new()))
}

/// Removes the rows whose `column` equals `value` and returns them
pub fn delete_where(engine: &Engine, table: &str, column: &str, value: &Value) -> Response {
    into_response(try_delete(engine, table, Some((column, value))))
}

fn into_response(result: EngineResult<Vec<Row>>) -> Response {
    match result {
        Ok(rows) => Response::many(rows),
        Err(err) => Response::failure(err),
    }
}

fn try_insert(engine: &Engine, table: &str, payload: Payload) -> EngineResult<Vec<Row>> {
    engine.guard(table, OperationKind::Insert)?;
    payload.check(table, engine.is_strict())?;

    let inserted = payload.into_rows();
    engine
        .store()
        .with_table(table, |rows| rows.extend(inserted.iter().cloned()))?;

    engine.metrics().add_rows_inserted(inserted.len() as u64);
    let count = inserted.len().to_string();
    Logger::trace("ROWS_INSERTED", &[("rows", &count), ("table", table)]);

    Ok(inserted)
}

fn try_update(
    engine: &Engine,
    table: &str,
    column: Option<&str>,
    payload: Payload,
) -> EngineResult<Vec<Row>> {
    engine.guard(table, OperationKind::Update)?;
    payload.check(table, engine.is_strict())?;

    let key = engine.store().key_for(table).to_string();
    let patches = payload.into_rows();

    let merged = engine.store().with_table(table, |rows| {
        let mut merged = Vec::new();
        for patch in &patches {
            let by = match column {
                Some(column) => column,
                None if patch.contains_key(DEFAULT_KEY) => DEFAULT_KEY,
                None => key.as_str(),
            };
            if let Some(index) = locate(rows, by, patch) {
                merge_into(&mut rows[index], patch);
                merged.push(rows[index].clone());
            }
        }
        merged
    })?;

    if merged.is_empty() && !patches.is_empty() && engine.is_strict() {
        return Err(EngineError::not_found(table));
    }

    engine.metrics().add_rows_updated(merged.len() as u64);
    let count = merged.len().to_string();
    Logger::trace("ROWS_UPDATED", &[("rows", &count), ("table", table)]);

    Ok(merged)
}

fn try_delete(
    engine: &Engine,
    table: &str,
    filter: Option<(&str, &Value)>,
) -> EngineResult<Vec<Row>> {
    engine.guard(table, OperationKind::Delete)?;

    let removed = engine.store().with_table(table, |rows| match filter {
        None => std::mem::take(rows),
        Some((column, value)) => {
            let (removed, kept): (Vec<Row>, Vec<Row>) = std::mem::take(rows)
                .into_iter()
                .partition(|row| row.get(column).is_some_and(|v| values_equal(v, value)));
            *rows = kept;
            removed
        }
    })?;

    engine.metrics().add_rows_deleted(removed.len() as u64);
    let count = removed.len().to_string();
    match filter {
        None => Logger::warn("TABLE_CLEARED", &[("rows", &count), ("table", table)]),
        Some((column, _)) => Logger::trace(
            "ROWS_DELETED",
            &[("column", column), ("rows", &count), ("table", table)],
        ),
    }

    Ok(removed)
}

/// Index of the first row whose `column` equals the patch's value for it
pub(crate) fn locate(rows: &[Row], column: &str, patch: &Row) -> Option<usize> {
    let wanted = patch.get(column)?;
    rows.iter()
        .position(|row| row.get(column).is_some_and(|v| values_equal(v, wanted)))
}

/// Shallow merge: patch fields overwrite, other fields stay
pub(crate) fn merge_into(row: &mut Row, patch: &Row) {
    for (k, v) in patch {
        row.insert(k.clone(), v.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TableStore;
    use serde_json::json;
    use std::sync::Arc;

    fn engine() -> Engine {
        Engine::new(Arc::new(
            TableStore::new().with_table_key("usuarios", "auth_user_id"),
        ))
    }

    fn rows(engine: &Engine, table: &str) -> Vec<Row> {
        engine.store().snapshot(table).unwrap()
    }

    #[test]
    fn test_insert_appends_in_order() {
        let engine = engine();
        insert(&engine, "items", json!({"id": 1}).into());
        let response = insert(&engine, "items", json!([{"id": 2}, {"id": 3}]).into());

        assert_eq!(response.data.len(), 2);
        let ids: Vec<_> = rows(&engine, "items").iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_update_merges_by_id() {
        let engine = engine();
        insert(&engine, "items", json!([{"id": 1, "a": 1, "b": 1}]).into());

        let response = update(&engine, "items", json!({"id": "1", "b": 2}).into());
        let merged = response.data.into_rows();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0]["a"], 1);
        assert_eq!(merged[0]["b"], 2);
        // The patch value overwrites the stored one, coerced key included
        assert_eq!(rows(&engine, "items")[0]["id"], "1");
    }

    #[test]
    fn test_update_falls_back_to_table_key() {
        let engine = engine();
        insert(&engine, "usuarios", json!({"auth_user_id": "u1", "nome": "A"}).into());

        let response = update(&engine, "usuarios", json!({"auth_user_id": "u1", "nome": "B"}).into());
        assert_eq!(response.data.len(), 1);
        assert_eq!(rows(&engine, "usuarios")[0]["nome"], "B");
    }

    #[test]
    fn test_update_payload_id_wins_over_table_key() {
        let engine = Engine::new(Arc::new(TableStore::new().with_table_key("t", "code")));
        insert(&engine, "t", json!({"id": 1, "code": "x", "v": 0}).into());

        let response = update(&engine, "t", json!({"id": 99, "code": "x", "v": 5}).into());
        assert!(response.data.is_empty());
        assert_eq!(rows(&engine, "t"), vec![json!({"id": 1, "code": "x", "v": 0})
            .as_object()
            .unwrap()
            .clone()]);
    }

    #[test]
    fn test_update_miss_returns_empty() {
        let engine = engine();
        let response = update(&engine, "items", json!({"id": 9, "a": 1}).into());
        assert!(response.data.is_empty());
        assert!(response.error.is_none());
        assert!(rows(&engine, "items").is_empty());

        let strict = engine.with_strict(true);
        let response = update(&strict, "items", json!({"id": 9}).into());
        assert!(matches!(response.error, Some(EngineError::NotFound { .. })));
    }

    #[test]
    fn test_update_by_named_column() {
        let engine = engine();
        insert(&engine, "items", json!([{"code": "x", "n": 1}, {"code": "y", "n": 1}]).into());

        update_by(&engine, "items", "code", json!({"code": "y", "n": 5}).into());
        assert_eq!(rows(&engine, "items")[1]["n"], 5);
        assert_eq!(rows(&engine, "items")[0]["n"], 1);
    }

    #[test]
    fn test_delete_clears_table() {
        let engine = engine();
        insert(&engine, "items", json!([{"id": 1}, {"id": 2}]).into());

        let response = delete(&engine, "items");
        assert!(response.data.is_empty());
        assert!(rows(&engine, "items").is_empty());
    }

    #[test]
    fn test_delete_where_removes_matches_only() {
        let engine = engine();
        insert(&engine, "items", json!([{"id": 1}, {"id": 2}, {"id": 1}]).into());

        let response = delete_where(&engine, "items", "id", &json!("1"));
        assert_eq!(response.data.len(), 2);
        assert_eq!(rows(&engine, "items").len(), 1);
    }

    #[test]
    fn test_rejected_entries() {
        let engine = engine();
        let response = insert(&engine, "items", json!([{"id": 1}, 5]).into());
        assert_eq!(response.data.len(), 1);

        let strict = engine.with_strict(true);
        let response = insert(&strict, "items", json!([{"id": 2}, 5]).into());
        assert!(matches!(response.error, Some(EngineError::InvalidPayload(_))));
        assert_eq!(rows(&strict, "items").len(), 1);
    }
}
