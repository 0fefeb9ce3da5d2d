//! Query builder
//!
//! A builder starts from a copy of the table's rows taken at `select`
//! time. Filter, order and limit calls narrow or reorder that copy and
//! hand the builder back; nothing is written to the store. A terminal
//! call (`.await`, `execute`, `then`, `finally`, `collect`, `first`,
//! `maybe_single`) consumes the builder and yields a `Response`.
//!
//! ```ignore
//! let response = client
//!     .from("questoes")
//!     .select("id_questao,enunciado")
//!     .eq("id_prova", 1)
//!     .order("nr_questao", OrderOptions::asc())
//!     .limit(10)
//!     .await;
//! ```

use std::collections::HashSet;
use std::future::{ready, IntoFuture, Ready};

use serde_json::Value;

use super::filter::{FilterExpr, FilterOperator};
use super::response::Response;
use super::sorter::RowSorter;
use crate::core::{Engine, EngineError, OperationKind};
use crate::observability::Logger;
use crate::store::Row;

/// Options for `order`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderOptions {
    pub ascending: bool,
}

impl Default for OrderOptions {
    fn default() -> Self {
        Self { ascending: true }
    }
}

impl OrderOptions {
    pub fn asc() -> Self {
        Self { ascending: true }
    }

    pub fn desc() -> Self {
        Self { ascending: false }
    }
}

/// Terminal shape requested on the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Every row of the working set
    Many,
    /// The first row, or null
    Single,
}

/// Fluent read query over one table
#[derive(Debug)]
pub struct QueryBuilder<'a> {
    engine: &'a Engine,
    table: String,
    columns: String,
    /// Working set
    rows: Vec<Row>,
    shape: Shape,
    /// Columns seen in the table at select time (strict mode only)
    known_columns: Option<HashSet<String>>,
    /// First deferred error; reported on resolution
    error: Option<EngineError>,
}

impl<'a> QueryBuilder<'a> {
    /// Starts a query over a fresh copy of the table's rows.
    ///
    /// `columns` is kept for parity with the remote client; rows are
    /// never projected.
    pub(crate) fn new(engine: &'a Engine, table: &str, columns: &str) -> Self {
        let (rows, error) = match engine.store().snapshot(table) {
            Ok(rows) => (rows, None),
            Err(err) => (Vec::new(), Some(err)),
        };

        let known_columns = (engine.is_strict() && !rows.is_empty())
            .then(|| rows.iter().flat_map(|r| r.keys().cloned()).collect());

        Self {
            engine,
            table: table.to_string(),
            columns: columns.to_string(),
            rows,
            shape: Shape::Many,
            known_columns,
            error,
        }
    }

    /// Table this query reads
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Column list passed to `select`
    pub fn columns(&self) -> &str {
        &self.columns
    }

    /// Current size of the working set
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keeps the rows matching `filter`
    pub fn filter(mut self, filter: FilterExpr) -> Self {
        self.check_column(&filter.field);
        self.rows.retain(|row| filter.matches(row));
        self
    }

    /// Keeps rows whose `column` equals `value`
    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(FilterExpr::eq(column, value.into()))
    }

    /// Keeps rows whose `column` differs from `value`
    pub fn neq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(FilterExpr::new(column, FilterOperator::Neq, value.into()))
    }

    pub fn gt(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(FilterExpr::new(column, FilterOperator::Gt, value.into()))
    }

    pub fn gte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(FilterExpr::new(column, FilterOperator::Gte, value.into()))
    }

    pub fn lt(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(FilterExpr::new(column, FilterOperator::Lt, value.into()))
    }

    pub fn lte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(FilterExpr::new(column, FilterOperator::Lte, value.into()))
    }

    /// SQL LIKE (`%`, `_`)
    pub fn like(self, column: &str, pattern: &str) -> Self {
        self.filter(FilterExpr::new(column, FilterOperator::Like, pattern.into()))
    }

    /// Case-insensitive LIKE
    pub fn ilike(self, column: &str, pattern: &str) -> Self {
        self.filter(FilterExpr::new(column, FilterOperator::Ilike, pattern.into()))
    }

    /// `is null` / `is true` / `is false`
    pub fn is(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(FilterExpr::new(column, FilterOperator::Is, value.into()))
    }

    /// Keeps rows whose `column` is one of `values`
    pub fn in_list<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.filter(FilterExpr::in_list(column, values))
    }

    /// Re-sorts the working set by `column`
    pub fn order(mut self, column: &str, options: OrderOptions) -> Self {
        self.check_column(column);
        RowSorter::sort(&mut self.rows, column, options.ascending);
        self
    }

    /// Keeps the first `n` rows
    pub fn limit(mut self, n: usize) -> Self {
        self.rows.truncate(n);
        self
    }

    /// Keeps rows `from..=to`
    pub fn range(mut self, from: usize, to: usize) -> Self {
        let count = to.saturating_sub(from).saturating_add(1);
        self.rows = if to < from {
            Vec::new()
        } else {
            self.rows.into_iter().skip(from).take(count).collect()
        };
        self
    }

    /// Resolve to the first row, or null
    pub fn single(mut self) -> Self {
        self.shape = Shape::Single;
        self
    }

    /// Resolves now to the first row, or null
    pub fn maybe_single(self) -> Response {
        self.resolve(Shape::Single, false)
    }

    /// Resolves the query
    pub fn execute(self) -> Response {
        let shape = self.shape;
        self.resolve(shape, true)
    }

    /// Resolves and hands the envelope to `on_fulfilled`
    pub fn then<F, U>(self, on_fulfilled: F) -> Ready<U>
    where
        F: FnOnce(Response) -> U,
    {
        ready(on_fulfilled(self.execute()))
    }

    /// Resolves, then runs `on_finally`
    pub fn finally<F>(self, on_finally: F) -> Ready<Response>
    where
        F: FnOnce(),
    {
        let response = self.execute();
        on_finally();
        ready(response)
    }

    /// Resolves to the rows, empty on error
    pub fn collect(self) -> Vec<Row> {
        self.execute().data.into_rows()
    }

    /// Resolves to the first row
    pub fn first(self) -> Option<Row> {
        self.collect().into_iter().next()
    }

    /// Records an unknown column in strict mode
    fn check_column(&mut self, column: &str) {
        if self.error.is_some() {
            return;
        }
        if let Some(known) = &self.known_columns {
            if !known.contains(column) {
                self.error = Some(EngineError::invalid_column(&self.table, column));
            }
        }
    }

    fn resolve(self, shape: Shape, strict_shape: bool) -> Response {
        if let Err(err) = self.engine.guard(&self.table, OperationKind::Select) {
            return Response::failure(err);
        }
        if let Some(err) = self.error {
            return Response::failure(err);
        }

        self.engine.metrics().increment_queries_resolved();
        let count = self.rows.len().to_string();
        Logger::trace("QUERY_RESOLVED", &[("rows", &count), ("table", &self.table)]);

        match shape {
            Shape::Many => Response::many(self.rows),
            Shape::Single => {
                if strict_shape && self.engine.is_strict() && self.rows.len() > 1 {
                    return Response::failure(EngineError::ShapeMismatch {
                        table: self.table,
                        rows: self.rows.len(),
                    });
                }
                Response::optional(self.rows.into_iter().next())
            }
        }
    }
}

impl<'a> IntoFuture for QueryBuilder<'a> {
    type Output = Response;
    type IntoFuture = Ready<Response>;

    fn into_future(self) -> Self::IntoFuture {
        ready(self.execute())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TableStore;
    use serde_json::json;
    use std::sync::Arc;

    fn engine_with(rows: Value) -> Engine {
        let store = TableStore::new();
        store
            .with_table("items", |t| {
                for row in rows.as_array().unwrap() {
                    t.push(row.as_object().cloned().unwrap());
                }
            })
            .unwrap();
        Engine::new(Arc::new(store))
    }

    fn ids(response: &Response) -> Vec<i64> {
        response
            .data
            .as_rows()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_select_copies_all_rows() {
        let engine = engine_with(json!([{"id": 1}, {"id": 2}]));
        let response = QueryBuilder::new(&engine, "items", "*").execute();
        assert_eq!(ids(&response), vec![1, 2]);
        assert!(response.is_ok());
    }

    #[test]
    fn test_working_set_never_written_back() {
        let engine = engine_with(json!([{"id": 1}, {"id": 2}]));
        let _ = QueryBuilder::new(&engine, "items", "*").eq("id", 1).limit(0).execute();
        assert_eq!(engine.store().row_count("items").unwrap(), 2);
    }

    #[test]
    fn test_order_then_limit() {
        let engine = engine_with(json!([
            {"id": 1, "n": "b"}, {"id": 2, "n": "c"}, {"id": 3, "n": "a"}
        ]));
        let response = QueryBuilder::new(&engine, "items", "*")
            .order("n", OrderOptions::asc())
            .limit(2)
            .execute();
        assert_eq!(ids(&response), vec![3, 1]);
    }

    #[test]
    fn test_range_inclusive() {
        let engine = engine_with(json!([{"id": 1}, {"id": 2}, {"id": 3}, {"id": 4}]));
        let response = QueryBuilder::new(&engine, "items", "*").range(1, 2).execute();
        assert_eq!(ids(&response), vec![2, 3]);

        let response = QueryBuilder::new(&engine, "items", "*").range(3, 1).execute();
        assert!(response.data.is_empty());
    }

    #[test]
    fn test_single_shapes() {
        let engine = engine_with(json!([{"id": 1}, {"id": 2}]));

        let response = QueryBuilder::new(&engine, "items", "*").single().execute();
        assert_eq!(response.data.as_row().unwrap()["id"], 1);

        let response = QueryBuilder::new(&engine, "items", "*").eq("id", 9).single().execute();
        assert!(response.data.is_null());
        assert!(response.error.is_none());
    }

    #[test]
    fn test_unknown_column_yields_nothing() {
        let engine = engine_with(json!([{"id": 1}]));
        let response = QueryBuilder::new(&engine, "items", "*").eq("nope", 1).execute();
        assert!(response.data.is_empty());
        assert!(response.error.is_none());
    }

    #[test]
    fn test_strict_mode_errors() {
        let engine = engine_with(json!([{"id": 1}, {"id": 2}])).with_strict(true);

        let response = QueryBuilder::new(&engine, "items", "*").eq("nope", 1).execute();
        assert!(matches!(response.error, Some(EngineError::InvalidColumn { .. })));

        let response = QueryBuilder::new(&engine, "items", "*").single().execute();
        assert!(matches!(
            response.error,
            Some(EngineError::ShapeMismatch { rows: 2, .. })
        ));

        // maybe_single stays lenient
        let response = QueryBuilder::new(&engine, "items", "*").maybe_single();
        assert!(response.is_ok());
    }

    #[test]
    fn test_then_and_finally() {
        let engine = engine_with(json!([{"id": 1}]));

        let count = QueryBuilder::new(&engine, "items", "*")
            .then(|r| r.data.len())
            .into_inner();
        assert_eq!(count, 1);

        let mut finished = false;
        let response = QueryBuilder::new(&engine, "items", "*")
            .finally(|| finished = true)
            .into_inner();
        assert!(finished);
        assert!(response.is_ok());
    }
}
