//! # Query Parameter Parser
//!
//! Parses PostgREST-style `key=value` pairs into a builder chain.
//!
//! ```text
//! select=id_questao,enunciado
//! id_prova=eq.1
//! order=nr_questao.asc
//! limit=10
//! ```

use serde_json::Value;
use thiserror::Error;

use super::builder::{OrderOptions, QueryBuilder};
use super::filter::{FilterExpr, FilterOperator};

/// Parameter parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryParamError {
    #[error("Invalid query parameter: {0}")]
    InvalidParam(String),

    #[error("Invalid filter on '{field}': {reason}")]
    InvalidFilter { field: String, reason: String },
}

impl QueryParamError {
    pub fn code(&self) -> &'static str {
        match self {
            QueryParamError::InvalidParam(_) => "MOCK_INVALID_PARAM",
            QueryParamError::InvalidFilter { .. } => "MOCK_INVALID_FILTER",
        }
    }
}

pub type QueryParamResult<T> = Result<T, QueryParamError>;

/// Parsed query parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    /// Column list (`*` when absent)
    pub select: Option<String>,

    /// Filters, in input order
    pub filters: Vec<FilterExpr>,

    /// Sort keys, primary first
    pub order: Vec<OrderBy>,

    pub limit: Option<usize>,

    pub offset: usize,
}

/// One `order` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub ascending: bool,
}

impl QueryParams {
    /// Parses parameters in the order given
    pub fn parse<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> QueryParamResult<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut result = QueryParams::default();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "select" => result.select = Some(parse_select(value)?),
                "order" => result.order.extend(parse_order(value)?),
                "limit" => result.limit = Some(parse_count("limit", value)?),
                "offset" => result.offset = parse_count("offset", value)?,
                _ => result.filters.push(parse_filter(key, value)?),
            }
        }

        Ok(result)
    }

    /// Column list to pass to `select`
    pub fn columns(&self) -> &str {
        self.select.as_deref().unwrap_or("*")
    }

    /// Applies filters, then sort keys, then the window.
    ///
    /// Sort keys run last-to-first: each `order` call re-sorts stably,
    /// so the first listed key ends up primary.
    pub fn apply<'a>(&self, mut builder: QueryBuilder<'a>) -> QueryBuilder<'a> {
        for filter in &self.filters {
            builder = builder.filter(filter.clone());
        }

        for order in self.order.iter().rev() {
            builder = builder.order(&order.field, OrderOptions { ascending: order.ascending });
        }

        match (self.offset, self.limit) {
            (0, None) => builder,
            (0, Some(limit)) => builder.limit(limit),
            (offset, Some(0)) => builder.range(offset, 0),
            (offset, Some(limit)) => builder.range(offset, offset.saturating_add(limit - 1)),
            (offset, None) => builder.range(offset, usize::MAX),
        }
    }
}

fn parse_select(value: &str) -> QueryParamResult<String> {
    let fields: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if fields.is_empty() {
        return Err(QueryParamError::InvalidParam(
            "select cannot be empty".to_string(),
        ));
    }

    Ok(fields.join(","))
}

/// `field.direction` list; direction defaults to ascending
fn parse_order(value: &str) -> QueryParamResult<Vec<OrderBy>> {
    let mut orders = Vec::new();

    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (field, ascending) = match part.rsplit_once('.') {
            Some((field, direction)) => {
                let ascending = match direction.to_lowercase().as_str() {
                    "asc" => true,
                    "desc" => false,
                    _ => {
                        return Err(QueryParamError::InvalidParam(format!(
                            "Invalid order direction: {}",
                            direction
                        )))
                    }
                };
                (field, ascending)
            }
            None => (part, true),
        };

        orders.push(OrderBy {
            field: field.to_string(),
            ascending,
        });
    }

    Ok(orders)
}

fn parse_count(name: &str, value: &str) -> QueryParamResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| QueryParamError::InvalidParam(format!("Invalid {}: {}", name, value)))
}

/// `field=op.value`; a value without a known operator means `eq`
fn parse_filter(field: &str, value: &str) -> QueryParamResult<FilterExpr> {
    let (operator, operand) = match value.split_once('.') {
        Some((op, rest)) => match FilterOperator::parse(op) {
            Some(op) => (op, rest),
            None => (FilterOperator::Eq, value),
        },
        None => (FilterOperator::Eq, value),
    };

    let parsed = match operator {
        FilterOperator::In => parse_list(field, operand)?,
        FilterOperator::Is => match operand {
            "null" => Value::Null,
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => {
                return Err(QueryParamError::InvalidFilter {
                    field: field.to_string(),
                    reason: format!("is expects null, true or false, got '{}'", other),
                })
            }
        },
        FilterOperator::Like | FilterOperator::Ilike => {
            Value::String(operand.replace('*', "%"))
        }
        _ => parse_scalar(operand),
    };

    Ok(FilterExpr::new(field, operator, parsed))
}

/// `(a,b,c)`
fn parse_list(field: &str, operand: &str) -> QueryParamResult<Value> {
    let inner = operand
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| QueryParamError::InvalidFilter {
            field: field.to_string(),
            reason: format!("in expects (a,b,...), got '{}'", operand),
        })?;

    Ok(Value::Array(
        inner
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_scalar)
            .collect(),
    ))
}

fn parse_scalar(value: &str) -> Value {
    match value {
        "null" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if let Ok(n) = value.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Some(num) = value.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
        return Value::Number(num);
    }

    Value::String(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_order() {
        let orders = parse_order("ano.desc,descricao").unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].field, "ano");
        assert!(!orders[0].ascending);
        assert_eq!(orders[1].field, "descricao");
        assert!(orders[1].ascending);

        assert!(parse_order("ano.sideways").is_err());
    }

    #[test]
    fn test_parse_filter() {
        let filter = parse_filter("ano", "gt.2021").unwrap();
        assert_eq!(filter.operator, FilterOperator::Gt);
        assert_eq!(filter.value, json!(2021));

        let filter = parse_filter("nome_tema", "Matematica").unwrap();
        assert_eq!(filter.operator, FilterOperator::Eq);
        assert_eq!(filter.value, json!("Matematica"));

        let filter = parse_filter("descricao", "ilike.*dia").unwrap();
        assert_eq!(filter.value, json!("%dia"));
    }

    #[test]
    fn test_parse_in_and_is() {
        let filter = parse_filter("id_questao", "in.(1,2,3)").unwrap();
        assert_eq!(filter.operator, FilterOperator::In);
        assert_eq!(filter.value, json!([1, 2, 3]));

        let filter = parse_filter("nr_questao", "is.null").unwrap();
        assert_eq!(filter.value, Value::Null);

        assert!(matches!(
            parse_filter("id_questao", "in.1,2"),
            Err(QueryParamError::InvalidFilter { .. })
        ));
        assert!(parse_filter("x", "is.maybe").is_err());
    }

    #[test]
    fn test_full_query_params() {
        let query = QueryParams::parse([
            ("select", "id_prova,ano"),
            ("order", "ano.desc"),
            ("limit", "2"),
            ("offset", "1"),
            ("ano", "gte.2021"),
        ])
        .unwrap();

        assert_eq!(query.columns(), "id_prova,ano");
        assert_eq!(query.order.len(), 1);
        assert_eq!(query.limit, Some(2));
        assert_eq!(query.offset, 1);
        assert_eq!(query.filters.len(), 1);
    }

    #[test]
    fn test_huge_offset_yields_empty_window() {
        use crate::core::Engine;
        use crate::store::TableStore;
        use std::sync::Arc;

        let store = TableStore::new();
        store
            .with_table("items", |rows| {
                rows.push(json!({"id": 1}).as_object().cloned().unwrap());
            })
            .unwrap();
        let engine = Engine::new(Arc::new(store));

        let offset = usize::MAX.to_string();
        let query = QueryParams::parse([("offset", offset.as_str()), ("limit", "2")]).unwrap();
        let response = query.apply(QueryBuilder::new(&engine, "items", "*")).execute();
        assert!(response.data.is_empty());
        assert!(response.error.is_none());
    }

    #[test]
    fn test_bad_counts() {
        let err = QueryParams::parse([("limit", "many")]).unwrap_err();
        assert_eq!(err.code(), "MOCK_INVALID_PARAM");
        assert!(QueryParams::parse([("select", " , ")]).is_err());
    }
}
