//! # Filter Expressions
//!
//! Row predicates for the query builder and the mutation verbs.
//!
//! Coercion rule: when the stored value is a number, a string operand
//! is parsed as a number before comparing (`"2"` matches `2`). Every
//! other combination compares exactly.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::sorter::collate;
use crate::store::Row;

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Equals
    Eq,
    /// Not equals
    Neq,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// Pattern match (`%` any run, `_` one char)
    Like,
    /// Case-insensitive pattern match
    Ilike,
    /// Value in list
    In,
    /// Is null / is not null / is true / is false
    Is,
}

impl FilterOperator {
    /// Get the operator string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Like => "like",
            FilterOperator::Ilike => "ilike",
            FilterOperator::In => "in",
            FilterOperator::Is => "is",
        }
    }

    /// Parse an operator name
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "eq" => FilterOperator::Eq,
            "neq" => FilterOperator::Neq,
            "gt" => FilterOperator::Gt,
            "gte" => FilterOperator::Gte,
            "lt" => FilterOperator::Lt,
            "lte" => FilterOperator::Lte,
            "like" => FilterOperator::Like,
            "ilike" => FilterOperator::Ilike,
            "in" => FilterOperator::In,
            "is" => FilterOperator::Is,
            _ => return None,
        })
    }
}

/// A filter expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterExpr {
    /// Column to filter on
    pub field: String,

    /// Comparison operator
    pub operator: FilterOperator,

    /// Value to compare against
    pub value: Value,
}

impl FilterExpr {
    /// Create a new filter expression
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Create an equality filter
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }

    /// Create an "in list" filter
    pub fn in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, FilterOperator::In, Value::Array(values))
    }

    /// Check if a row matches this filter
    pub fn matches(&self, row: &Row) -> bool {
        let stored = match row.get(&self.field) {
            Some(v) => v,
            // A missing column only satisfies `is null`
            None => return self.operator == FilterOperator::Is && self.value.is_null(),
        };

        match self.operator {
            FilterOperator::Eq => values_equal(stored, &self.value),
            FilterOperator::Neq => !values_equal(stored, &self.value),
            FilterOperator::Gt => compare_operand(stored, &self.value) == Some(Ordering::Greater),
            FilterOperator::Gte => matches!(
                compare_operand(stored, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOperator::Lt => compare_operand(stored, &self.value) == Some(Ordering::Less),
            FilterOperator::Lte => matches!(
                compare_operand(stored, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOperator::Like => match (stored.as_str(), self.value.as_str()) {
                (Some(text), Some(pattern)) => like_match(text, pattern),
                _ => false,
            },
            FilterOperator::Ilike => match (stored.as_str(), self.value.as_str()) {
                (Some(text), Some(pattern)) => {
                    like_match(&text.to_lowercase(), &pattern.to_lowercase())
                }
                _ => false,
            },
            FilterOperator::In => match self.value.as_array() {
                Some(candidates) => candidates.iter().any(|c| values_equal(stored, c)),
                None => values_equal(stored, &self.value),
            },
            FilterOperator::Is => stored == &self.value,
        }
    }
}

/// Equality under the coercion rule
pub fn values_equal(stored: &Value, given: &Value) -> bool {
    match (stored, given) {
        (Value::Number(_), Value::Number(_) | Value::String(_)) => {
            match (stored.as_f64(), as_number(given)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        }
        _ => stored == given,
    }
}

/// Ordering under the coercion rule; `None` for incomparable values
fn compare_operand(stored: &Value, given: &Value) -> Option<Ordering> {
    match (stored, given) {
        (Value::Number(a), _) => a.as_f64()?.partial_cmp(&as_number(given)?),
        (Value::String(a), Value::String(b)) => Some(collate(a, b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Numeric view of an operand: numbers as-is, strings parsed
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// SQL LIKE matching over chars
fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    like_match_chars(&text, &pattern)
}

fn like_match_chars(text: &[char], pattern: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('%', rest)) => (0..=text.len()).any(|i| like_match_chars(&text[i..], rest)),
        Some(('_', rest)) => !text.is_empty() && like_match_chars(&text[1..], rest),
        Some((c, rest)) => text.first() == Some(c) && like_match_chars(&text[1..], rest),
    }
}
