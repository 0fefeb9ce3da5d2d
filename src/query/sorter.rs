//! Row ordering for the query builder
//!
//! Sorting is stable, so calling `order` twice leaves the last column
//! as the primary key.

use std::cmp::Ordering;

use serde_json::Value;

use crate::store::Row;

/// Sorts rows by one column
pub struct RowSorter;

impl RowSorter {
    /// Sorts rows in place.
    ///
    /// Missing and null values rank smallest, so they lead ascending
    /// results and trail descending ones.
    pub fn sort(rows: &mut [Row], column: &str, ascending: bool) {
        rows.sort_by(|a, b| {
            let ordering = compare_values(a.get(column), b.get(column));
            if ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
    }
}

/// Compares two optional JSON values for sorting.
///
/// Ordering rules:
/// - missing = null < bool < number < string < array < object
/// - For same types, natural ordering; strings are collated
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a_val), Some(b_val)) => {
            let a_type = type_order(a_val);
            let b_type = type_order(b_val);

            if a_type != b_type {
                return a_type.cmp(&b_type);
            }

            match (a_val, b_val) {
                (Value::Bool(a_b), Value::Bool(b_b)) => a_b.cmp(b_b),
                (Value::Number(a_n), Value::Number(b_n)) => {
                    let a_f = a_n.as_f64().unwrap_or(0.0);
                    let b_f = b_n.as_f64().unwrap_or(0.0);
                    a_f.partial_cmp(&b_f).unwrap_or(Ordering::Equal)
                }
                (Value::String(a_s), Value::String(b_s)) => collate(a_s, b_s),
                // Arrays and objects not compared
                _ => Ordering::Equal,
            }
        }
    }
}

fn type_order(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Locale-style string comparison.
///
/// Primary key: case- and accent-folded text. Ties are broken per
/// character with lowercase before uppercase, then by code point.
pub fn collate(a: &str, b: &str) -> Ordering {
    let primary = a.chars().flat_map(fold).cmp(b.chars().flat_map(fold));
    if primary != Ordering::Equal {
        return primary;
    }
    a.chars()
        .map(|c| (c.is_uppercase(), c))
        .cmp(b.chars().map(|c| (c.is_uppercase(), c)))
}

/// Lowercases a char and strips Latin diacritics
fn fold(c: char) -> impl Iterator<Item = char> {
    c.to_lowercase().map(|l| match l {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    })
}
