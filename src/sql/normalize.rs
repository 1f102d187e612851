//! Turns raw catalog and query row sets into tool results.

use crate::models::{ColumnDescriptor, Nullability, RowSet};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;

/// First column of every row as a string. NULLs are skipped.
pub fn names(rows: RowSet) -> Vec<String> {
    rows.rows
        .into_iter()
        .filter_map(|row| row.into_iter().next())
        .filter_map(|value| text(&value))
        .collect()
}

/// Schema names kept by the family's filter.
pub fn schema_names(rows: RowSet, keep: fn(&str) -> bool) -> Vec<String> {
    names(rows).into_iter().filter(|name| keep(name)).collect()
}

/// Primary key column names, compared case-sensitively.
pub fn primary_keys(rows: RowSet) -> HashSet<String> {
    names(rows).into_iter().collect()
}

/// Merge a (name, type, size, nullability) row set with the primary key set.
///
/// Size falls back to the first number in the declared type, so SQLite's
/// `VARCHAR(255)` reports 255.
pub fn columns(rows: RowSet, primary_keys: &HashSet<String>) -> Vec<ColumnDescriptor> {
    rows.rows
        .into_iter()
        .filter_map(|row| {
            let name = row.first().and_then(text)?;
            let type_name = row.get(1).and_then(text).unwrap_or_default();
            let size = row
                .get(2)
                .and_then(integer)
                .or_else(|| declared_size(&type_name));
            let nullability = row
                .get(3)
                .and_then(text)
                .map(|code| Nullability::from_code(&code))
                .unwrap_or(Nullability::Unknown);
            let is_key = primary_keys.contains(&name);

            Some(
                ColumnDescriptor::new(name, type_name)
                    .with_size(size)
                    .with_nullability(nullability)
                    .with_primary_key(is_key),
            )
        })
        .collect()
}

/// Rows as ordered column → value maps. NULL stays as an explicit `null`.
pub fn records(rows: RowSet) -> Vec<Map<String, JsonValue>> {
    let RowSet { columns, rows } = rows;
    rows.into_iter()
        .map(|values| columns.iter().cloned().zip(values).collect())
        .collect()
}

/// First run of digits in a declared type such as `VARCHAR(255)`.
pub fn declared_size(type_name: &str) -> Option<i64> {
    let start = type_name.find(|c: char| c.is_ascii_digit())?;
    let digits: String = type_name[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn integer(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
