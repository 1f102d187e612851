//! Query-related data models.
//!
//! This module defines the statements handed to a connection and the raw
//! row sets coming back from it.

use serde::Serialize;
use serde_json::Value as JsonValue;

/// Maximum row limit accepted by `query_table`.
pub const MAX_QUERY_LIMIT: i64 = 10_000;

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Int(i64),
    Text(String),
}

impl From<i64> for BindValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for BindValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// SQL text plus the values for its placeholders, in order.
///
/// Placeholders are written as `?` regardless of dialect; the executor
/// rewrites them to the native form just before binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl BuiltQuery {
    pub fn new(sql: impl Into<String>, params: Vec<BindValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// A statement with no placeholders.
    pub fn unbound(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }
}

/// Column names plus row values in select order. `NULL` is `JsonValue::Null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<JsonValue>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<JsonValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// How an authorized raw statement is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPlan {
    /// Fetch rows.
    Select,
    /// Run for its update count.
    Mutation,
}

/// Synthetic single row returned for a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationSummary {
    pub affected_rows: u64,
    pub message: String,
}

impl MutationSummary {
    pub fn new(affected_rows: u64) -> Self {
        Self {
            affected_rows,
            message: "Query executed successfully".to_string(),
        }
    }
}
