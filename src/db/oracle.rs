//! Oracle sessions through the blocking `oracle` crate.
//!
//! ODPI-C calls block, so every call runs on the blocking thread pool.

use crate::db::types::{decode_binary_value, float_value};
use crate::error::{DbError, DbResult};
use crate::models::{BindValue, RowSet};
use oracle::sql_type::{OracleType, ToSql};
use oracle::{Connection, SqlValue};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tokio::task::spawn_blocking;

/// One open Oracle connection.
pub struct OracleSession {
    conn: Arc<Connection>,
}

impl OracleSession {
    pub async fn connect(
        connect_string: String,
        username: String,
        password: String,
    ) -> DbResult<Self> {
        let conn = blocking(move || {
            Connection::connect(username, password, connect_string).map_err(|e| {
                DbError::connection(
                    format!("Failed to connect: {}", e),
                    "Verify the connection URL format: jdbc:oracle:thin:@host:1521/service",
                )
            })
        })
        .await?;
        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    pub async fn fetch_rows(&self, sql: &str, params: &[BindValue]) -> DbResult<RowSet> {
        let conn = Arc::clone(&self.conn);
        let sql = sql.to_string();
        let params = params.to_vec();

        blocking(move || {
            let bound: Vec<&dyn ToSql> = params
                .iter()
                .map(|param| match param {
                    BindValue::Int(v) => v as &dyn ToSql,
                    BindValue::Text(v) => v as &dyn ToSql,
                })
                .collect();

            let result = conn.query(&sql, &bound)?;
            let columns: Vec<String> = result
                .column_info()
                .iter()
                .map(|c| c.name().to_string())
                .collect();

            let mut rows = Vec::new();
            for row in result {
                let row = row?;
                rows.push(row.sql_values().iter().map(decode_value).collect());
            }
            // An empty result reports no columns, like the other drivers.
            let columns = if rows.is_empty() { Vec::new() } else { columns };
            Ok(RowSet::new(columns, rows))
        })
        .await
    }

    pub async fn execute(&self, sql: &str) -> DbResult<u64> {
        let conn = Arc::clone(&self.conn);
        let sql = sql.to_string();

        blocking(move || {
            let stmt = conn.execute(&sql, &[])?;
            let affected = stmt.row_count()?;
            conn.commit()?;
            Ok(affected)
        })
        .await
    }

    pub async fn close(self) -> DbResult<()> {
        let conn = self.conn;
        blocking(move || conn.close().map_err(DbError::from)).await
    }
}

async fn blocking<T, F>(f: F) -> DbResult<T>
where
    F: FnOnce() -> DbResult<T> + Send + 'static,
    T: Send + 'static,
{
    spawn_blocking(f)
        .await
        .map_err(|e| DbError::internal(format!("Oracle worker failed: {}", e)))?
}

fn decode_value(value: &SqlValue) -> JsonValue {
    if value.is_null().unwrap_or(true) {
        return JsonValue::Null;
    }

    match value.oracle_type() {
        Ok(OracleType::Number(_, _)) | Ok(OracleType::Int64) => {
            let text = value.get::<String>().unwrap_or_default();
            match text.parse::<i64>() {
                Ok(v) => JsonValue::Number(v.into()),
                Err(_) => JsonValue::String(text),
            }
        }
        Ok(OracleType::BinaryFloat) | Ok(OracleType::BinaryDouble) | Ok(OracleType::Float(_)) => {
            value
                .get::<f64>()
                .map(float_value)
                .unwrap_or(JsonValue::Null)
        }
        Ok(OracleType::Raw(_)) | Ok(OracleType::LongRaw) | Ok(OracleType::BLOB) => value
            .get::<Vec<u8>>()
            .map(|bytes| decode_binary_value(&bytes))
            .unwrap_or(JsonValue::Null),
        _ => value
            .get::<String>()
            .map(JsonValue::String)
            .unwrap_or(JsonValue::Null),
    }
}
