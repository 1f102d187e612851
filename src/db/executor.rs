//! Statement execution on an open connection.
//!
//! # Architecture
//!
//! The executor uses database-specific implementations organized in submodules:
//! - `mysql`: MySQL and MariaDB
//! - `postgres`: PostgreSQL
//! - `sqlite`: SQLite
//! - `mssql`: SQL Server through tiberius
//!
//! Each submodule provides identical functionality adapted to its driver.
//! Oracle lives in `db::oracle` behind the `oracle` feature.
//!
//! Built statements (`BuiltQuery`) have their `?` placeholders rewritten to
//! the native syntax here. Raw SQL is passed to the driver untouched.

use crate::db::connection::DbConnection;
use crate::db::types::process_rows;
use crate::error::{DbError, DbResult};
use crate::models::{BindValue, BuiltQuery, RowSet};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Runs statements with a per-statement timeout.
#[derive(Debug, Clone, Copy)]
pub struct QueryExecutor {
    query_timeout: Duration,
}

impl QueryExecutor {
    pub fn new(query_timeout: Duration) -> Self {
        Self { query_timeout }
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Fetch rows for a built statement.
    pub async fn fetch_rows(&self, conn: &mut DbConnection, query: &BuiltQuery) -> DbResult<RowSet> {
        let sql = conn.native_placeholders(&query.sql);
        debug!(sql = %sql, params = query.params.len(), "Executing statement");
        self.fetch(conn, &sql, &query.params).await
    }

    /// Fetch rows for raw SQL. The text reaches the driver unchanged.
    pub async fn fetch_raw(&self, conn: &mut DbConnection, sql: &str) -> DbResult<RowSet> {
        self.fetch(conn, sql, &[]).await
    }

    /// Execute raw SQL for its update count.
    pub async fn execute_raw(&self, conn: &mut DbConnection, sql: &str) -> DbResult<u64> {
        let execute = async {
            match conn {
                DbConnection::Postgres(c) => postgres::execute(c, sql).await,
                DbConnection::MySql(c) => mysql::execute(c, sql).await,
                DbConnection::Sqlite(c) => sqlite::execute(c, sql).await,
                DbConnection::SqlServer(c) => mssql::execute(c, sql).await,
                #[cfg(feature = "oracle")]
                DbConnection::Oracle(session) => session.execute(sql).await,
            }
        };
        with_timeout(self.query_timeout, "write operation", execute).await
    }

    async fn fetch(
        &self,
        conn: &mut DbConnection,
        sql: &str,
        params: &[BindValue],
    ) -> DbResult<RowSet> {
        let fetch = async {
            match conn {
                DbConnection::Postgres(c) => postgres::fetch_rows(c, sql, params).await,
                DbConnection::MySql(c) => mysql::fetch_rows(c, sql, params).await,
                DbConnection::Sqlite(c) => sqlite::fetch_rows(c, sql, params).await,
                DbConnection::SqlServer(c) => mssql::fetch_rows(c, sql, params).await,
                #[cfg(feature = "oracle")]
                DbConnection::Oracle(session) => session.fetch_rows(sql, params).await,
            }
        };
        with_timeout(self.query_timeout, "query execution", fetch).await
    }
}

async fn with_timeout<T>(
    limit: Duration,
    operation: &str,
    future: impl Future<Output = DbResult<T>>,
) -> DbResult<T> {
    match timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(DbError::timeout(operation, limit.as_secs())),
    }
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================
//
// The sqlx modules below mirror each other. Without parameters the statement
// goes through the unprepared path: some servers refuse to prepare DDL.

mod mysql {
    use super::*;
    use sqlx::mysql::{MySqlArguments, MySqlConnection};

    pub async fn fetch_rows(
        conn: &mut MySqlConnection,
        sql: &str,
        params: &[BindValue],
    ) -> DbResult<RowSet> {
        let rows = if params.is_empty() {
            sqlx::Executor::fetch_all(&mut *conn, sql).await?
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_param(query, param);
            }
            query.fetch_all(&mut *conn).await?
        };
        Ok(process_rows(rows))
    }

    pub async fn execute(conn: &mut MySqlConnection, sql: &str) -> DbResult<u64> {
        let result = sqlx::Executor::execute(&mut *conn, sql).await?;
        Ok(result.rows_affected())
    }

    fn bind_param<'q>(
        query: sqlx::query::Query<'q, sqlx::MySql, MySqlArguments>,
        param: &'q BindValue,
    ) -> sqlx::query::Query<'q, sqlx::MySql, MySqlArguments> {
        match param {
            BindValue::Int(v) => query.bind(*v),
            BindValue::Text(v) => query.bind(v.as_str()),
        }
    }
}

mod postgres {
    use super::*;
    use sqlx::postgres::{PgArguments, PgConnection};

    pub async fn fetch_rows(
        conn: &mut PgConnection,
        sql: &str,
        params: &[BindValue],
    ) -> DbResult<RowSet> {
        let rows = if params.is_empty() {
            sqlx::Executor::fetch_all(&mut *conn, sql).await?
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_param(query, param);
            }
            query.fetch_all(&mut *conn).await?
        };
        Ok(process_rows(rows))
    }

    pub async fn execute(conn: &mut PgConnection, sql: &str) -> DbResult<u64> {
        let result = sqlx::Executor::execute(&mut *conn, sql).await?;
        Ok(result.rows_affected())
    }

    fn bind_param<'q>(
        query: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
        param: &'q BindValue,
    ) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
        match param {
            BindValue::Int(v) => query.bind(*v),
            BindValue::Text(v) => query.bind(v.as_str()),
        }
    }
}

mod sqlite {
    use super::*;
    use sqlx::sqlite::{SqliteArguments, SqliteConnection};

    pub async fn fetch_rows(
        conn: &mut SqliteConnection,
        sql: &str,
        params: &[BindValue],
    ) -> DbResult<RowSet> {
        let rows = if params.is_empty() {
            sqlx::Executor::fetch_all(&mut *conn, sql).await?
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_param(query, param);
            }
            query.fetch_all(&mut *conn).await?
        };
        Ok(process_rows(rows))
    }

    pub async fn execute(conn: &mut SqliteConnection, sql: &str) -> DbResult<u64> {
        let result = sqlx::Executor::execute(&mut *conn, sql).await?;
        Ok(result.rows_affected())
    }

    fn bind_param<'q>(
        query: sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>>,
        param: &'q BindValue,
    ) -> sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>> {
        match param {
            BindValue::Int(v) => query.bind(*v),
            BindValue::Text(v) => query.bind(v.as_str()),
        }
    }
}

mod mssql {
    use super::*;
    use crate::db::connection::SqlServerClient;
    use crate::db::types::mssql::{column_names, to_values};
    use tiberius::ToSql;

    pub async fn fetch_rows(
        client: &mut SqlServerClient,
        sql: &str,
        params: &[BindValue],
    ) -> DbResult<RowSet> {
        let bound: Vec<&dyn ToSql> = params
            .iter()
            .map(|param| match param {
                BindValue::Int(v) => v as &dyn ToSql,
                BindValue::Text(v) => v as &dyn ToSql,
            })
            .collect();

        let stream = if bound.is_empty() {
            client.simple_query(sql).await?
        } else {
            client.query(sql, &bound).await?
        };
        let rows = stream.into_first_result().await?;

        let columns = rows.first().map(column_names).unwrap_or_default();
        let values = rows.iter().map(to_values).collect();
        Ok(RowSet::new(columns, values))
    }

    pub async fn execute(client: &mut SqlServerClient, sql: &str) -> DbResult<u64> {
        let result = client.execute(sql, &[]).await?;
        Ok(result.total())
    }
}
