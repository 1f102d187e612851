//! Schema introspection.
//!
//! Catalog SQL lives in `sql::dialect`. This module only opens the
//! connection, runs the statements the builder produces and normalizes the
//! results. Each call uses one connection and closes it before returning.

use crate::db::connection::{Connector, DbConnection};
use crate::error::DbResult;
use crate::models::TableDescriptor;
use crate::sql::dialect::SchemaListing;
use crate::sql::{QueryBuilder, normalize};
use std::sync::Arc;
use tracing::debug;

/// Schema inspector for database introspection.
#[derive(Debug, Clone)]
pub struct SchemaInspector {
    connector: Arc<Connector>,
    builder: QueryBuilder,
}

impl SchemaInspector {
    pub fn new(connector: Arc<Connector>) -> Self {
        let builder = QueryBuilder::new(connector.family());
        Self { connector, builder }
    }

    /// List the schemas visible to the connected user, system schemas removed.
    pub async fn list_schemas(&self) -> DbResult<Vec<String>> {
        let (sql, keep) = match self.builder.schema_listing() {
            SchemaListing::Fixed(names) => {
                return Ok(names.iter().map(|name| name.to_string()).collect());
            }
            SchemaListing::Catalog { sql, keep } => (sql, keep),
        };

        let mut conn = self.connector.open().await?;
        let result = self.connector.executor().fetch_raw(&mut conn, sql).await;
        conn.close().await;

        let schemas = normalize::schema_names(result?, keep);
        debug!(count = schemas.len(), "Listed schemas");
        Ok(schemas)
    }

    /// List the base tables in `schema`.
    pub async fn list_tables(&self, schema: &str) -> DbResult<Vec<String>> {
        let query = self.builder.list_tables(schema);

        let mut conn = self.connector.open().await?;
        let result = self.connector.executor().fetch_rows(&mut conn, &query).await;
        conn.close().await;

        let tables = normalize::names(result?);
        debug!(schema, count = tables.len(), "Listed tables");
        Ok(tables)
    }

    /// Describe the columns of `schema.table`, primary keys flagged.
    ///
    /// An unknown table yields an empty column list.
    pub async fn describe_table(&self, schema: &str, table: &str) -> DbResult<TableDescriptor> {
        let mut conn = self.connector.open().await?;
        let result = self.describe_on(&mut conn, schema, table).await;
        conn.close().await;
        result
    }

    async fn describe_on(
        &self,
        conn: &mut DbConnection,
        schema: &str,
        table: &str,
    ) -> DbResult<TableDescriptor> {
        let executor = self.connector.executor();
        let columns = executor
            .fetch_rows(conn, &self.builder.columns(schema, table))
            .await?;
        let keys = executor
            .fetch_rows(conn, &self.builder.primary_keys(schema, table))
            .await?;

        let primary_keys = normalize::primary_keys(keys);
        let columns = normalize::columns(columns, &primary_keys);
        debug!(schema, table, columns = columns.len(), "Described table");

        Ok(TableDescriptor {
            schema: schema.to_string(),
            table: table.to_string(),
            columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConnectionDescriptor;
    use std::time::Duration;
    use tempfile::TempDir;

    async fn seeded_inspector(dir: &TempDir) -> SchemaInspector {
        let path = dir.path().join("inspect.db");
        let url = format!("sqlite:{}", path.display());
        let descriptor = ConnectionDescriptor::new(&url, None, None, false).unwrap();
        let connector = Arc::new(Connector::new(
            descriptor,
            Duration::from_secs(5),
            Duration::from_secs(5),
        ));

        let mut conn = connector.open().await.unwrap();
        connector
            .executor()
            .execute_raw(
                &mut conn,
                "CREATE TABLE users (id INTEGER PRIMARY KEY, email VARCHAR(255) NOT NULL, bio TEXT)",
            )
            .await
            .unwrap();
        connector
            .executor()
            .execute_raw(&mut conn, "CREATE VIEW user_emails AS SELECT email FROM users")
            .await
            .unwrap();
        conn.close().await;

        SchemaInspector::new(connector)
    }

    #[tokio::test]
    async fn test_sqlite_schemas_are_fixed() {
        let dir = TempDir::new().unwrap();
        let inspector = seeded_inspector(&dir).await;
        assert_eq!(inspector.list_schemas().await.unwrap(), vec!["main"]);
    }

    #[tokio::test]
    async fn test_list_tables_excludes_views() {
        let dir = TempDir::new().unwrap();
        let inspector = seeded_inspector(&dir).await;
        assert_eq!(inspector.list_tables("main").await.unwrap(), vec!["users"]);
    }

    #[tokio::test]
    async fn test_describe_table() {
        let dir = TempDir::new().unwrap();
        let inspector = seeded_inspector(&dir).await;
        let table = inspector.describe_table("main", "users").await.unwrap();

        assert_eq!(table.schema, "main");
        assert_eq!(table.table, "users");
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "email", "bio"]);

        assert!(table.columns[0].primary_key);
        assert!(!table.columns[1].primary_key);
        assert!(!table.columns[1].nullable);
        assert!(table.columns[2].nullable);
        assert_eq!(table.columns[1].size, Some(255));
    }

    #[tokio::test]
    async fn test_describe_unknown_table_is_empty() {
        let dir = TempDir::new().unwrap();
        let inspector = seeded_inspector(&dir).await;
        let table = inspector.describe_table("main", "nope").await.unwrap();
        assert!(table.columns.is_empty());
    }
}
