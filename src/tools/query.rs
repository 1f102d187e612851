//! Row-fetching tools: `query_table` and `execute_query`.

use crate::db::Connector;
use crate::error::DbResult;
use crate::models::{ExecutionPlan, MutationSummary};
use crate::sql::{QueryBuilder, authorize, normalize};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use tracing::{info, warn};

/// One result row, columns in select-list order.
pub type Record = Map<String, JsonValue>;

/// Input for the query_table tool.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryTableInput {
    pub schema: String,
    pub table: String,
    /// Maximum rows to return. Zero or absent means no limit.
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Input for the execute_query tool.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteQueryInput {
    pub sql: String,
}

/// Output of execute_query: the selected rows, or a single summary row
/// for statements run for their update count.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExecuteQueryOutput {
    Rows(Vec<Record>),
    Mutation(Vec<MutationSummary>),
}

/// Handler for query execution.
pub struct QueryToolHandler {
    connector: Arc<Connector>,
    builder: QueryBuilder,
}

impl QueryToolHandler {
    pub fn new(connector: Arc<Connector>) -> Self {
        let builder = QueryBuilder::new(connector.family());
        Self { connector, builder }
    }

    /// Fetch rows from `schema.table`. Identifiers are validated and quoted
    /// before any connection is opened.
    pub async fn query_table(&self, input: QueryTableInput) -> DbResult<Vec<Record>> {
        let query = self
            .builder
            .table_query(Some(&input.schema), &input.table, input.limit)?;

        let mut conn = self.connector.open().await?;
        let result = self.connector.executor().fetch_rows(&mut conn, &query).await;
        conn.close().await;

        let rows = normalize::records(result?);
        info!(
            schema = %input.schema,
            table = %input.table,
            limit = ?input.limit,
            row_count = rows.len(),
            "Queried table"
        );
        Ok(rows)
    }

    /// Run caller-supplied SQL after the guard accepts it.
    pub async fn execute_query(&self, input: ExecuteQueryInput) -> DbResult<ExecuteQueryOutput> {
        let read_only = self.connector.read_only();
        let plan = authorize(&input.sql, read_only)?;

        warn!(read_only, sql = %input.sql, "Executing raw SQL query");

        let executor = self.connector.executor();
        let mut conn = self.connector.open().await?;
        let output = match plan {
            ExecutionPlan::Select => executor
                .fetch_raw(&mut conn, &input.sql)
                .await
                .map(|rows| ExecuteQueryOutput::Rows(normalize::records(rows))),
            ExecutionPlan::Mutation => executor
                .execute_raw(&mut conn, &input.sql)
                .await
                .map(|affected| ExecuteQueryOutput::Mutation(vec![MutationSummary::new(affected)])),
        };
        conn.close().await;

        let output = output?;
        match &output {
            ExecuteQueryOutput::Rows(rows) => {
                info!(row_count = rows.len(), "Raw query executed")
            }
            ExecuteQueryOutput::Mutation(summary) => {
                info!(affected_rows = summary[0].affected_rows, "Raw statement executed")
            }
        }
        Ok(output)
    }
}
