//! Schema introspection tools.
//!
//! This module implements the `list_schemas`, `list_tables` and
//! `get_table_structure` tools.

use crate::db::{Connector, SchemaInspector};
use crate::error::DbResult;
use crate::models::TableDescriptor;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Input for the list_tables tool.
#[derive(Debug, Clone, Deserialize)]
pub struct ListTablesInput {
    /// Schema to list
    pub schema: String,
}

/// Input for the get_table_structure tool.
#[derive(Debug, Clone, Deserialize)]
pub struct TableStructureInput {
    pub schema: String,
    pub table: String,
}

pub struct SchemaToolHandler {
    inspector: SchemaInspector,
}

impl SchemaToolHandler {
    pub fn new(connector: Arc<Connector>) -> Self {
        Self {
            inspector: SchemaInspector::new(connector),
        }
    }

    pub async fn list_schemas(&self) -> DbResult<Vec<String>> {
        let schemas = self.inspector.list_schemas().await?;
        info!(count = schemas.len(), "Listed schemas");
        Ok(schemas)
    }

    /// Names are bound into the catalog query, never interpolated, so they
    /// are not passed through identifier validation.
    pub async fn list_tables(&self, input: ListTablesInput) -> DbResult<Vec<String>> {
        let tables = self.inspector.list_tables(&input.schema).await?;
        info!(schema = %input.schema, count = tables.len(), "Listed tables");
        Ok(tables)
    }

    pub async fn get_table_structure(
        &self,
        input: TableStructureInput,
    ) -> DbResult<TableDescriptor> {
        let table = self
            .inspector
            .describe_table(&input.schema, &input.table)
            .await?;

        info!(
            schema = %input.schema,
            table = %input.table,
            columns = table.columns.len(),
            "Described table"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_structure_input_requires_both_names() {
        let input: TableStructureInput =
            serde_json::from_str(r#"{"schema": "public", "table": "users"}"#).unwrap();
        assert_eq!(input.schema, "public");
        assert_eq!(input.table, "users");

        assert!(serde_json::from_str::<TableStructureInput>(r#"{"schema": "public"}"#).is_err());
    }

    #[test]
    fn test_list_tables_input_requires_schema() {
        assert!(serde_json::from_str::<ListTablesInput>("{}").is_err());
    }
}
