//! MCP tool implementations.
//!
//! - `definitions`: the static tool catalog for `tools/list`
//! - `schema`: `list_schemas`, `list_tables`, `get_table_structure`
//! - `query`: `query_table`, `execute_query`

pub mod definitions;
pub mod query;
pub mod schema;

pub use definitions::{ToolDefinition, ToolName, tool_definitions};
pub use query::{ExecuteQueryInput, ExecuteQueryOutput, QueryTableInput, QueryToolHandler};
pub use schema::{ListTablesInput, SchemaToolHandler, TableStructureInput};
