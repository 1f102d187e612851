//! Data models for the SQL MCP Server.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod query;
pub mod schema;

// Re-export commonly used types
pub use connection::{ConnectionDescriptor, DatabaseFamily, mask_endpoint, strip_jdbc_prefix};
pub use query::{BindValue, BuiltQuery, ExecutionPlan, MAX_QUERY_LIMIT, MutationSummary, RowSet};
pub use schema::{ColumnDescriptor, Nullability, TableDescriptor};
