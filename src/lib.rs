//! SQL MCP Server Library
//!
//! Exposes relational database introspection and querying as MCP tools
//! (`list_schemas`, `list_tables`, `get_table_structure`, `query_table`,
//! `execute_query`) over stdio or HTTP with Server-Sent Events.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod sql;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::DbError;
pub use mcp::Dispatcher;
