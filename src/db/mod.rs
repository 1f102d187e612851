//! Database access layer.
//!
//! This module provides:
//! - Per-request connections (`Connector`, `DbConnection`)
//! - Statement execution with timeouts
//! - Schema introspection
//! - Row decoding into JSON values

pub mod connection;
pub mod executor;
#[cfg(feature = "oracle")]
pub mod oracle;
pub mod schema;
pub mod types;

pub use connection::{Connector, DbConnection};
pub use executor::QueryExecutor;
pub use schema::SchemaInspector;
