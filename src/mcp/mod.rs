//! MCP protocol layer.
//!
//! `protocol` holds the JSON-RPC envelopes, `dispatcher` routes methods to
//! the tool handlers. Transports only move raw messages in and out.

pub mod dispatcher;
pub mod protocol;

pub use dispatcher::{Dispatcher, SERVER_NAME};
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
