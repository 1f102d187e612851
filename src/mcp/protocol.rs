//! JSON-RPC envelope types.

use crate::error::DbError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// JSON-RPC version constant.
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol version reported by `initialize`.
pub const MCP_VERSION: &str = "2024-11-05";

/// Error code carried by every failure.
pub const INTERNAL_ERROR: i32 = -32603;

/// Inbound request. `jsonrpc` is accepted but not checked; `id` may be any
/// JSON value and is echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: Some(JSONRPC_VERSION.to_string()),
            method: method.into(),
            params: None,
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }
}

/// Outbound envelope: exactly one of `result` and `error` is set. `id` is
/// always serialized, as `null` when the request carried none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.unwrap_or(Value::Null),
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.unwrap_or(Value::Null),
            result: None,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: INTERNAL_ERROR,
            message: message.into(),
            data: None,
        }
    }
}

impl From<&DbError> for JsonRpcError {
    fn from(err: &DbError) -> Self {
        let mut error = Self::internal(err.to_string());
        if let Some(suggestion) = err.suggestion() {
            error.data = Some(json!({ "suggestion": suggestion }));
        }
        error
    }
}

/// `params` of a `tools/call` request.
#[derive(Debug, Clone, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_without_optional_fields() {
        let request: JsonRpcRequest = serde_json::from_str(r#"{"method":"tools/list"}"#).unwrap();
        assert_eq!(request.method, "tools/list");
        assert!(request.id.is_none());
        assert!(request.params.is_none());
    }

    #[test]
    fn test_response_id_is_always_present() {
        let response = JsonRpcResponse::success(None, json!({}));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({"jsonrpc": "2.0", "id": null, "result": {}}));
    }

    #[test]
    fn test_error_envelope_shape() {
        let err = DbError::unknown_tool("nope");
        let response = JsonRpcResponse::error(Some(json!("abc")), (&err).into());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "jsonrpc": "2.0",
                "id": "abc",
                "error": {"code": -32603, "message": "Unknown tool: nope"}
            })
        );
    }

    #[test]
    fn test_suggestion_goes_into_data() {
        let err = DbError::connection("refused", "Check the server");
        let error = JsonRpcError::from(&err);
        assert_eq!(error.data, Some(json!({"suggestion": "Check the server"})));
    }

    #[test]
    fn test_call_tool_params_default_arguments() {
        let params: CallToolParams = serde_json::from_value(json!({"name": "list_schemas"})).unwrap();
        assert_eq!(params.name, "list_schemas");
        assert!(params.arguments.is_null());
    }
}
