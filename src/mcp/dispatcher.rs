//! Method routing and envelope shaping.
//!
//! The dispatcher is the only place a `DbError` becomes a wire error: every
//! request, decodable or not, produces exactly one `JsonRpcResponse`.

use crate::db::Connector;
use crate::error::{DbError, DbResult};
use crate::mcp::protocol::{CallToolParams, JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_VERSION};
use crate::tools::definitions::{ToolDefinition, ToolName, tool_definitions};
use crate::tools::{QueryToolHandler, SchemaToolHandler};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Server name reported by `initialize` and `/health`.
pub const SERVER_NAME: &str = "sql-mcp-server";

pub struct Dispatcher {
    schema_tools: SchemaToolHandler,
    query_tools: QueryToolHandler,
    tools: Vec<ToolDefinition>,
}

impl Dispatcher {
    pub fn new(connector: Arc<Connector>) -> Self {
        let tools = tool_definitions(connector.read_only());
        Self {
            schema_tools: SchemaToolHandler::new(Arc::clone(&connector)),
            query_tools: QueryToolHandler::new(connector),
            tools,
        }
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Decode one raw message. A message that is not a valid request yields
    /// the error envelope to send back instead, echoing `id` when it can be
    /// recovered from otherwise-valid JSON.
    pub fn decode(raw: &str) -> Result<JsonRpcRequest, JsonRpcResponse> {
        serde_json::from_str::<JsonRpcRequest>(raw).map_err(|e| {
            let id = serde_json::from_str::<Value>(raw)
                .ok()
                .and_then(|value| value.get("id").cloned());
            error!(error = %e, "Failed to decode request");
            JsonRpcResponse::error(id, JsonRpcError::internal(e.to_string()))
        })
    }

    /// Decode and dispatch a raw message.
    pub async fn handle_raw(&self, raw: &str) -> JsonRpcResponse {
        match Self::decode(raw) {
            Ok(request) => self.dispatch(request).await,
            Err(response) => response,
        }
    }

    #[instrument(skip(self, request), fields(method = %request.method))]
    pub async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Dispatching request");

        match self.route(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(e) => {
                error!(error = %e, "Request failed");
                JsonRpcResponse::error(request.id, JsonRpcError::from(&e))
            }
        }
    }

    async fn route(&self, method: &str, params: Option<Value>) -> DbResult<Value> {
        match method {
            "initialize" => Ok(initialize_result()),
            "tools/list" => Ok(json!({ "tools": self.tools })),
            "tools/call" => {
                let params: CallToolParams = parse_params(params.unwrap_or(Value::Null))?;
                let payload = self.call_tool(params).await?;
                let text = serde_json::to_string(&payload)
                    .map_err(|e| DbError::internal(e.to_string()))?;
                Ok(json!({ "content": [{ "type": "text", "text": text }] }))
            }
            other => Err(DbError::unknown_method(other)),
        }
    }

    async fn call_tool(&self, params: CallToolParams) -> DbResult<Value> {
        let tool: ToolName = params
            .name
            .parse()
            .map_err(|_| DbError::unknown_tool(&params.name))?;
        debug!(tool = %tool, "Calling tool");

        let arguments = params.arguments;
        match tool {
            ToolName::ListSchemas => to_payload(self.schema_tools.list_schemas().await?),
            ToolName::ListTables => {
                to_payload(self.schema_tools.list_tables(parse_params(arguments)?).await?)
            }
            ToolName::GetTableStructure => to_payload(
                self.schema_tools
                    .get_table_structure(parse_params(arguments)?)
                    .await?,
            ),
            ToolName::QueryTable => {
                to_payload(self.query_tools.query_table(parse_params(arguments)?).await?)
            }
            ToolName::ExecuteQuery => {
                to_payload(self.query_tools.execute_query(parse_params(arguments)?).await?)
            }
        }
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": MCP_VERSION,
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
        "capabilities": {
            "tools": {},
        },
    })
}

fn parse_params<T: DeserializeOwned>(value: Value) -> DbResult<T> {
    serde_json::from_value(value).map_err(|e| DbError::invalid_input(e.to_string()))
}

fn to_payload<T: Serialize>(value: T) -> DbResult<Value> {
    serde_json::to_value(value).map_err(|e| DbError::internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConnectionDescriptor;
    use std::time::Duration;

    fn dispatcher(read_only: bool) -> Dispatcher {
        let descriptor =
            ConnectionDescriptor::new("sqlite::memory:", None, None, read_only).unwrap();
        Dispatcher::new(Arc::new(Connector::new(
            descriptor,
            Duration::from_secs(5),
            Duration::from_secs(5),
        )))
    }

    #[tokio::test]
    async fn test_initialize() {
        let response = dispatcher(true)
            .dispatch(JsonRpcRequest::new("initialize").with_id(1))
            .await;
        let result = response.result.unwrap();
        assert_eq!(response.id, json!(1));
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert_eq!(result["capabilities"], json!({"tools": {}}));
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = dispatcher(false)
            .dispatch(JsonRpcRequest::new("tools/list").with_id("a"))
            .await;
        let tools = response.result.unwrap()["tools"].clone();
        assert_eq!(tools.as_array().unwrap().len(), 5);
        assert_eq!(tools[4]["description"], "Execute a custom SQL query");
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = dispatcher(true)
            .dispatch(JsonRpcRequest::new("resources/list").with_id(7))
            .await;
        let error = response.error.unwrap();
        assert_eq!(error.code, -32603);
        assert_eq!(error.message, "Unknown method: resources/list");
        assert_eq!(response.id, json!(7));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let response = dispatcher(true)
            .dispatch(
                JsonRpcRequest::new("tools/call")
                    .with_id(2)
                    .with_params(json!({"name": "drop_database", "arguments": {}})),
            )
            .await;
        assert_eq!(response.error.unwrap().message, "Unknown tool: drop_database");
    }

    #[tokio::test]
    async fn test_missing_arguments_are_invalid_input() {
        let response = dispatcher(true)
            .dispatch(
                JsonRpcRequest::new("tools/call")
                    .with_id(3)
                    .with_params(json!({"name": "list_tables"})),
            )
            .await;
        assert!(response.error.unwrap().message.starts_with("Invalid input"));
    }

    #[tokio::test]
    async fn test_list_schemas_content_is_text() {
        let response = dispatcher(true)
            .dispatch(
                JsonRpcRequest::new("tools/call")
                    .with_id(4)
                    .with_params(json!({"name": "list_schemas"})),
            )
            .await;
        let result = response.result.unwrap();
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], "[\"main\"]");
    }

    #[tokio::test]
    async fn test_malformed_message() {
        let response = dispatcher(true).handle_raw("{not json").await;
        assert!(response.is_error());
        assert_eq!(response.id, Value::Null);

        let response = dispatcher(true).handle_raw(r#"{"id": 9}"#).await;
        assert!(response.is_error());
        assert_eq!(response.id, json!(9));
    }
}
