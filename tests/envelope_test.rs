//! JSON-RPC envelope wire format.

use serde_json::{Value, json};
use sql_mcp_server::mcp::{Dispatcher, JsonRpcError, JsonRpcRequest, JsonRpcResponse};

#[test]
fn test_id_is_echoed_verbatim() {
    for id in [json!(1), json!("abc-123"), json!(1.5), Value::Null] {
        let response = JsonRpcResponse::success(Some(id.clone()), json!({}));
        let wire = serde_json::to_value(&response).unwrap();
        assert_eq!(wire["id"], id);
        assert_eq!(wire["jsonrpc"], "2.0");
    }
}

#[test]
fn test_missing_id_serializes_as_null() {
    let response = JsonRpcResponse::error(None, JsonRpcError::internal("boom"));
    let wire = serde_json::to_string(&response).unwrap();
    assert_eq!(
        wire,
        r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"boom"}}"#
    );
}

#[test]
fn test_exactly_one_of_result_and_error() {
    let ok = serde_json::to_value(JsonRpcResponse::success(Some(json!(1)), json!([]))).unwrap();
    assert!(ok.get("result").is_some());
    assert!(ok.get("error").is_none());

    let err = serde_json::to_value(JsonRpcResponse::error(
        Some(json!(1)),
        JsonRpcError::internal("nope"),
    ))
    .unwrap();
    assert!(err.get("result").is_none());
    assert!(err.get("error").is_some());
}

#[test]
fn test_response_survives_the_wire() {
    let response = JsonRpcResponse::success(
        Some(json!("req-7")),
        json!({ "content": [{ "type": "text", "text": "[\"main\"]" }] }),
    );
    let wire = serde_json::to_string(&response).unwrap();
    let decoded: JsonRpcResponse = serde_json::from_str(&wire).unwrap();
    assert_eq!(decoded, response);
}

#[test]
fn test_decode_requests() {
    let request = Dispatcher::decode(
        r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"list_schemas"}}"#,
    )
    .unwrap();
    assert_eq!(request.method, "tools/call");
    assert_eq!(request.id, Some(json!(3)));
    assert_eq!(request.params.unwrap()["name"], "list_schemas");

    // jsonrpc and id are optional on input
    let request = Dispatcher::decode(r#"{"method":"initialize"}"#).unwrap();
    assert_eq!(request.id, None);
    assert_eq!(request.jsonrpc, None);
}

#[test]
fn test_decode_failures_recover_id() {
    let response = Dispatcher::decode(r#"{"id":"abc","method":42}"#).unwrap_err();
    assert_eq!(response.id, json!("abc"));
    assert_eq!(response.error.as_ref().unwrap().code, -32603);

    let response = Dispatcher::decode("[1, 2").unwrap_err();
    assert_eq!(response.id, Value::Null);
}

#[test]
fn test_request_builder() {
    let request = JsonRpcRequest::new("tools/list").with_id(5);
    let wire = serde_json::to_value(&request).unwrap();
    assert_eq!(wire["method"], "tools/list");
    assert_eq!(wire["id"], 5);
}
