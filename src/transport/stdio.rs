//! Stdio transport for the MCP server.
//!
//! One JSON request per line on stdin, one JSON response per line on stdout.
//! Logging goes to stderr so stdout only ever carries protocol traffic.

use crate::error::{DbError, DbResult};
use crate::mcp::{Dispatcher, JsonRpcError, JsonRpcResponse};
use crate::transport::{Transport, wait_for_signal};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

/// Stdio transport implementation.
pub struct StdioTransport {
    dispatcher: Arc<Dispatcher>,
}

impl StdioTransport {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> DbResult<()> {
        info!("Starting MCP server with stdio transport");

        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();

        tokio::select! {
            result = serve_lines(&self.dispatcher, stdin, stdout) => {
                result?;
                info!("Stdin closed, stdio transport completed");
            }
            _ = wait_for_signal() => {
                // A pending stdin read cannot be interrupted, so waiting for the
                // runtime to shut down could hang.
                info!("Shutdown signal received, exiting");
                std::process::exit(0);
            }
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

/// Answer each non-blank line of `reader` with one line on `writer`, until
/// end of input. Malformed lines, including ones that are not UTF-8, get an
/// error envelope; they never stop the loop.
pub async fn serve_lines<R, W>(dispatcher: &Dispatcher, mut reader: R, mut writer: W) -> DbResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await.map_err(io_error)? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                debug!(bytes = line.len(), "Received request line");
                dispatcher.handle_raw(line).await
            }
            Err(e) => {
                warn!(error = %e, "Request line is not valid UTF-8");
                JsonRpcResponse::error(
                    None,
                    JsonRpcError::internal(format!("Request is not valid UTF-8: {}", e)),
                )
            }
        };

        let mut out = serde_json::to_vec(&response)
            .map_err(|e| DbError::internal(format!("Failed to encode response: {}", e)))?;
        out.push(b'\n');

        writer.write_all(&out).await.map_err(io_error)?;
        writer.flush().await.map_err(io_error)?;
    }

    Ok(())
}

fn io_error(e: std::io::Error) -> DbError {
    DbError::internal(format!("Stdio transport error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Connector;
    use crate::models::ConnectionDescriptor;
    use serde_json::Value;
    use std::time::Duration;

    fn dispatcher() -> Dispatcher {
        let descriptor = ConnectionDescriptor::new("sqlite::memory:", None, None, true).unwrap();
        Dispatcher::new(Arc::new(Connector::new(
            descriptor,
            Duration::from_secs(5),
            Duration::from_secs(5),
        )))
    }

    #[tokio::test]
    async fn test_one_response_per_line() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#,
            "\n\n",
            "garbage\n",
            r#"{"jsonrpc":"2.0","id":"x","method":"tools/list"}"#,
            "\n",
        );
        let mut output = Vec::new();
        serve_lines(&dispatcher(), input.as_bytes(), &mut output)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        let responses: Vec<Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], 1);
        assert!(responses[0]["result"].is_object());
        assert_eq!(responses[1]["error"]["code"], -32603);
        assert_eq!(responses[2]["id"], "x");
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_gets_error_and_loop_continues() {
        let mut input = Vec::new();
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#);
        input.extend_from_slice(b"\n\xff\xfe\n");
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#);
        // Last line has no trailing newline.

        let mut output = Vec::new();
        serve_lines(&dispatcher(), input.as_slice(), &mut output)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        let responses: Vec<Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["id"], Value::Null);
        assert_eq!(responses[1]["error"]["code"], -32603);
        assert_eq!(responses[2]["id"], 2);
        assert!(responses[2]["result"]["tools"].is_array());
    }

    #[test]
    fn test_stdio_transport_name() {
        let transport = StdioTransport::new(Arc::new(dispatcher()));
        assert_eq!(transport.name(), "stdio");
    }
}
