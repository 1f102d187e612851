//! HTTP transport with Server-Sent Events for the MCP server.
//!
//! - `POST /mcp`: one JSON-RPC request in, its response out. The response
//!   is also broadcast to every open event stream.
//! - `GET /mcp`: event stream of broadcast responses (`event: message`).
//! - `GET /health`: liveness and connected client count.

use crate::error::{DbError, DbResult};
use crate::mcp::{Dispatcher, JsonRpcResponse, SERVER_NAME};
use crate::transport::subscribers::SubscriberRegistry;
use crate::transport::{Transport, wait_for_signal};
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use futures_util::Stream;
use futures_util::stream;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub subscribers: Arc<SubscriberRegistry>,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            subscribers: Arc::new(SubscriberRegistry::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub server: &'static str,
    pub version: &'static str,
    pub connected_clients: usize,
}

/// HTTP transport implementation.
pub struct HttpTransport {
    dispatcher: Arc<Dispatcher>,
    /// Host to bind to
    host: String,
    /// Port to bind to
    port: u16,
}

impl HttpTransport {
    pub fn new(dispatcher: Arc<Dispatcher>, host: impl Into<String>, port: u16) -> Self {
        Self {
            dispatcher,
            host: host.into(),
            port,
        }
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Build the router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/mcp", post(handle_post).get(handle_sse))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// `POST /mcp`. An undecodable body is answered with status 500.
pub async fn handle_post(State(state): State<AppState>, body: String) -> Response {
    let request = match Dispatcher::decode(&body) {
        Ok(request) => request,
        Err(response) => return (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response(),
    };

    let response = state.dispatcher.dispatch(request).await;
    broadcast_response(&state.subscribers, &response);
    Json(response).into_response()
}

/// `GET /mcp`. The stream lives until the client goes away or the registry is cleared.
pub async fn handle_sse(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.subscribers.subscribe();

    let events = stream::unfold(subscription, |mut subscription| async move {
        let message = subscription.recv().await?;
        let event = Event::default().event("message").data(message);
        Some((Ok(event), subscription))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// `GET /health`.
pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        server: SERVER_NAME,
        version: env!("CARGO_PKG_VERSION"),
        connected_clients: state.subscribers.len(),
    })
}

fn broadcast_response(subscribers: &SubscriberRegistry, response: &JsonRpcResponse) {
    if subscribers.is_empty() {
        return;
    }
    match serde_json::to_string(response) {
        Ok(message) => {
            let delivered = subscribers.broadcast(&message);
            debug!(delivered, "Broadcast response to SSE clients");
        }
        Err(e) => warn!(error = %e, "Failed to encode response for broadcast"),
    }
}

impl Transport for HttpTransport {
    async fn run(&self) -> DbResult<()> {
        let bind_addr = self.bind_addr();
        info!("Starting MCP server with HTTP transport on {}", bind_addr);

        let state = AppState::new(Arc::clone(&self.dispatcher));
        let subscribers = Arc::clone(&state.subscribers);
        let app = router(state);

        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            DbError::connection(
                format!("Failed to bind to {}: {}", bind_addr, e),
                "Check that the port is available",
            )
        })?;

        info!("MCP endpoint ready at http://{}/mcp", bind_addr);

        // Open event streams would keep the server alive, so they are closed
        // as soon as the signal arrives and a timeout bounds the rest.
        const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(30);

        let shutdown_notify = Arc::new(tokio::sync::Notify::new());
        let shutdown_notify_clone = shutdown_notify.clone();
        let shutdown_subscribers = Arc::clone(&subscribers);

        let shutdown_signal = async move {
            wait_for_signal().await;
            shutdown_subscribers.clear();
            shutdown_notify_clone.notify_one();
        };

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal);

        tokio::select! {
            result = server => {
                match result {
                    Ok(()) => info!("HTTP server stopped"),
                    Err(e) => {
                        error!(error = %e, "HTTP server error");
                        return Err(DbError::internal(format!("HTTP server error: {}", e)));
                    }
                }
            }
            _ = async {
                shutdown_notify.notified().await;
                info!(
                    timeout_secs = GRACEFUL_TIMEOUT.as_secs(),
                    "Waiting for connections to close (send signal again to force exit)..."
                );

                tokio::select! {
                    _ = tokio::time::sleep(GRACEFUL_TIMEOUT) => {
                        warn!("Graceful shutdown timeout, forcing exit");
                    }
                    _ = wait_for_signal() => {
                        warn!("Received second signal, forcing immediate exit");
                    }
                }
            } => {}
        }

        subscribers.clear();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
