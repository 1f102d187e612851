//! SQL MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools for AI assistants
//! to inspect and query one SQL database (PostgreSQL, MySQL/MariaDB, SQLite,
//! SQL Server, Oracle).

use sql_mcp_server::config::{Config, TransportMode};
use sql_mcp_server::db::Connector;
use sql_mcp_server::mcp::Dispatcher;
use sql_mcp_server::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs always go to stderr: stdout belongs to the stdio transport.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse_args();

    init_tracing(&config);

    let descriptor = match config.descriptor() {
        Ok(descriptor) => descriptor,
        Err(e) => {
            error!(error = %e, "Invalid database configuration");
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("Usage: sql-mcp-server --database-url <url> [--username <user>] [--password <pass>]");
            eprintln!();
            eprintln!("Examples:");
            eprintln!("  sql-mcp-server --database-url sqlite:data.db");
            eprintln!("  sql-mcp-server --database-url postgres://localhost:5432/app --username app");
            eprintln!("  sql-mcp-server --database-url jdbc:sqlserver://db:1433;databaseName=app");
            std::process::exit(1);
        }
    };

    info!(
        transport = %config.transport,
        family = %descriptor.family(),
        endpoint = %descriptor.masked_endpoint(),
        read_only = descriptor.read_only(),
        "Starting SQL MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let connector = Arc::new(Connector::new(
        descriptor,
        config.connect_timeout_duration(),
        config.query_timeout_duration(),
    ));

    if let Err(e) = connector.check().await {
        error!(error = %e, suggestion = ?e.suggestion(), "Database connection check failed");
        std::process::exit(1);
    }

    let dispatcher = Arc::new(Dispatcher::new(connector));

    // Run the appropriate transport
    let result = match config.transport {
        TransportMode::Stdio => {
            info!("Using stdio transport");
            let transport = StdioTransport::new(dispatcher);
            transport.run().await
        }
        TransportMode::Http => {
            info!(
                host = %config.http_host,
                port = config.http_port,
                "Using HTTP transport"
            );
            let transport = HttpTransport::new(dispatcher, &config.http_host, config.http_port);
            transport.run().await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
