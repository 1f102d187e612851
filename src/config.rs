//! Configuration handling for the SQL MCP Server.
//!
//! Every setting comes from a CLI argument or its environment variable.

use crate::db::connection::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_QUERY_TIMEOUT_SECS};
use crate::error::DbResult;
use crate::models::ConnectionDescriptor;
use clap::{ArgAction, Parser, ValueEnum};
use std::time::Duration;

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// HTTP with Server-Sent Events (for web clients)
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// SQL MCP Server configuration.
#[derive(Parser, Clone)]
#[command(name = "sql-mcp-server")]
#[command(version, about = "MCP server for SQL database introspection and querying")]
pub struct Config {
    /// Database connection URL (postgres://, mysql://, mariadb://, sqlite:,
    /// sqlserver://, oracle://, or their jdbc: forms)
    #[arg(long, env = "MCP_DATABASE_URL")]
    pub database_url: String,

    /// Database username, overrides any user in the URL
    #[arg(long, env = "MCP_DB_USERNAME")]
    pub username: Option<String>,

    /// Database password, overrides any password in the URL
    #[arg(long, env = "MCP_DB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Transport mode (stdio or http)
    #[arg(
        short,
        long,
        value_enum,
        default_value = "stdio",
        env = "MCP_TRANSPORT"
    )]
    pub transport: TransportMode,

    /// HTTP host to bind to (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_HTTP_HOST,
        env = "MCP_HTTP_HOST"
    )]
    pub http_host: String,

    /// HTTP port to bind to (only used with http transport)
    #[arg(
        long,
        default_value_t = DEFAULT_HTTP_PORT,
        env = "MCP_HTTP_PORT"
    )]
    pub http_port: u16,

    /// Restrict execute_query to SELECT statements
    #[arg(
        long,
        default_value_t = true,
        action = ArgAction::Set,
        env = "MCP_READ_ONLY"
    )]
    pub read_only: bool,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        env = "MCP_CONNECT_TIMEOUT"
    )]
    pub connect_timeout: u64,

    /// Query timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_QUERY_TIMEOUT_SECS,
        env = "MCP_QUERY_TIMEOUT"
    )]
    pub query_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &crate::models::mask_endpoint(&self.database_url))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("transport", &self.transport)
            .field("http_host", &self.http_host)
            .field("http_port", &self.http_port)
            .field("read_only", &self.read_only)
            .field("connect_timeout", &self.connect_timeout)
            .field("query_timeout", &self.query_timeout)
            .field("log_level", &self.log_level)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Build the connection descriptor. Fails on an unsupported endpoint.
    pub fn descriptor(&self) -> DbResult<ConnectionDescriptor> {
        ConnectionDescriptor::new(
            self.database_url.trim(),
            self.username.clone(),
            self.password.clone(),
            self.read_only,
        )
    }

    /// Get the HTTP bind address.
    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Get the query timeout as a Duration.
    pub fn query_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.query_timeout)
    }

    /// Get the connection timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}
