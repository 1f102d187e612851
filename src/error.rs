//! Error types for the SQL MCP Server.
//!
//! Validation, limit and guard failures have their own enums so the SQL
//! engine can be used (and tested) without the protocol layer. `DbError`
//! wraps them transparently, which keeps their messages intact on the wire.

use crate::sql::identifier::IdentifierKind;
use thiserror::Error;

/// Rejected schema or table identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{kind} cannot be null or empty")]
    EmptyIdentifier { kind: IdentifierKind },

    #[error("Invalid {kind}: contains forbidden characters")]
    ForbiddenCharacter { kind: IdentifierKind },

    #[error("Invalid {kind}: must contain only alphanumeric characters, underscores, or hyphens")]
    InvalidFormat { kind: IdentifierKind },
}

/// Row limit outside the accepted range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LimitError {
    #[error("Limit cannot be negative")]
    LimitOutOfRange { limit: i64 },

    #[error("Limit cannot exceed {max} rows")]
    LimitTooLarge { limit: i64, max: i64 },
}

/// Raw SQL rejected before reaching the database.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("SQL query cannot be null or empty")]
    EmptyStatement,

    #[error("Multiple statements are not allowed")]
    MultipleStatements,

    #[error("Only SELECT queries are allowed")]
    WriteNotAllowed,
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Limit(#[from] LimitError),

    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error("Unsupported database type in connection URL: {endpoint}")]
    UnsupportedDialect { endpoint: String },

    #[error("Unknown method: {method}")]
    UnknownMethod { method: String },

    #[error("Unknown tool: {tool}")]
    UnknownTool { tool: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Driver failure, message passed through untouched.
    #[error("{message}")]
    Driver {
        message: String,
        sql_state: Option<String>,
    },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Timeout: {operation} exceeded {elapsed_secs}s")]
    Timeout {
        operation: String,
        elapsed_secs: u64,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create an unsupported dialect error. Pass a masked endpoint.
    pub fn unsupported_dialect(endpoint: impl Into<String>) -> Self {
        Self::UnsupportedDialect {
            endpoint: endpoint.into(),
        }
    }

    pub fn unknown_method(method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            method: method.into(),
        }
    }

    pub fn unknown_tool(tool: impl Into<String>) -> Self {
        Self::UnknownTool { tool: tool.into() }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a driver error with optional SQL state.
    pub fn driver(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Driver {
            message: message.into(),
            sql_state,
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, elapsed_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_secs,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Timeout { .. } => {
                Some("Consider increasing the timeout or optimizing the operation")
            }
            _ => None,
        }
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::connection(
                msg.to_string(),
                "Check the connection URL format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::driver(db_err.message(), code)
            }
            sqlx::Error::Io(io_err) => DbError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => DbError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            other => DbError::driver(other.to_string(), None),
        }
    }
}

impl From<tiberius::error::Error> for DbError {
    fn from(err: tiberius::error::Error) -> Self {
        DbError::driver(err.to_string(), None)
    }
}

#[cfg(feature = "oracle")]
impl From<oracle::Error> for DbError {
    fn from(err: oracle::Error) -> Self {
        DbError::driver(err.to_string(), None)
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_name_the_identifier() {
        let err = ValidationError::EmptyIdentifier {
            kind: IdentifierKind::Table,
        };
        assert_eq!(err.to_string(), "Table name cannot be null or empty");

        let err = ValidationError::ForbiddenCharacter {
            kind: IdentifierKind::Schema,
        };
        assert_eq!(
            err.to_string(),
            "Invalid Schema name: contains forbidden characters"
        );
    }

    #[test]
    fn test_wrapped_errors_keep_their_message() {
        let err: DbError = LimitError::LimitTooLarge {
            limit: 20_000,
            max: 10_000,
        }
        .into();
        assert_eq!(err.to_string(), "Limit cannot exceed 10000 rows");

        let err: DbError = GuardError::MultipleStatements.into();
        assert_eq!(err.to_string(), "Multiple statements are not allowed");
    }

    #[test]
    fn test_protocol_error_messages() {
        assert_eq!(
            DbError::unknown_method("foo/bar").to_string(),
            "Unknown method: foo/bar"
        );
        assert_eq!(
            DbError::unknown_tool("drop_everything").to_string(),
            "Unknown tool: drop_everything"
        );
    }

    #[test]
    fn test_driver_message_passthrough() {
        let err = DbError::driver("relation \"nope\" does not exist", Some("42P01".into()));
        assert_eq!(err.to_string(), "relation \"nope\" does not exist");
        assert!(err.suggestion().is_none());
    }

    #[test]
    fn test_error_suggestion() {
        let err = DbError::connection("Failed to connect", "Check credentials");
        assert!(err.to_string().contains("Connection failed"));
        assert_eq!(err.suggestion(), Some("Check credentials"));
        assert!(DbError::timeout("query", 30).suggestion().is_some());
    }
}
