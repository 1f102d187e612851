//! Schema and table name validation.
//!
//! Names accepted here are interpolated into SQL text (quoted), so the
//! accepted alphabet is deliberately small: ASCII letters, digits,
//! underscore and hyphen.

use crate::error::ValidationError;
use std::fmt;

/// Substrings that are rejected before the format check runs.
const FORBIDDEN_SEQUENCES: &[&str] = &[";", "--", "/*", "*/", "'", "\"", "=", "<", ">"];

/// Which identifier is being validated. Only used in error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Schema,
    Table,
}

impl IdentifierKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Schema => "Schema name",
            Self::Table => "Table name",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Validate an identifier and return it unchanged.
///
/// Checks run in order: emptiness, forbidden sequences, then the
/// `[A-Za-z0-9_-]+` alphabet over the whole string. Only the emptiness
/// check ignores surrounding whitespace. The first failing check decides
/// the error.
pub fn validate_identifier(name: &str, kind: IdentifierKind) -> Result<&str, ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyIdentifier { kind });
    }

    if FORBIDDEN_SEQUENCES.iter().any(|seq| name.contains(seq)) {
        return Err(ValidationError::ForbiddenCharacter { kind });
    }

    if !name.chars().all(is_identifier_char) {
        return Err(ValidationError::InvalidFormat { kind });
    }

    Ok(name)
}

/// Validate a table name.
pub fn validate_table_name(name: &str) -> Result<&str, ValidationError> {
    validate_identifier(name, IdentifierKind::Table)
}

/// Validate a schema name.
pub fn validate_schema_name(name: &str) -> Result<&str, ValidationError> {
    validate_identifier(name, IdentifierKind::Schema)
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}
