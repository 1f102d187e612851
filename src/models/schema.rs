//! Schema-related data models.
//!
//! These are presentation types: produced by the metadata normalizer and
//! serialized straight into tool results.

use serde::Serialize;

/// Nullability as reported by a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    Nullable,
    NoNulls,
    Unknown,
}

impl Nullability {
    /// Interpret a catalog nullability code (`YES`/`NO` or Oracle's `Y`/`N`).
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "YES" | "Y" => Self::Nullable,
            "NO" | "N" => Self::NoNulls,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub name: String,
    /// Dialect-native type name, as the catalog reports it.
    #[serde(rename = "type")]
    pub type_name: String,
    pub size: Option<i64>,
    pub nullable: bool,
    pub primary_key: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            size: None,
            nullable: false,
            primary_key: false,
        }
    }

    pub fn with_size(mut self, size: Option<i64>) -> Self {
        self.size = size;
        self
    }

    /// Only `Nullability::Nullable` marks the column nullable.
    pub fn with_nullability(mut self, nullability: Nullability) -> Self {
        self.nullable = nullability == Nullability::Nullable;
        self
    }

    pub fn with_primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescriptor {
    pub schema: String,
    pub table: String,
    pub columns: Vec<ColumnDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullability_codes() {
        assert_eq!(Nullability::from_code("YES"), Nullability::Nullable);
        assert_eq!(Nullability::from_code("y"), Nullability::Nullable);
        assert_eq!(Nullability::from_code("NO"), Nullability::NoNulls);
        assert_eq!(Nullability::from_code("N"), Nullability::NoNulls);
        assert_eq!(Nullability::from_code(""), Nullability::Unknown);
        assert_eq!(Nullability::from_code("maybe"), Nullability::Unknown);
    }

    #[test]
    fn test_unknown_nullability_is_not_nullable() {
        let col = ColumnDescriptor::new("id", "int4").with_nullability(Nullability::Unknown);
        assert!(!col.nullable);
    }

    #[test]
    fn test_column_serializes_camel_case() {
        let col = ColumnDescriptor::new("id", "int4")
            .with_size(Some(32))
            .with_nullability(Nullability::NoNulls)
            .with_primary_key(true);
        let json = serde_json::to_value(&col).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "id",
                "type": "int4",
                "size": 32,
                "nullable": false,
                "primaryKey": true
            })
        );
    }
}
