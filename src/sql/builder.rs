//! Builds the statements the tools run.
//!
//! Table queries interpolate validated, quoted identifiers. Catalog lookups
//! never interpolate: schema and table names are always bound.

use crate::error::{DbResult, LimitError};
use crate::models::{BindValue, BuiltQuery, DatabaseFamily, MAX_QUERY_LIMIT};
use crate::sql::dialect::SchemaListing;
use crate::sql::identifier::{validate_schema_name, validate_table_name};

#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    family: DatabaseFamily,
}

impl QueryBuilder {
    pub fn new(family: DatabaseFamily) -> Self {
        Self { family }
    }

    pub fn family(&self) -> DatabaseFamily {
        self.family
    }

    /// Build `SELECT * FROM <schema>.<table>` with optional pagination.
    ///
    /// A blank schema is treated as absent. A limit of zero means no limit;
    /// negative limits and limits above `MAX_QUERY_LIMIT` are rejected.
    pub fn table_query(
        &self,
        schema: Option<&str>,
        table: &str,
        limit: Option<i64>,
    ) -> DbResult<BuiltQuery> {
        let qualified = self.qualified_name(schema, table)?;
        let base_sql = format!("SELECT * FROM {qualified}");

        let Some(limit) = limit else {
            return Ok(BuiltQuery::unbound(base_sql));
        };
        check_limit(limit)?;

        let (sql, params) = self.family.pagination(limit).apply(base_sql);
        Ok(BuiltQuery::new(sql, params))
    }

    /// Validate and quote `schema.table`, or just `table` when no schema is given.
    pub fn qualified_name(&self, schema: Option<&str>, table: &str) -> DbResult<String> {
        let table = validate_table_name(table)?;
        let quoted_table = self.family.quote_identifier(table);

        match schema.filter(|s| !s.trim().is_empty()) {
            Some(schema) => {
                let schema = validate_schema_name(schema)?;
                Ok(format!(
                    "{}.{}",
                    self.family.quote_identifier(schema),
                    quoted_table
                ))
            }
            None => Ok(quoted_table),
        }
    }

    pub fn schema_listing(&self) -> SchemaListing {
        self.family.schema_listing()
    }

    pub fn list_tables(&self, schema: &str) -> BuiltQuery {
        let params = if self.family.binds_schema_in_catalog() {
            vec![BindValue::from(schema)]
        } else {
            Vec::new()
        };
        BuiltQuery::new(self.family.tables_query(), params)
    }

    pub fn columns(&self, schema: &str, table: &str) -> BuiltQuery {
        BuiltQuery::new(self.family.columns_query(), self.catalog_params(schema, table))
    }

    pub fn primary_keys(&self, schema: &str, table: &str) -> BuiltQuery {
        BuiltQuery::new(
            self.family.primary_keys_query(),
            self.catalog_params(schema, table),
        )
    }

    fn catalog_params(&self, schema: &str, table: &str) -> Vec<BindValue> {
        if self.family.binds_schema_in_catalog() {
            vec![BindValue::from(schema), BindValue::from(table)]
        } else {
            vec![BindValue::from(table)]
        }
    }
}

fn check_limit(limit: i64) -> Result<(), LimitError> {
    if limit < 0 {
        return Err(LimitError::LimitOutOfRange { limit });
    }
    if limit > MAX_QUERY_LIMIT {
        return Err(LimitError::LimitTooLarge {
            limit,
            max: MAX_QUERY_LIMIT,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DbError, ValidationError};
    use crate::sql::identifier::IdentifierKind;

    #[test]
    fn test_postgres_paginated_query() {
        let query = QueryBuilder::new(DatabaseFamily::Postgres)
            .table_query(Some("sales"), "orders", Some(50))
            .unwrap();
        assert_eq!(query.sql, "SELECT * FROM \"sales\".\"orders\" LIMIT ?");
        assert_eq!(query.params, vec![BindValue::Int(50)]);
    }

    #[test]
    fn test_zero_limit_means_unlimited() {
        let query = QueryBuilder::new(DatabaseFamily::Postgres)
            .table_query(None, "orders", Some(0))
            .unwrap();
        assert_eq!(query.sql, "SELECT * FROM \"orders\"");
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_blank_schema_is_ignored() {
        let query = QueryBuilder::new(DatabaseFamily::Sqlite)
            .table_query(Some("   "), "orders", None)
            .unwrap();
        assert_eq!(query.sql, "SELECT * FROM \"orders\"");
    }

    #[test]
    fn test_padded_names_are_rejected() {
        let builder = QueryBuilder::new(DatabaseFamily::Postgres);
        assert!(matches!(
            builder.table_query(Some("sales "), "orders", Some(5)),
            Err(DbError::Validation(ValidationError::InvalidFormat {
                kind: IdentifierKind::Schema
            }))
        ));
        assert!(matches!(
            builder.table_query(Some("sales"), "orders\n", Some(5)),
            Err(DbError::Validation(ValidationError::InvalidFormat {
                kind: IdentifierKind::Table
            }))
        ));
    }

    #[test]
    fn test_sqlserver_top_clause() {
        let query = QueryBuilder::new(DatabaseFamily::SqlServer)
            .table_query(Some("dbo"), "Users", Some(10))
            .unwrap();
        assert_eq!(query.sql, "SELECT TOP 10 * FROM [dbo].[Users]");
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_oracle_rownum() {
        let query = QueryBuilder::new(DatabaseFamily::Oracle)
            .table_query(Some("HR"), "EMPLOYEES", Some(5))
            .unwrap();
        assert_eq!(
            query.sql,
            "SELECT * FROM \"HR\".\"EMPLOYEES\" WHERE ROWNUM <= ?"
        );
        assert_eq!(query.params, vec![BindValue::Int(5)]);
    }

    #[test]
    fn test_mysql_limit_is_ignored() {
        let query = QueryBuilder::new(DatabaseFamily::MySql)
            .table_query(Some("shop"), "orders", Some(25))
            .unwrap();
        assert_eq!(query.sql, "SELECT * FROM `shop`.`orders`");
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_limit_bounds() {
        let builder = QueryBuilder::new(DatabaseFamily::Postgres);
        assert!(matches!(
            builder.table_query(Some("s"), "t", Some(20_000)),
            Err(DbError::Limit(LimitError::LimitTooLarge { .. }))
        ));
        assert!(matches!(
            builder.table_query(Some("s"), "t", Some(-1)),
            Err(DbError::Limit(LimitError::LimitOutOfRange { .. }))
        ));
        assert!(builder.table_query(Some("s"), "t", Some(10_000)).is_ok());
    }

    #[test]
    fn test_table_is_validated_before_schema() {
        let err = QueryBuilder::new(DatabaseFamily::Postgres)
            .table_query(Some("bad;schema"), "", None)
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::EmptyIdentifier {
                kind: IdentifierKind::Table
            })
        ));
    }

    #[test]
    fn test_catalog_lookups_bind_names() {
        let pg = QueryBuilder::new(DatabaseFamily::Postgres);
        let lookup = pg.columns("public", "users");
        assert_eq!(
            lookup.params,
            vec![BindValue::from("public"), BindValue::from("users")]
        );
        assert!(!lookup.sql.contains("users"));

        let sqlite = QueryBuilder::new(DatabaseFamily::Sqlite);
        assert!(sqlite.list_tables("main").params.is_empty());
        assert_eq!(
            sqlite.primary_keys("main", "users").params,
            vec![BindValue::from("users")]
        );
    }

    #[test]
    fn test_builds_are_deterministic() {
        let builder = QueryBuilder::new(DatabaseFamily::Oracle);
        let a = builder.table_query(Some("HR"), "JOBS", Some(7)).unwrap();
        let b = builder.table_query(Some("HR"), "JOBS", Some(7)).unwrap();
        assert_eq!(a, b);
    }
}
