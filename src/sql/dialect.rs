//! Per-family SQL conventions: identifier quoting, row limiting,
//! placeholder syntax and the system-catalog lookups.
//!
//! Everything here is a pure function of `DatabaseFamily`. Catalog SQL
//! always takes schema/table names as `?` parameters.

use crate::models::{BindValue, DatabaseFamily};

/// Catalog SQL per family.
mod queries {
    pub mod postgres {
        pub const SCHEMAS: &str =
            "SELECT nspname::text AS schema_name FROM pg_catalog.pg_namespace ORDER BY nspname";

        pub const TABLES: &str = r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = ? AND table_type = 'BASE TABLE'
            ORDER BY table_name
        "#;

        pub const COLUMNS: &str = r#"
            SELECT
                column_name::text,
                udt_name::text,
                CAST(COALESCE(character_maximum_length, numeric_precision, datetime_precision) AS BIGINT),
                is_nullable::text
            FROM information_schema.columns
            WHERE table_schema = ? AND table_name = ?
            ORDER BY ordinal_position
        "#;

        pub const PRIMARY_KEYS: &str = r#"
            SELECT kcu.column_name::text
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
                ON tc.constraint_name = kcu.constraint_name
                AND tc.table_schema = kcu.table_schema
                AND tc.table_name = kcu.table_name
            WHERE tc.constraint_type = 'PRIMARY KEY'
                AND tc.table_schema = ? AND tc.table_name = ?
            ORDER BY kcu.ordinal_position
        "#;
    }

    pub mod oracle {
        pub const SCHEMAS: &str = "SELECT username FROM all_users ORDER BY username";

        pub const TABLES: &str =
            "SELECT table_name FROM all_tables WHERE owner = ? ORDER BY table_name";

        pub const COLUMNS: &str = r#"
            SELECT column_name, data_type,
                COALESCE(data_precision, char_length, data_length) AS column_size,
                nullable
            FROM all_tab_columns
            WHERE owner = ? AND table_name = ?
            ORDER BY column_id
        "#;

        pub const PRIMARY_KEYS: &str = r#"
            SELECT cols.column_name
            FROM all_constraints cons
            JOIN all_cons_columns cols
                ON cons.constraint_name = cols.constraint_name
                AND cons.owner = cols.owner
            WHERE cons.constraint_type = 'P'
                AND cons.owner = ? AND cons.table_name = ?
            ORDER BY cols.position
        "#;
    }

    pub mod sqlserver {
        pub const SCHEMAS: &str = "SELECT name FROM sys.schemas ORDER BY name";

        pub const TABLES: &str = r#"
            SELECT TABLE_NAME
            FROM INFORMATION_SCHEMA.TABLES
            WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
        "#;

        pub const COLUMNS: &str = r#"
            SELECT
                COLUMN_NAME,
                DATA_TYPE,
                CAST(COALESCE(CHARACTER_MAXIMUM_LENGTH, NUMERIC_PRECISION, DATETIME_PRECISION) AS BIGINT),
                IS_NULLABLE
            FROM INFORMATION_SCHEMA.COLUMNS
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
        "#;

        pub const PRIMARY_KEYS: &str = r#"
            SELECT kcu.COLUMN_NAME
            FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc
            JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu
                ON tc.CONSTRAINT_NAME = kcu.CONSTRAINT_NAME
                AND tc.TABLE_SCHEMA = kcu.TABLE_SCHEMA
                AND tc.TABLE_NAME = kcu.TABLE_NAME
            WHERE tc.CONSTRAINT_TYPE = 'PRIMARY KEY'
                AND tc.TABLE_SCHEMA = ? AND tc.TABLE_NAME = ?
            ORDER BY kcu.ORDINAL_POSITION
        "#;
    }

    /// Shared by MySQL and MariaDB. CONVERT avoids VARBINARY results from
    /// information_schema on MySQL 8.
    pub mod mysql {
        pub const SCHEMAS: &str = r#"
            SELECT CONVERT(SCHEMA_NAME USING utf8mb4) AS SCHEMA_NAME
            FROM information_schema.SCHEMATA
            WHERE SCHEMA_NAME NOT IN ('information_schema', 'mysql', 'performance_schema', 'sys')
            ORDER BY SCHEMA_NAME
        "#;

        pub const TABLES: &str = r#"
            SELECT CONVERT(TABLE_NAME USING utf8mb4) AS TABLE_NAME
            FROM information_schema.TABLES
            WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
        "#;

        pub const COLUMNS: &str = r#"
            SELECT
                CONVERT(COLUMN_NAME USING utf8mb4) AS COLUMN_NAME,
                CONVERT(UPPER(DATA_TYPE) USING utf8mb4) AS DATA_TYPE,
                CAST(COALESCE(CHARACTER_MAXIMUM_LENGTH, NUMERIC_PRECISION, DATETIME_PRECISION) AS SIGNED) AS COLUMN_SIZE,
                CONVERT(IS_NULLABLE USING utf8mb4) AS IS_NULLABLE
            FROM information_schema.COLUMNS
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
        "#;

        pub const PRIMARY_KEYS: &str = r#"
            SELECT CONVERT(COLUMN_NAME USING utf8mb4) AS COLUMN_NAME
            FROM information_schema.KEY_COLUMN_USAGE
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND CONSTRAINT_NAME = 'PRIMARY'
            ORDER BY ORDINAL_POSITION
        "#;
    }

    /// SQLite has a single catalog per file, so the schema is not bound.
    pub mod sqlite {
        pub const SCHEMAS: &[&str] = &["main"];

        pub const TABLES: &str = r#"
            SELECT name
            FROM sqlite_master
            WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
            ORDER BY name
        "#;

        pub const COLUMNS: &str = r#"
            SELECT
                name,
                type,
                NULL AS column_size,
                CASE WHEN "notnull" = 0 THEN 'YES' ELSE 'NO' END AS is_nullable
            FROM pragma_table_info(?)
            ORDER BY cid
        "#;

        pub const PRIMARY_KEYS: &str = "SELECT name FROM pragma_table_info(?) WHERE pk > 0 ORDER BY pk";
    }
}

/// How a family lists schemas.
#[derive(Clone, Copy)]
pub enum SchemaListing {
    /// Run `sql` and keep the names `keep` accepts.
    Catalog {
        sql: &'static str,
        keep: fn(&str) -> bool,
    },
    /// Constant list, no query.
    Fixed(&'static [&'static str]),
}

/// Row-limiting syntax for a table query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStrategy {
    /// Append ` LIMIT ?`.
    AppendLimit(i64),
    /// Append ` WHERE ROWNUM <= ?`. Breaks if the base query already has a WHERE clause.
    WhereRownum(i64),
    /// Rewrite `SELECT * FROM` into `SELECT TOP n * FROM`, `n` inlined.
    TopClause(i64),
    /// Leave the query untouched.
    NoOp,
}

impl PaginationStrategy {
    /// Apply the strategy to a `SELECT * FROM ...` statement.
    pub fn apply(self, base_sql: String) -> (String, Vec<BindValue>) {
        match self {
            Self::AppendLimit(limit) => (format!("{base_sql} LIMIT ?"), vec![BindValue::Int(limit)]),
            Self::WhereRownum(limit) => (
                format!("{base_sql} WHERE ROWNUM <= ?"),
                vec![BindValue::Int(limit)],
            ),
            Self::TopClause(limit) => (
                base_sql.replacen("SELECT * FROM", &format!("SELECT TOP {limit} * FROM"), 1),
                Vec::new(),
            ),
            Self::NoOp => (base_sql, Vec::new()),
        }
    }
}

impl DatabaseFamily {
    /// Wrap an identifier in the family's quote characters, doubling any
    /// embedded closing quote.
    pub fn quote_identifier(&self, identifier: &str) -> String {
        match self {
            Self::Postgres | Self::Oracle | Self::Sqlite => {
                format!("\"{}\"", identifier.replace('"', "\"\""))
            }
            Self::SqlServer => format!("[{}]", identifier.replace(']', "]]")),
            Self::MySql | Self::MariaDb => format!("`{}`", identifier.replace('`', "``")),
        }
    }

    /// Pagination for a positive limit. Non-positive limits never paginate.
    pub fn pagination(&self, limit: i64) -> PaginationStrategy {
        if limit <= 0 {
            return PaginationStrategy::NoOp;
        }
        match self {
            Self::Postgres => PaginationStrategy::AppendLimit(limit),
            Self::Oracle => PaginationStrategy::WhereRownum(limit),
            Self::SqlServer => PaginationStrategy::TopClause(limit),
            Self::MySql | Self::MariaDb | Self::Sqlite => PaginationStrategy::NoOp,
        }
    }

    pub fn schema_listing(&self) -> SchemaListing {
        match self {
            Self::Postgres => SchemaListing::Catalog {
                sql: queries::postgres::SCHEMAS,
                keep: keep_postgres_schema,
            },
            Self::Oracle => SchemaListing::Catalog {
                sql: queries::oracle::SCHEMAS,
                keep: keep_any_schema,
            },
            Self::SqlServer => SchemaListing::Catalog {
                sql: queries::sqlserver::SCHEMAS,
                keep: keep_sqlserver_schema,
            },
            Self::MySql | Self::MariaDb => SchemaListing::Catalog {
                sql: queries::mysql::SCHEMAS,
                keep: keep_mysql_schema,
            },
            Self::Sqlite => SchemaListing::Fixed(queries::sqlite::SCHEMAS),
        }
    }

    /// Lists base tables. Takes the schema as its only parameter, except
    /// on SQLite where it takes none.
    pub fn tables_query(&self) -> &'static str {
        match self {
            Self::Postgres => queries::postgres::TABLES,
            Self::Oracle => queries::oracle::TABLES,
            Self::SqlServer => queries::sqlserver::TABLES,
            Self::MySql | Self::MariaDb => queries::mysql::TABLES,
            Self::Sqlite => queries::sqlite::TABLES,
        }
    }

    /// Columns as (name, type, size, nullability code) in ordinal order.
    /// Parameters: schema then table, or just the table on SQLite.
    pub fn columns_query(&self) -> &'static str {
        match self {
            Self::Postgres => queries::postgres::COLUMNS,
            Self::Oracle => queries::oracle::COLUMNS,
            Self::SqlServer => queries::sqlserver::COLUMNS,
            Self::MySql | Self::MariaDb => queries::mysql::COLUMNS,
            Self::Sqlite => queries::sqlite::COLUMNS,
        }
    }

    /// Primary key column names. Same parameters as `columns_query`.
    pub fn primary_keys_query(&self) -> &'static str {
        match self {
            Self::Postgres => queries::postgres::PRIMARY_KEYS,
            Self::Oracle => queries::oracle::PRIMARY_KEYS,
            Self::SqlServer => queries::sqlserver::PRIMARY_KEYS,
            Self::MySql | Self::MariaDb => queries::mysql::PRIMARY_KEYS,
            Self::Sqlite => queries::sqlite::PRIMARY_KEYS,
        }
    }

    /// Whether catalog lookups take the schema name as a parameter.
    pub fn binds_schema_in_catalog(&self) -> bool {
        !matches!(self, Self::Sqlite)
    }

    /// Rewrite portable `?` placeholders into the family's native syntax.
    ///
    /// Only meant for statements built by this crate: a `?` inside a string
    /// literal would be rewritten too.
    pub fn native_placeholders(&self, sql: &str) -> String {
        let marker = match self {
            Self::Postgres => "$",
            Self::SqlServer => "@P",
            Self::Oracle => ":",
            Self::MySql | Self::MariaDb | Self::Sqlite => return sql.to_string(),
        };

        let mut out = String::with_capacity(sql.len() + 8);
        let mut index = 0;
        for c in sql.chars() {
            if c == '?' {
                index += 1;
                out.push_str(marker);
                out.push_str(&index.to_string());
            } else {
                out.push(c);
            }
        }
        out
    }
}

fn keep_postgres_schema(name: &str) -> bool {
    !name.starts_with("pg_") && name != "information_schema"
}

fn keep_sqlserver_schema(name: &str) -> bool {
    !name.starts_with("db_") && name != "sys" && !name.eq_ignore_ascii_case("information_schema")
}

fn keep_mysql_schema(name: &str) -> bool {
    !matches!(
        name.to_ascii_lowercase().as_str(),
        "information_schema" | "mysql" | "performance_schema" | "sys"
    )
}

fn keep_any_schema(_name: &str) -> bool {
    true
}
