//! Catalog introspection for the table browser.
//!
//! Lists browsable tables and reads primary-key columns for SQLite,
//! PostgreSQL and MySQL.
//!
//! # Architecture
//!
//! SQL queries live in the `queries` submodule with constants for each
//! database type. Database-specific implementations are in their respective
//! submodules (postgres, mysql, sqlite), each providing the same interface.

use crate::db::pool::DbPool;
use crate::error::ConsoleResult;
use crate::models::{PrimaryKeySet, TableName};
use tracing::debug;

/// Schema inspector for catalog lookups.
pub struct SchemaInspector;

impl SchemaInspector {
    /// Names of the tables and views the console may browse.
    ///
    /// Names that are not plain identifiers are dropped; catalog order is kept.
    pub async fn list_tables(pool: &DbPool, schema: &str) -> ConsoleResult<Vec<TableName>> {
        let names = match pool {
            DbPool::Postgres(p) => postgres::list_tables(p, schema).await?,
            DbPool::MySql(p) => mysql::list_tables(p).await?,
            DbPool::SQLite(p) => sqlite::list_tables(p).await?,
        };
        Ok(keep_valid_names(names))
    }

    /// Primary-key columns of `table` in key order. Empty when the table has none.
    pub async fn primary_key_columns(
        pool: &DbPool,
        schema: &str,
        table: &TableName,
    ) -> ConsoleResult<PrimaryKeySet> {
        let columns = match pool {
            DbPool::Postgres(p) => postgres::primary_key_columns(p, schema, table.as_str()).await?,
            DbPool::MySql(p) => mysql::primary_key_columns(p, table.as_str()).await?,
            DbPool::SQLite(p) => sqlite::primary_key_columns(p, table.as_str()).await?,
        };
        debug!(table = %table, columns = ?columns, "Resolved primary key");
        Ok(PrimaryKeySet::new(columns))
    }
}

fn keep_valid_names(names: Vec<String>) -> Vec<TableName> {
    let total = names.len();
    let tables: Vec<TableName> = names
        .into_iter()
        .filter_map(|name| TableName::parse(name).ok())
        .collect();
    if tables.len() < total {
        debug!(
            skipped = total - tables.len(),
            "Skipped tables with non-identifier names"
        );
    }
    tables
}

// =============================================================================
// SQL Query Templates
// =============================================================================

mod queries {
    pub mod postgres {
        pub const LIST_TABLES: &str = r#"
            SELECT table_name::text AS table_name
            FROM information_schema.tables
            WHERE table_schema = $1
            "#;

        pub const PRIMARY_KEY_COLUMNS: &str = r#"
            SELECT kcu.column_name::text AS column_name
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
                ON tc.constraint_name = kcu.constraint_name
                AND tc.table_schema = kcu.table_schema
                AND tc.table_name = kcu.table_name
            WHERE tc.constraint_type = 'PRIMARY KEY'
            AND tc.table_schema = $1
            AND tc.table_name = $2
            ORDER BY kcu.ordinal_position
            "#;
    }

    pub mod mysql {
        pub const LIST_TABLES: &str = r#"
            SELECT CONVERT(TABLE_NAME USING utf8) AS TABLE_NAME
            FROM information_schema.tables
            WHERE table_schema = DATABASE()
            "#;

        pub const PRIMARY_KEY_COLUMNS: &str = r#"
            SELECT CONVERT(COLUMN_NAME USING utf8) AS COLUMN_NAME
            FROM information_schema.key_column_usage
            WHERE table_schema = DATABASE()
            AND table_name = ?
            AND constraint_name = 'PRIMARY'
            ORDER BY ordinal_position
            "#;
    }

    pub mod sqlite {
        pub const LIST_TABLES: &str = r#"
            SELECT name FROM sqlite_master
            WHERE type IN ('table', 'view')
            AND name NOT LIKE 'sqlite_%'
            "#;

        pub const PRIMARY_KEY_COLUMNS: &str =
            "SELECT name FROM pragma_table_info(?) WHERE pk > 0 ORDER BY pk";
    }
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================

mod postgres {
    use super::*;
    use sqlx::{PgPool, Row};

    pub async fn list_tables(pool: &PgPool, schema: &str) -> ConsoleResult<Vec<String>> {
        let rows = sqlx::query(queries::postgres::LIST_TABLES)
            .bind(schema)
            .fetch_all(pool)
            .await?;
        let names = rows
            .iter()
            .filter_map(|row| row.try_get::<String, _>("table_name").ok())
            .collect::<Vec<_>>();
        debug!(count = names.len(), schema, "Listed PostgreSQL tables");
        Ok(names)
    }

    pub async fn primary_key_columns(
        pool: &PgPool,
        schema: &str,
        table: &str,
    ) -> ConsoleResult<Vec<String>> {
        let rows = sqlx::query(queries::postgres::PRIMARY_KEY_COLUMNS)
            .bind(schema)
            .bind(table)
            .fetch_all(pool)
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.try_get::<String, _>("column_name").ok())
            .collect())
    }
}

mod mysql {
    use super::*;
    use sqlx::{MySqlPool, Row};

    /// MySQL may return VARBINARY instead of VARCHAR depending on charset configuration.
    fn get_string(row: &sqlx::mysql::MySqlRow, column: &str) -> Option<String> {
        row.try_get::<String, _>(column).ok().or_else(|| {
            row.try_get::<Vec<u8>, _>(column)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
        })
    }

    pub async fn list_tables(pool: &MySqlPool) -> ConsoleResult<Vec<String>> {
        let rows = sqlx::query(queries::mysql::LIST_TABLES)
            .fetch_all(pool)
            .await?;
        let names = rows
            .iter()
            .filter_map(|row| get_string(row, "TABLE_NAME"))
            .collect::<Vec<_>>();
        debug!(count = names.len(), "Listed MySQL tables");
        Ok(names)
    }

    pub async fn primary_key_columns(pool: &MySqlPool, table: &str) -> ConsoleResult<Vec<String>> {
        let rows = sqlx::query(queries::mysql::PRIMARY_KEY_COLUMNS)
            .bind(table)
            .fetch_all(pool)
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| get_string(row, "COLUMN_NAME"))
            .collect())
    }
}

mod sqlite {
    use super::*;
    use sqlx::{Row, SqlitePool};

    pub async fn list_tables(pool: &SqlitePool) -> ConsoleResult<Vec<String>> {
        let rows = sqlx::query(queries::sqlite::LIST_TABLES)
            .fetch_all(pool)
            .await?;
        let names = rows
            .iter()
            .filter_map(|row| row.try_get::<String, _>("name").ok())
            .collect::<Vec<_>>();
        debug!(count = names.len(), "Listed SQLite tables");
        Ok(names)
    }

    pub async fn primary_key_columns(
        pool: &SqlitePool,
        table: &str,
    ) -> ConsoleResult<Vec<String>> {
        let rows = sqlx::query(queries::sqlite::PRIMARY_KEY_COLUMNS)
            .bind(table)
            .fetch_all(pool)
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.try_get::<String, _>("name").ok())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn sqlite_pool() -> DbPool {
        // One connection: every in-memory connection is its own database
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        for ddl in [
            "CREATE TABLE accounts (id INTEGER PRIMARY KEY, name TEXT)",
            "CREATE TABLE memberships (org_id INTEGER, user_id INTEGER, role TEXT, PRIMARY KEY (user_id, org_id))",
            "CREATE TABLE notes (body TEXT)",
            "CREATE TABLE \"bad-name\" (x INTEGER)",
            "CREATE VIEW account_names AS SELECT name FROM accounts",
        ] {
            sqlx::query(ddl).execute(&pool).await.unwrap();
        }
        DbPool::SQLite(pool)
    }

    #[tokio::test]
    async fn test_list_tables_filters_invalid_names() {
        let pool = sqlite_pool().await;
        let tables = SchemaInspector::list_tables(&pool, "public").await.unwrap();
        let names: Vec<&str> = tables.iter().map(TableName::as_str).collect();
        assert!(names.contains(&"accounts"));
        assert!(names.contains(&"account_names"));
        assert!(!names.contains(&"bad-name"));
        assert!(names.iter().all(|n| TableName::is_valid(n)));
    }

    #[tokio::test]
    async fn test_primary_key_columns_in_key_order() {
        let pool = sqlite_pool().await;
        let table = TableName::parse("memberships").unwrap();
        let pks = SchemaInspector::primary_key_columns(&pool, "public", &table)
            .await
            .unwrap();
        assert_eq!(pks.iter().collect::<Vec<_>>(), vec!["user_id", "org_id"]);

        let notes = TableName::parse("notes").unwrap();
        let pks = SchemaInspector::primary_key_columns(&pool, "public", &notes)
            .await
            .unwrap();
        assert!(pks.is_empty());
    }
}
