//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use db_console::config::PoolOptions;
use db_console::db::{Database, QueryExecutor};
use db_console::models::ConnectionConfig;
use std::sync::Arc;
use tempfile::NamedTempFile;

const FIXTURE_DDL: &[&str] = &[
    "CREATE TABLE accounts (id INTEGER PRIMARY KEY, name TEXT, email TEXT, created_at TIMESTAMP)",
    "INSERT INTO accounts (id, name, email, created_at) VALUES (1, 'alice', 'alice@example.com', '2024-01-01 10:00:00')",
    "INSERT INTO accounts (id, name, email, created_at) VALUES (2, 'bob', NULL, '2024-02-01 09:30:00')",
    "CREATE TABLE memberships (org_id INTEGER, user_id INTEGER, role TEXT, PRIMARY KEY (user_id, org_id))",
    "INSERT INTO memberships (org_id, user_id, role) VALUES (10, 1, 'owner')",
    "INSERT INTO memberships (org_id, user_id, role) VALUES (20, 1, 'viewer')",
    "CREATE TABLE notes (body TEXT)",
    "INSERT INTO notes (body) VALUES ('hello')",
    "CREATE TABLE \"bad-name\" (x INTEGER)",
];

/// Open a fresh SQLite file seeded with the fixture tables.
pub async fn setup_database() -> Arc<Database> {
    let temp_file = NamedTempFile::new().unwrap();
    // Keep the file around after the handle drops
    let db_path = temp_file
        .into_temp_path()
        .keep()
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let config = ConnectionConfig::new(format!("sqlite:{}", db_path), PoolOptions::default())
        .unwrap();
    let database = Database::connect(config).await.unwrap();

    let executor = QueryExecutor::new();
    for ddl in FIXTURE_DDL {
        executor.execute(database.pool(), ddl, &[]).await.unwrap();
    }
    Arc::new(database)
}

/// Count rows in `table` through a plain query.
pub async fn count_rows(database: &Database, table: &str) -> i64 {
    let result = QueryExecutor::new()
        .fetch(
            database.pool(),
            &format!("SELECT COUNT(*) AS n FROM {}", table),
            &[],
        )
        .await
        .unwrap();
    let n = result.rows[0].get("n").unwrap();
    n.as_i64()
        .or_else(|| n.as_str().and_then(|s| s.parse().ok()))
        .unwrap()
}
