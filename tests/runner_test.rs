//! Integration tests for the ad-hoc SQL runner.
//!
//! Tests verify that:
//! - Row-returning statements come back as a grid
//! - Data-changing statements report an affected row count
//! - DROP, TRUNCATE and DELETE are refused before reaching the database
//! - Empty and truncated results carry a notice

mod common;

use common::{count_rows, setup_database};
use db_console::ConsoleError;
use db_console::console::SqlRunner;
use db_console::console::runner::NO_RESULTS_MESSAGE;
use db_console::db::QueryExecutor;
use db_console::sql::blocklist::EMPTY_QUERY_MESSAGE;
use serde_json::json;

#[tokio::test]
async fn test_select_returns_rows() {
    let database = setup_database().await;
    let runner = SqlRunner::new(database, QueryExecutor::new());

    let out = runner
        .run("SELECT id, name FROM accounts ORDER BY id")
        .await
        .unwrap();
    assert_eq!(out.row_count, 2);
    assert_eq!(out.rows[1].get("name"), Some(&json!("bob")));
    let columns: Vec<&str> = out.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(columns, vec!["id", "name"]);
    assert!(out.rows_affected.is_none());
    assert!(out.notice.is_none());
}

#[tokio::test]
async fn test_empty_result_has_notice() {
    let database = setup_database().await;
    let runner = SqlRunner::new(database, QueryExecutor::new());

    let out = runner
        .run("SELECT * FROM accounts WHERE id = 42")
        .await
        .unwrap();
    assert_eq!(out.row_count, 0);
    assert_eq!(out.notice.unwrap().message, NO_RESULTS_MESSAGE);
}

#[tokio::test]
async fn test_truncated_result_has_notice() {
    let database = setup_database().await;
    let runner = SqlRunner::new(database, QueryExecutor::with_defaults(30, 1));

    let out = runner.run("SELECT * FROM accounts").await.unwrap();
    assert!(out.truncated);
    assert_eq!(out.row_count, 1);
    assert_eq!(out.notice.unwrap().message, "Showing the first 1 rows.");
}

#[tokio::test]
async fn test_update_reports_affected_rows() {
    let database = setup_database().await;
    let runner = SqlRunner::new(database.clone(), QueryExecutor::new());

    let out = runner
        .run("UPDATE accounts SET email = 'shared@example.com'")
        .await
        .unwrap();
    assert_eq!(out.rows_affected, Some(2));
    assert!(out.rows.is_empty());
    assert_eq!(
        out.notice.unwrap().message,
        "Statement executed, 2 row(s) affected."
    );

    let out = runner
        .run("INSERT INTO notes (body) VALUES ('second')")
        .await
        .unwrap();
    assert_eq!(out.rows_affected, Some(1));
    assert_eq!(count_rows(&database, "notes").await, 2);
}

#[tokio::test]
async fn test_forbidden_keywords_never_execute() {
    let database = setup_database().await;
    let runner = SqlRunner::new(database.clone(), QueryExecutor::new());

    for sql in [
        "DROP TABLE accounts",
        "delete from accounts",
        "Truncate accounts",
        "SELECT 1; DROP TABLE notes",
    ] {
        let err = runner.run(sql).await.unwrap_err();
        assert!(matches!(err, ConsoleError::ForbiddenSql { .. }), "{sql}");
        assert!(err.to_string().contains("forbidden SQL commands"));
    }
    assert_eq!(count_rows(&database, "accounts").await, 2);
    assert_eq!(count_rows(&database, "notes").await, 1);
}

#[tokio::test]
async fn test_blank_sql_rejected() {
    let database = setup_database().await;
    let runner = SqlRunner::new(database, QueryExecutor::new());

    let err = runner.run("   ").await.unwrap_err();
    assert!(matches!(err, ConsoleError::InvalidInput { .. }));
    assert_eq!(err.to_string(), EMPTY_QUERY_MESSAGE);
}

#[tokio::test]
async fn test_syntax_error_is_database_error() {
    let database = setup_database().await;
    let runner = SqlRunner::new(database, QueryExecutor::new());

    let err = runner.run("SELEC nothing FROM").await.unwrap_err();
    assert!(matches!(err, ConsoleError::Database { .. }));
    assert!(!err.is_validation());

    let err = runner.run("SELECT * FROM missing_table").await.unwrap_err();
    assert!(matches!(err, ConsoleError::Database { .. }));
}

#[tokio::test]
async fn test_pragma_returns_rows() {
    let database = setup_database().await;
    let runner = SqlRunner::new(database, QueryExecutor::new());

    let out = runner.run("PRAGMA table_info(accounts)").await.unwrap();
    assert_eq!(out.row_count, 4);
    assert!(out.rows_affected.is_none());
}
