//! Decide whether a runner statement returns rows.
//!
//! Uses [sqlparser](https://docs.rs/sqlparser/) with the backend's dialect.
//! Input that does not parse is left to the database.

use crate::models::DatabaseType;
use sqlparser::ast::Statement;
use sqlparser::dialect::{Dialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;

/// How the runner should execute a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Produces a result set (SELECT, SHOW, EXPLAIN, ... RETURNING)
    Rows,
    /// Reports an affected row count (INSERT, UPDATE, DDL, ...)
    Count,
}

fn get_dialect(db_type: DatabaseType) -> Box<dyn Dialect> {
    match db_type {
        DatabaseType::PostgreSQL => Box::new(PostgreSqlDialect {}),
        DatabaseType::MySQL => Box::new(MySqlDialect {}),
        DatabaseType::SQLite => Box::new(SQLiteDialect {}),
    }
}

/// Classify `sql`. `None` when it does not parse.
///
/// A batch returns rows when any of its statements does.
pub fn classify(sql: &str, db_type: DatabaseType) -> Option<StatementKind> {
    let dialect = get_dialect(db_type);
    let statements = Parser::parse_sql(dialect.as_ref(), sql).ok()?;
    if statements.is_empty() {
        return None;
    }
    let returns_rows = statements.iter().any(returns_rows) || has_returning_clause(sql);
    Some(if returns_rows {
        StatementKind::Rows
    } else {
        StatementKind::Count
    })
}

fn returns_rows(stmt: &Statement) -> bool {
    matches!(
        stmt,
        Statement::Query(_)
            | Statement::Explain { .. }
            | Statement::ExplainTable { .. }
            | Statement::ShowTables { .. }
            | Statement::ShowColumns { .. }
            | Statement::ShowDatabases { .. }
            | Statement::ShowSchemas { .. }
            | Statement::ShowCreate { .. }
            | Statement::ShowFunctions { .. }
            | Statement::ShowVariable { .. }
            | Statement::ShowVariables { .. }
            | Statement::ShowStatus { .. }
            | Statement::ShowCollation { .. }
            | Statement::Pragma { .. }
    )
}

fn has_returning_clause(sql: &str) -> bool {
    sql.to_uppercase()
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .any(|word| word == "RETURNING")
}
