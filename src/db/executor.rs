//! Query execution engine.
//!
//! This module provides query execution functionality with support for:
//! - Parameterized statements built by the console
//! - Raw statements typed into the SQL runner
//! - Row limits (enforced via streaming - only fetches needed rows)
//! - Query timeouts
//! - Column description without fetching rows
//!
//! # Architecture
//!
//! The executor uses database-specific implementations organized in submodules
//! (`mysql`, `postgres`, `sqlite`). Each submodule provides identical
//! functionality adapted to the database's type system.

use crate::db::pool::DbPool;
use crate::db::types::RowToProjection;
use crate::error::{ConsoleError, ConsoleResult};
use crate::models::{
    ColumnMetadata, DEFAULT_QUERY_TIMEOUT_SECS, DEFAULT_ROW_LIMIT, MAX_ROW_LIMIT, QueryParam,
    ResultSet, unique_labels,
};
use futures_util::StreamExt;
use sqlx::{Column, TypeInfo};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Query executor that handles database query execution.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    default_timeout: Duration,
    row_limit: u32,
}

impl QueryExecutor {
    /// Create a new query executor with default settings.
    pub fn new() -> Self {
        Self {
            default_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }

    /// Create a new query executor with custom settings.
    pub fn with_defaults(timeout_secs: u64, row_limit: u32) -> Self {
        Self {
            default_timeout: Duration::from_secs(timeout_secs),
            // Clamp to [1, MAX_ROW_LIMIT]; a zero limit would mark every result truncated
            row_limit: row_limit.clamp(1, MAX_ROW_LIMIT),
        }
    }

    pub fn row_limit(&self) -> u32 {
        self.row_limit
    }

    /// Run a row-returning statement and project its rows.
    pub async fn fetch(
        &self,
        pool: &DbPool,
        sql: &str,
        params: &[QueryParam],
    ) -> ConsoleResult<ResultSet> {
        let start = Instant::now();
        let row_limit = self.row_limit;
        let query_timeout = self.default_timeout;

        debug!(
            sql = %sql,
            params = params.len(),
            limit = row_limit,
            timeout_secs = query_timeout.as_secs(),
            "Executing query"
        );

        match pool {
            DbPool::MySql(p) => {
                let rows = mysql::fetch_rows(p, sql, params, row_limit, query_timeout).await?;
                Ok(process_rows(rows, row_limit, start))
            }
            DbPool::Postgres(p) => {
                let rows = postgres::fetch_rows(p, sql, params, row_limit, query_timeout).await?;
                Ok(process_rows(rows, row_limit, start))
            }
            DbPool::SQLite(p) => {
                let rows = sqlite::fetch_rows(p, sql, params, row_limit, query_timeout).await?;
                Ok(process_rows(rows, row_limit, start))
            }
        }
    }

    /// Run a statement that returns no rows and report the affected row count.
    pub async fn execute(
        &self,
        pool: &DbPool,
        sql: &str,
        params: &[QueryParam],
    ) -> ConsoleResult<u64> {
        let query_timeout = self.default_timeout;

        debug!(
            sql = %sql,
            params = params.len(),
            timeout_secs = query_timeout.as_secs(),
            "Executing statement"
        );

        match pool {
            DbPool::MySql(p) => mysql::execute(p, sql, params, query_timeout).await,
            DbPool::Postgres(p) => postgres::execute(p, sql, params, query_timeout).await,
            DbPool::SQLite(p) => sqlite::execute(p, sql, params, query_timeout).await,
        }
    }

    /// Column names and types a statement would return, without fetching rows.
    ///
    /// Works on empty tables, unlike reading metadata off the first row.
    pub async fn describe_columns(
        &self,
        pool: &DbPool,
        sql: &str,
    ) -> ConsoleResult<Vec<ColumnMetadata>> {
        let query_timeout = self.default_timeout;
        debug!(sql = %sql, "Describing statement");

        match pool {
            DbPool::MySql(p) => mysql::describe(p, sql, query_timeout).await,
            DbPool::Postgres(p) => postgres::describe(p, sql, query_timeout).await,
            DbPool::SQLite(p) => sqlite::describe(p, sql, query_timeout).await,
        }
    }
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Process rows from any database type into a ResultSet.
fn process_rows<R: RowToProjection>(rows: Vec<R>, row_limit: u32, start: Instant) -> ResultSet {
    let execution_time_ms = start.elapsed().as_millis() as u64;

    let Some(first) = rows.first() else {
        return ResultSet {
            execution_time_ms,
            ..ResultSet::default()
        };
    };

    let columns = first.column_metadata();
    let total_rows = rows.len();
    let truncated = total_rows > row_limit as usize;

    let projected = rows
        .iter()
        .take(row_limit as usize)
        .map(RowToProjection::project)
        .collect();

    if truncated {
        warn!(limit = row_limit, "Query result truncated");
    }

    ResultSet {
        columns,
        rows: projected,
        truncated,
        execution_time_ms,
    }
}

// =============================================================================
// Common Helper Functions
// =============================================================================

fn collect_rows<R>(results: Vec<Result<R, sqlx::Error>>) -> ConsoleResult<Vec<R>> {
    let mut rows = Vec::with_capacity(results.len());
    for result in results {
        rows.push(result.map_err(ConsoleError::from)?);
    }
    Ok(rows)
}

fn timeout_error(operation: &str, timeout: Duration) -> ConsoleError {
    ConsoleError::timeout(operation, timeout.as_secs())
}

fn statement_columns<C: Column>(columns: &[C]) -> Vec<ColumnMetadata> {
    let labels = unique_labels(columns.iter().map(|c| c.name()));
    columns
        .iter()
        .zip(labels)
        .map(|(col, label)| ColumnMetadata::new(label, col.type_info().name()))
        .collect()
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================
//
// Each module below provides the same interface adapted to its database type.
// The code structure is intentionally parallel to make differences obvious.

mod mysql {
    use super::*;
    use crate::db::params::bind_param;
    use sqlx::mysql::MySqlRow;
    use sqlx::{Executor, MySqlPool, Statement};

    pub async fn fetch_rows(
        pool: &MySqlPool,
        sql: &str,
        params: &[QueryParam],
        row_limit: u32,
        query_timeout: Duration,
    ) -> ConsoleResult<Vec<MySqlRow>> {
        // When params is empty, use raw SQL to avoid prepared statement issues
        let fetch_limit = row_limit as usize + 1;
        let rows_future = if params.is_empty() {
            pool.fetch(sql).take(fetch_limit).collect::<Vec<_>>()
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_param(query, param);
            }
            query.fetch(pool).take(fetch_limit).collect::<Vec<_>>()
        };

        match timeout(query_timeout, rows_future).await {
            Ok(results) => collect_rows(results),
            Err(_) => Err(timeout_error("query execution", query_timeout)),
        }
    }

    pub async fn execute(
        pool: &MySqlPool,
        sql: &str,
        params: &[QueryParam],
        query_timeout: Duration,
    ) -> ConsoleResult<u64> {
        let result = if params.is_empty() {
            timeout(query_timeout, pool.execute(sql)).await
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_param(query, param);
            }
            timeout(query_timeout, query.execute(pool)).await
        };

        match result {
            Ok(Ok(r)) => Ok(r.rows_affected()),
            Ok(Err(e)) => Err(ConsoleError::from(e)),
            Err(_) => Err(timeout_error("statement execution", query_timeout)),
        }
    }

    pub async fn describe(
        pool: &MySqlPool,
        sql: &str,
        query_timeout: Duration,
    ) -> ConsoleResult<Vec<ColumnMetadata>> {
        match timeout(query_timeout, pool.prepare(sql)).await {
            Ok(Ok(stmt)) => Ok(statement_columns(stmt.columns())),
            Ok(Err(e)) => Err(ConsoleError::from(e)),
            Err(_) => Err(timeout_error("statement description", query_timeout)),
        }
    }
}

mod postgres {
    use super::*;
    use crate::db::params::bind_param;
    use sqlx::postgres::PgRow;
    use sqlx::{Executor, PgPool, Statement};

    pub async fn fetch_rows(
        pool: &PgPool,
        sql: &str,
        params: &[QueryParam],
        row_limit: u32,
        query_timeout: Duration,
    ) -> ConsoleResult<Vec<PgRow>> {
        let fetch_limit = row_limit as usize + 1;
        let rows_future = if params.is_empty() {
            pool.fetch(sql).take(fetch_limit).collect::<Vec<_>>()
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_param(query, param);
            }
            query.fetch(pool).take(fetch_limit).collect::<Vec<_>>()
        };

        match timeout(query_timeout, rows_future).await {
            Ok(results) => collect_rows(results),
            Err(_) => Err(timeout_error("query execution", query_timeout)),
        }
    }

    pub async fn execute(
        pool: &PgPool,
        sql: &str,
        params: &[QueryParam],
        query_timeout: Duration,
    ) -> ConsoleResult<u64> {
        let result = if params.is_empty() {
            timeout(query_timeout, pool.execute(sql)).await
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_param(query, param);
            }
            timeout(query_timeout, query.execute(pool)).await
        };

        match result {
            Ok(Ok(r)) => Ok(r.rows_affected()),
            Ok(Err(e)) => Err(ConsoleError::from(e)),
            Err(_) => Err(timeout_error("statement execution", query_timeout)),
        }
    }

    pub async fn describe(
        pool: &PgPool,
        sql: &str,
        query_timeout: Duration,
    ) -> ConsoleResult<Vec<ColumnMetadata>> {
        match timeout(query_timeout, pool.prepare(sql)).await {
            Ok(Ok(stmt)) => Ok(statement_columns(stmt.columns())),
            Ok(Err(e)) => Err(ConsoleError::from(e)),
            Err(_) => Err(timeout_error("statement description", query_timeout)),
        }
    }
}

mod sqlite {
    use super::*;
    use crate::db::params::bind_param;
    use sqlx::sqlite::SqliteRow;
    use sqlx::{Executor, SqlitePool, Statement};

    pub async fn fetch_rows(
        pool: &SqlitePool,
        sql: &str,
        params: &[QueryParam],
        row_limit: u32,
        query_timeout: Duration,
    ) -> ConsoleResult<Vec<SqliteRow>> {
        let fetch_limit = row_limit as usize + 1;
        let rows_future = if params.is_empty() {
            pool.fetch(sql).take(fetch_limit).collect::<Vec<_>>()
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_param(query, param);
            }
            query.fetch(pool).take(fetch_limit).collect::<Vec<_>>()
        };

        match timeout(query_timeout, rows_future).await {
            Ok(results) => collect_rows(results),
            Err(_) => Err(timeout_error("query execution", query_timeout)),
        }
    }

    pub async fn execute(
        pool: &SqlitePool,
        sql: &str,
        params: &[QueryParam],
        query_timeout: Duration,
    ) -> ConsoleResult<u64> {
        let result = if params.is_empty() {
            timeout(query_timeout, pool.execute(sql)).await
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = bind_param(query, param);
            }
            timeout(query_timeout, query.execute(pool)).await
        };

        match result {
            Ok(Ok(r)) => Ok(r.rows_affected()),
            Ok(Err(e)) => Err(ConsoleError::from(e)),
            Err(_) => Err(timeout_error("statement execution", query_timeout)),
        }
    }

    pub async fn describe(
        pool: &SqlitePool,
        sql: &str,
        query_timeout: Duration,
    ) -> ConsoleResult<Vec<ColumnMetadata>> {
        match timeout(query_timeout, pool.prepare(sql)).await {
            Ok(Ok(stmt)) => Ok(statement_columns(stmt.columns())),
            Ok(Err(e)) => Err(ConsoleError::from(e)),
            Err(_) => Err(timeout_error("statement description", query_timeout)),
        }
    }
}
