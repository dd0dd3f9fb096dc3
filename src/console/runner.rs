//! Ad-hoc SQL runner.

use crate::console::notice::Notice;
use crate::db::{Database, QueryExecutor};
use crate::error::ConsoleResult;
use crate::models::{ColumnMetadata, RowProjection};
use crate::sql::{StatementKind, check_sql, classify};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub const NO_RESULTS_MESSAGE: &str = "No results found.";

/// What the runner page renders for one statement.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub columns: Vec<ColumnMetadata>,
    pub rows: Vec<RowProjection>,
    pub row_count: usize,
    /// Set for statements that report an affected row count instead of rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_affected: Option<u64>,
    pub truncated: bool,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone)]
pub struct SqlRunner {
    database: Arc<Database>,
    executor: QueryExecutor,
}

impl SqlRunner {
    pub fn new(database: Arc<Database>, executor: QueryExecutor) -> Self {
        Self { database, executor }
    }

    /// Check `sql` against the blocklist and execute it as typed.
    pub async fn run(&self, sql: &str) -> ConsoleResult<RunOutput> {
        check_sql(sql)?;
        let pool = self.database.pool();

        let kind = classify(sql, self.database.db_type());
        if kind == Some(StatementKind::Count) {
            let start = Instant::now();
            let rows_affected = self.executor.execute(pool, sql, &[]).await?;
            let execution_time_ms = start.elapsed().as_millis() as u64;
            info!(rows_affected, execution_time_ms, "Executed statement");
            return Ok(RunOutput {
                columns: Vec::new(),
                rows: Vec::new(),
                row_count: 0,
                rows_affected: Some(rows_affected),
                truncated: false,
                execution_time_ms,
                notice: Some(Notice::info(format!(
                    "Statement executed, {} row(s) affected.",
                    rows_affected
                ))),
            });
        }

        let result = self.executor.fetch(pool, sql, &[]).await?;
        info!(
            rows = result.row_count(),
            truncated = result.truncated,
            execution_time_ms = result.execution_time_ms,
            "Executed query"
        );
        let notice = if result.is_empty() {
            Some(Notice::info(NO_RESULTS_MESSAGE))
        } else if result.truncated {
            Some(Notice::truncated(self.executor.row_limit()))
        } else {
            None
        };

        Ok(RunOutput {
            row_count: result.row_count(),
            columns: result.columns,
            rows: result.rows,
            rows_affected: None,
            truncated: result.truncated,
            execution_time_ms: result.execution_time_ms,
            notice,
        })
    }
}
