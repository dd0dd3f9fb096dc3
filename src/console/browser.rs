//! Table browser: catalog listing, grid, filters, edit form, update and insert.
//!
//! Each operation works on a [`BrowserSession`] and only writes its new state
//! back once every database call succeeded, so a failure leaves the page as
//! it was.

use crate::console::form::EditForm;
use crate::console::grid::{FilterSet, GridView};
use crate::console::notice::Notice;
use crate::console::session::{BrowserSession, TableState};
use crate::db::{Database, QueryExecutor, SchemaInspector};
use crate::error::{ConsoleError, ConsoleResult};
use crate::models::{ColumnTypes, TableName};
use crate::sql::builder::{self, SqlStatement};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a successful update or insert.
#[derive(Debug, Clone, Serialize)]
pub struct MutationOutcome {
    pub rows_affected: u64,
    pub grid: GridView,
    pub notice: Notice,
}

#[derive(Debug, Clone)]
pub struct TableBrowser {
    database: Arc<Database>,
    executor: QueryExecutor,
}

impl TableBrowser {
    pub fn new(database: Arc<Database>, executor: QueryExecutor) -> Self {
        Self { database, executor }
    }

    pub async fn list_tables(&self) -> ConsoleResult<Vec<TableName>> {
        SchemaInspector::list_tables(self.database.pool(), self.database.schema()).await
    }

    /// Load a table into the grid, resetting filters and any open form.
    pub async fn select_table(
        &self,
        session: &mut BrowserSession,
        name: &str,
    ) -> ConsoleResult<GridView> {
        let table = TableName::parse(name)?;
        if !self.list_tables().await?.contains(&table) {
            return Err(ConsoleError::table_not_found(table.as_str()));
        }
        let pool = self.database.pool();
        let db = self.database.db_type();

        let select = builder::select_all(db, &table);
        let column_types =
            ColumnTypes::new(self.executor.describe_columns(pool, &select.sql).await?);
        let primary_keys =
            SchemaInspector::primary_key_columns(pool, self.database.schema(), &table).await?;
        let result = self.executor.fetch(pool, &select.sql, &select.params).await?;

        info!(
            table = %table,
            rows = result.row_count(),
            columns = column_types.columns().len(),
            primary_keys = primary_keys.len(),
            "Selected table"
        );

        let state = TableState {
            filters: FilterSet::for_columns(&column_types),
            name: table,
            primary_keys,
            column_types,
            rows: result.rows,
            truncated: result.truncated,
        };
        let view = state.view(self.executor.row_limit());
        session.table = Some(state);
        session.form = None;
        Ok(view)
    }

    /// Re-query the selected table with substring filters.
    pub async fn apply_filters(
        &self,
        session: &mut BrowserSession,
        values: &HashMap<String, String>,
    ) -> ConsoleResult<GridView> {
        let state = selected_table(session)?;
        let filters = state.filters.with_values(&state.name, values)?;
        let stmt = self.filtered_select(&state.name, &filters);
        let result = self
            .executor
            .fetch(self.database.pool(), &stmt.sql, &stmt.params)
            .await?;

        info!(
            table = %state.name,
            filters = filters.active().count(),
            rows = result.row_count(),
            "Applied filters"
        );

        let state = session
            .table
            .as_mut()
            .ok_or_else(|| ConsoleError::internal("table state vanished"))?;
        state.filters = filters;
        state.rows = result.rows;
        state.truncated = result.truncated;
        session.form = None;
        Ok(state.view(self.executor.row_limit()))
    }

    /// Open the edit form for the grid row at `index`.
    pub fn select_row(
        &self,
        session: &mut BrowserSession,
        index: usize,
    ) -> ConsoleResult<EditForm> {
        let state = selected_table(session)?;
        let row = state
            .rows
            .get(index)
            .ok_or_else(|| ConsoleError::row_not_found(index))?;
        let form = EditForm::for_row(
            &state.name,
            index,
            row,
            &state.primary_keys,
            &state.column_types,
        );
        session.form = Some(form.clone());
        Ok(form)
    }

    /// Write the edited form back to the selected row.
    pub async fn submit_update(
        &self,
        session: &mut BrowserSession,
        values: &HashMap<String, Option<String>>,
    ) -> ConsoleResult<MutationOutcome> {
        let state = selected_table(session)?;
        if state.primary_keys.is_empty() {
            return Err(ConsoleError::missing_primary_key(state.name.as_str()));
        }
        let form = session
            .form
            .as_ref()
            .filter(|form| form.row_index.is_some())
            .ok_or_else(|| ConsoleError::nothing_selected("Select a row to edit first."))?;

        let assignments = form.changes(values)?;
        let stmt = builder::update_row(
            self.database.db_type(),
            &state.name,
            &assignments,
            &form.key_params(),
            &state.column_types,
        )?;
        let rows_affected = self
            .executor
            .execute(self.database.pool(), &stmt.sql, &stmt.params)
            .await?;
        if rows_affected == 0 {
            warn!(table = %state.name, key = ?form.key, "Update matched no rows");
            return Err(ConsoleError::no_row_matched(state.name.as_str()));
        }
        info!(table = %state.name, rows_affected, "Updated row");

        self.finish_mutation(session, rows_affected, "Row updated successfully.")
            .await
    }

    /// Insert the form's values as a new row.
    ///
    /// Without a selected row a blank form for the table is used.
    pub async fn submit_insert(
        &self,
        session: &mut BrowserSession,
        values: &HashMap<String, Option<String>>,
    ) -> ConsoleResult<MutationOutcome> {
        let state = selected_table(session)?;
        let form = match &session.form {
            Some(form) => form.clone(),
            None => EditForm::blank(&state.name, &state.primary_keys, &state.column_types),
        };

        let row = form.values(values)?;
        let stmt = builder::insert_row(
            self.database.db_type(),
            &state.name,
            &row,
            &state.column_types,
        );
        let rows_affected = self
            .executor
            .execute(self.database.pool(), &stmt.sql, &stmt.params)
            .await?;
        info!(table = %state.name, rows_affected, "Inserted row");

        self.finish_mutation(session, rows_affected, "New record inserted successfully.")
            .await
    }

    /// Refresh the grid with the active filters and close the form.
    async fn finish_mutation(
        &self,
        session: &mut BrowserSession,
        rows_affected: u64,
        message: &str,
    ) -> ConsoleResult<MutationOutcome> {
        let state = selected_table(session)?;
        let stmt = self.filtered_select(&state.name, &state.filters);
        let result = self
            .executor
            .fetch(self.database.pool(), &stmt.sql, &stmt.params)
            .await?;

        let state = session
            .table
            .as_mut()
            .ok_or_else(|| ConsoleError::internal("table state vanished"))?;
        state.rows = result.rows;
        state.truncated = result.truncated;
        let grid = state.view(self.executor.row_limit());
        session.form = None;

        Ok(MutationOutcome {
            rows_affected,
            grid,
            notice: Notice::info(message),
        })
    }

    fn filtered_select(&self, table: &TableName, filters: &FilterSet) -> SqlStatement {
        let db = self.database.db_type();
        if filters.is_active() {
            builder::select_filtered(db, table, filters.active())
        } else {
            builder::select_all(db, table)
        }
    }
}

fn selected_table(session: &BrowserSession) -> ConsoleResult<&TableState> {
    session
        .table
        .as_ref()
        .ok_or_else(|| ConsoleError::nothing_selected("Select a table first."))
}
