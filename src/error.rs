//! Error types for the database console.
//!
//! Every failure is caught at the HTTP boundary and turned into a short-lived
//! notice for the user. Variants are split into validation problems (bad input,
//! nothing executed) and data-access problems (the database said no).

use crate::console::notice::Notice;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("{}", database_message(.message, .sql_state))]
    Database {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
    },

    #[error("Timeout: {operation} exceeded {elapsed_secs}s")]
    Timeout {
        operation: String,
        elapsed_secs: u64,
    },

    #[error("{message}")]
    InvalidInput { message: String },

    #[error(
        "The query contains forbidden SQL commands (DROP, TRUNCATE, DELETE): found '{keyword}'."
    )]
    ForbiddenSql { keyword: &'static str },

    #[error("Invalid table name: '{name}'")]
    InvalidTableName { name: String },

    #[error("Table '{name}' does not exist")]
    TableNotFound { name: String },

    #[error("Unknown column '{column}' in table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("Table {table} has no primary key, rows cannot be updated")]
    MissingPrimaryKey { table: String },

    #[error("No row at position {index} in the current grid")]
    RowNotFound { index: usize },

    #[error("{message}")]
    NothingSelected { message: String },

    #[error("No row matched the selected key in table {table}; reload the table and try again")]
    NoRowMatched { table: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn database_message(message: &str, sql_state: &Option<String>) -> String {
    match sql_state {
        Some(code) => format!("{} (SQLSTATE: {})", message, code),
        None => message.to_string(),
    }
}

impl ConsoleError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
        }
    }

    pub fn timeout(operation: impl Into<String>, elapsed_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_secs,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn forbidden_sql(keyword: &'static str) -> Self {
        Self::ForbiddenSql { keyword }
    }

    pub fn invalid_table_name(name: impl Into<String>) -> Self {
        Self::InvalidTableName { name: name.into() }
    }

    pub fn table_not_found(name: impl Into<String>) -> Self {
        Self::TableNotFound { name: name.into() }
    }

    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn missing_primary_key(table: impl Into<String>) -> Self {
        Self::MissingPrimaryKey {
            table: table.into(),
        }
    }

    pub fn row_not_found(index: usize) -> Self {
        Self::RowNotFound { index }
    }

    pub fn nothing_selected(message: impl Into<String>) -> Self {
        Self::NothingSelected {
            message: message.into(),
        }
    }

    pub fn no_row_matched(table: impl Into<String>) -> Self {
        Self::NoRowMatched {
            table: table.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// True for errors raised before anything reached the database.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::ForbiddenSql { .. }
                | Self::InvalidTableName { .. }
                | Self::TableNotFound { .. }
                | Self::UnknownColumn { .. }
                | Self::MissingPrimaryKey { .. }
                | Self::RowNotFound { .. }
                | Self::NothingSelected { .. }
        )
    }

    /// HTTP status used when this error crosses the HTTP boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::TableNotFound { .. } | Self::RowNotFound { .. } => StatusCode::NOT_FOUND,
            Self::NoRowMatched { .. } => StatusCode::CONFLICT,
            _ if self.is_validation() => StatusCode::BAD_REQUEST,
            Self::Database { .. } | Self::Connection { .. } => StatusCode::BAD_GATEWAY,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Attach the user-facing context ("Error updating data", ...) for the notice.
    pub fn during(self, context: &'static str) -> BoundaryError {
        BoundaryError {
            context: Some(context),
            error: self,
        }
    }
}

/// Convert sqlx errors to ConsoleError.
impl From<sqlx::Error> for ConsoleError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => ConsoleError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                ConsoleError::database(db_err.message(), code)
            }
            sqlx::Error::RowNotFound => ConsoleError::database("No rows returned", None),
            sqlx::Error::PoolTimedOut => ConsoleError::timeout("connection pool acquire", 30),
            sqlx::Error::PoolClosed => {
                ConsoleError::connection("Connection pool is closed", "Restart the console")
            }
            sqlx::Error::Io(io_err) => ConsoleError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => ConsoleError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => ConsoleError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::ColumnNotFound(col) => {
                ConsoleError::database(format!("Column not found: {}", col), None)
            }
            sqlx::Error::ColumnDecode { index, source } => {
                ConsoleError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => {
                ConsoleError::internal(format!("Decode error: {}", source))
            }
            sqlx::Error::WorkerCrashed => ConsoleError::internal("Database worker crashed"),
            _ => ConsoleError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for console operations.
pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Body returned with every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub notice: Notice,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A [`ConsoleError`] on its way out of a request handler.
#[derive(Debug)]
pub struct BoundaryError {
    context: Option<&'static str>,
    error: ConsoleError,
}

impl BoundaryError {
    pub fn error(&self) -> &ConsoleError {
        &self.error
    }

    /// The message shown to the user.
    ///
    /// Validation messages are shown as-is; data-access failures get the context prefix.
    pub fn message(&self) -> String {
        match self.context {
            Some(context) if !self.error.is_validation() => {
                format!("{}: {}", context, self.error)
            }
            _ => self.error.to_string(),
        }
    }
}

impl From<ConsoleError> for BoundaryError {
    fn from(error: ConsoleError) -> Self {
        Self {
            context: None,
            error,
        }
    }
}

impl IntoResponse for BoundaryError {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let message = self.message();

        if status.is_server_error() {
            error!(status = %status, error = ?self.error, "{}", message);
        } else {
            warn!(status = %status, "{}", message);
        }

        let body = ErrorBody {
            notice: Notice::error(message),
            suggestion: self.error.suggestion().map(String::from),
        };
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        BoundaryError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConsoleError::connection("Failed to connect", "Check credentials");
        assert!(err.to_string().contains("Connection failed"));
        assert_eq!(err.suggestion(), Some("Check credentials"));
    }

    #[test]
    fn test_database_error_includes_sql_state() {
        let err = ConsoleError::database("syntax error", Some("42601".to_string()));
        assert_eq!(err.to_string(), "syntax error (SQLSTATE: 42601)");
    }

    #[test]
    fn test_validation_errors_map_to_bad_request() {
        for err in [
            ConsoleError::invalid_input("Please enter a valid SQL query."),
            ConsoleError::forbidden_sql("DROP"),
            ConsoleError::invalid_table_name("users; --"),
            ConsoleError::unknown_column("users", "nope"),
            ConsoleError::missing_primary_key("notes"),
            ConsoleError::nothing_selected("Select a row first"),
        ] {
            assert!(err.is_validation(), "{err:?}");
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_data_access_status_codes() {
        assert_eq!(
            ConsoleError::row_not_found(4).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ConsoleError::table_not_found("ghosts").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ConsoleError::no_row_matched("accounts").status_code(),
            StatusCode::CONFLICT
        );
        assert!(!ConsoleError::no_row_matched("accounts").is_validation());
        assert_eq!(
            ConsoleError::database("boom", None).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ConsoleError::timeout("query", 30).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ConsoleError::internal("oops").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_boundary_message_prefixes_context() {
        let err = ConsoleError::database("no such table: ghosts", None).during("Error loading data");
        assert_eq!(err.message(), "Error loading data: no such table: ghosts");

        let bare = BoundaryError::from(ConsoleError::invalid_input("Please enter a valid SQL query."));
        assert_eq!(bare.message(), "Please enter a valid SQL query.");

        let validation =
            ConsoleError::invalid_input("Please enter a valid SQL query.").during("Error executing query");
        assert_eq!(validation.message(), "Please enter a valid SQL query.");
    }

    #[test]
    fn test_forbidden_message_names_keyword() {
        let err = ConsoleError::forbidden_sql("TRUNCATE");
        assert!(err.to_string().contains("forbidden SQL commands"));
        assert!(err.to_string().contains("TRUNCATE"));
    }
}
