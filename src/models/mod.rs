//! Data models for the database console.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod projection;
pub mod query;
pub mod table;

// Re-export commonly used types
pub use connection::{ConnectionConfig, ConnectionConfigError, ConnectionInfo, DatabaseType};
pub use projection::{RowProjection, cell_text, unique_labels};
pub use query::{
    ColumnMetadata, DEFAULT_QUERY_TIMEOUT_SECS, DEFAULT_ROW_LIMIT, MAX_ROW_LIMIT, QueryParam,
    ResultSet,
};
pub use table::{ColumnTypes, PrimaryKeySet, TableName};
