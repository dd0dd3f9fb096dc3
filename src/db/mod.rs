//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - Connection pool management
//! - Query execution
//! - Catalog introspection
//! - Type mappings and row projection
//! - Parameter binding

pub mod executor;
pub mod params;
pub mod pool;
pub mod schema;
pub mod types;

pub use executor::QueryExecutor;
pub use pool::{Database, DbPool};
pub use schema::SchemaInspector;
