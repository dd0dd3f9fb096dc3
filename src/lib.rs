//! DB Console Library
//!
//! A minimal web console for one SQL database (SQLite, PostgreSQL, MySQL):
//! browse and edit tables, and run guarded ad-hoc SQL.

pub mod config;
pub mod console;
pub mod db;
pub mod error;
pub mod models;
pub mod server;
pub mod sql;

pub use config::Config;
pub use error::ConsoleError;
