//! SQL text handling: dialect quoting, statement synthesis, the runner
//! blocklist and statement classification.

pub mod blocklist;
pub mod builder;
pub mod classify;
pub mod dialect;

pub use blocklist::{check_sql, find_forbidden_keyword};
pub use builder::{SqlStatement, StatementBuilder};
pub use classify::{StatementKind, classify};
