//! The two console features and the per-browser state they operate on.
//!
//! - [`browser::TableBrowser`]: pick a table, filter, edit, insert
//! - [`runner::SqlRunner`]: run typed SQL behind a keyword blocklist

pub mod browser;
pub mod form;
pub mod grid;
pub mod notice;
pub mod runner;
pub mod session;

pub use browser::{MutationOutcome, TableBrowser};
pub use form::{EditForm, FormField};
pub use grid::{FilterField, FilterSet, GridView};
pub use notice::{Notice, NoticeLevel};
pub use runner::{RunOutput, SqlRunner};
pub use session::{BrowserSession, SessionStore, SharedSession, TableState};
