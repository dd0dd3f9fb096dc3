//! Per-browser UI state and the in-memory session store.

use crate::console::form::EditForm;
use crate::console::grid::{FilterSet, GridView};
use crate::console::notice::Notice;
use crate::models::{ColumnTypes, PrimaryKeySet, RowProjection, TableName};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Everything known about the selected table.
#[derive(Debug, Clone)]
pub struct TableState {
    pub name: TableName,
    pub primary_keys: PrimaryKeySet,
    pub column_types: ColumnTypes,
    pub filters: FilterSet,
    pub rows: Vec<RowProjection>,
    pub truncated: bool,
}

impl TableState {
    /// The grid for the page; `row_limit` is the cap the rows were fetched with.
    pub fn view(&self, row_limit: u32) -> GridView {
        GridView {
            table: self.name.clone(),
            columns: self.column_types.columns().to_vec(),
            primary_keys: self.primary_keys.clone(),
            rows: self.rows.clone(),
            truncated: self.truncated,
            filters: self.filters.clone(),
            notice: self.truncated.then(|| Notice::truncated(row_limit)),
        }
    }
}

/// UI state of one browser.
#[derive(Debug, Default)]
pub struct BrowserSession {
    pub table: Option<TableState>,
    pub form: Option<EditForm>,
}

pub type SharedSession = Arc<Mutex<BrowserSession>>;

#[derive(Debug)]
struct SessionEntry {
    session: SharedSession,
    last_seen: Instant,
}

/// Sessions keyed by cookie id.
///
/// Idle sessions are dropped when a new session is created.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Look up the session for `id`, or start a new one.
    ///
    /// Returns the id to hand back to the browser, which differs from `id`
    /// when the old session expired or never existed.
    pub async fn get_or_create(&self, id: Option<&str>) -> (String, SharedSession) {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(id) {
                if now.duration_since(entry.last_seen) < self.idle_timeout {
                    entry.last_seen = now;
                    return (id.to_string(), entry.session.clone());
                }
            }
        }

        let before = sessions.len();
        let idle_timeout = self.idle_timeout;
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < idle_timeout);
        if sessions.len() < before {
            debug!(purged = before - sessions.len(), "Purged idle sessions");
        }

        let id = uuid::Uuid::new_v4().to_string();
        let session = SharedSession::default();
        sessions.insert(
            id.clone(),
            SessionEntry {
                session: session.clone(),
                last_seen: now,
            },
        );
        debug!(session_id = %id, active = sessions.len(), "Created session");
        (id, session)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
