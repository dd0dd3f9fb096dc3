//! HTTP surface: two pages and the JSON API behind them.
//!
//! Every request is tied to a browser session through the
//! `db_console_session` cookie. Failures leave as a JSON notice.

pub mod handlers;
pub mod pages;

use crate::console::{SessionStore, SqlRunner, TableBrowser};
use crate::db::{Database, QueryExecutor};
use crate::error::{ConsoleError, ConsoleResult};
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub database: Arc<Database>,
    pub browser: TableBrowser,
    pub runner: SqlRunner,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(database: Arc<Database>, executor: QueryExecutor, session_idle: Duration) -> Self {
        Self {
            browser: TableBrowser::new(database.clone(), executor.clone()),
            runner: SqlRunner::new(database.clone(), executor),
            sessions: Arc::new(SessionStore::new(session_idle)),
            database,
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::browser_page))
        .route("/sqllite", get(pages::runner_page))
        .route("/health", get(handlers::health))
        .route("/api/tables", get(handlers::list_tables))
        .route("/api/browser/table", post(handlers::select_table))
        .route("/api/browser/filter", post(handlers::apply_filters))
        .route("/api/browser/row", post(handlers::select_row))
        .route("/api/browser/update", post(handlers::submit_update))
        .route("/api/browser/insert", post(handlers::submit_insert))
        .route("/api/sql", post(handlers::run_sql))
        .with_state(state)
}

/// Serves the console until SIGINT or SIGTERM, then closes the pool.
pub struct HttpServer {
    state: AppState,
    host: String,
    port: u16,
}

impl HttpServer {
    pub fn new(state: AppState, host: impl Into<String>, port: u16) -> Self {
        Self {
            state,
            host: host.into(),
            port,
        }
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub async fn run(&self) -> ConsoleResult<()> {
        let bind_addr = self.bind_addr();
        let app = router(self.state.clone());

        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            ConsoleError::connection(
                format!("Failed to bind to {}: {}", bind_addr, e),
                "Check that the port is available",
            )
        })?;
        info!(addr = %bind_addr, "Console listening");

        // Keep-alive connections may hold the server open, so force exit after a timeout
        const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(30);

        let shutdown_notify = Arc::new(tokio::sync::Notify::new());
        let shutdown_notify_clone = shutdown_notify.clone();
        let shutdown_signal = async move {
            wait_for_signal().await;
            shutdown_notify_clone.notify_one();
        };

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal);

        tokio::select! {
            result = server => {
                match result {
                    Ok(()) => info!("HTTP server stopped"),
                    Err(e) => {
                        error!(error = %e, "HTTP server error");
                        return Err(ConsoleError::internal(format!("HTTP server error: {}", e)));
                    }
                }
            }
            _ = async {
                shutdown_notify.notified().await;
                info!(
                    timeout_secs = GRACEFUL_TIMEOUT.as_secs(),
                    "Waiting for connections to close (send signal again to force exit)..."
                );
                tokio::select! {
                    _ = tokio::time::sleep(GRACEFUL_TIMEOUT) => {
                        warn!("Graceful shutdown timeout, forcing exit");
                    }
                    _ = wait_for_signal() => {
                        warn!("Received second signal, forcing immediate exit");
                    }
                }
            } => {}
        }

        self.state.database.close().await;
        Ok(())
    }
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_signal() {
    let ctrl_c = signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
