//! JSON API handlers.
//!
//! Handlers lock the caller's session for the whole request, so requests of
//! one browser run one at a time.

use crate::console::{EditForm, GridView, MutationOutcome, RunOutput, SharedSession};
use crate::error::BoundaryError;
use crate::models::{ConnectionInfo, TableName};
use crate::server::AppState;
use axum::Json;
use axum::extract::State;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const SESSION_COOKIE: &str = "db_console_session";

type ApiResult<T> = (CookieJar, Result<Json<T>, BoundaryError>);

#[derive(Debug, Deserialize)]
pub struct SelectTableRequest {
    pub table: String,
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub filters: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectRowRequest {
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct FormRequest {
    #[serde(default)]
    pub values: HashMap<String, Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SqlRequest {
    pub sql: String,
}

#[derive(Debug, Serialize)]
pub struct TablesResponse {
    pub tables: Vec<TableName>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: ConnectionInfo,
}

fn session_cookie(id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Resolve the caller's session, issuing a cookie when a new one was created.
async fn open_session(state: &AppState, jar: CookieJar) -> (CookieJar, SharedSession) {
    let current = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned());
    let (id, session) = state.sessions.get_or_create(current.as_deref()).await;
    if current.as_deref() == Some(id.as_str()) {
        (jar, session)
    } else {
        (jar.add(session_cookie(id)), session)
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        database: state.database.info(),
    })
}

pub async fn list_tables(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<TablesResponse> {
    let (jar, _session) = open_session(&state, jar).await;
    let result = state
        .browser
        .list_tables()
        .await
        .map(|tables| Json(TablesResponse { tables }))
        .map_err(|e| e.during("Error loading data"));
    (jar, result)
}

pub async fn select_table(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SelectTableRequest>,
) -> ApiResult<GridView> {
    let (jar, session) = open_session(&state, jar).await;
    let mut session = session.lock().await;
    let result = state
        .browser
        .select_table(&mut session, &req.table)
        .await
        .map(Json)
        .map_err(|e| e.during("Error loading data"));
    (jar, result)
}

pub async fn apply_filters(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<FilterRequest>,
) -> ApiResult<GridView> {
    let (jar, session) = open_session(&state, jar).await;
    let mut session = session.lock().await;
    let result = state
        .browser
        .apply_filters(&mut session, &req.filters)
        .await
        .map(Json)
        .map_err(|e| e.during("Error applying filters"));
    (jar, result)
}

pub async fn select_row(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SelectRowRequest>,
) -> ApiResult<EditForm> {
    let (jar, session) = open_session(&state, jar).await;
    let mut session = session.lock().await;
    let result = state
        .browser
        .select_row(&mut session, req.index)
        .map(Json)
        .map_err(BoundaryError::from);
    (jar, result)
}

pub async fn submit_update(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<FormRequest>,
) -> ApiResult<MutationOutcome> {
    let (jar, session) = open_session(&state, jar).await;
    let mut session = session.lock().await;
    let result = state
        .browser
        .submit_update(&mut session, &req.values)
        .await
        .map(Json)
        .map_err(|e| e.during("Error updating data"));
    (jar, result)
}

pub async fn submit_insert(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<FormRequest>,
) -> ApiResult<MutationOutcome> {
    let (jar, session) = open_session(&state, jar).await;
    let mut session = session.lock().await;
    let result = state
        .browser
        .submit_insert(&mut session, &req.values)
        .await
        .map(Json)
        .map_err(|e| e.during("Error inserting data"));
    (jar, result)
}

pub async fn run_sql(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<SqlRequest>,
) -> ApiResult<RunOutput> {
    let (jar, _session) = open_session(&state, jar).await;
    let result = state
        .runner
        .run(&req.sql)
        .await
        .map(Json)
        .map_err(|e| e.during("Error executing query"));
    (jar, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
    }

    #[test]
    fn test_form_request_accepts_nulls() {
        let req: FormRequest =
            serde_json::from_str(r#"{"values": {"name": "b", "nickname": null}}"#).unwrap();
        assert_eq!(req.values.get("name"), Some(&Some("b".to_string())));
        assert_eq!(req.values.get("nickname"), Some(&None));

        let empty: FormRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.values.is_empty());
    }
}
