//! HTTP route handlers for the journal server.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;

use super::error::ApiError;
use super::metrics::Metrics;
use super::response::{ResponseFormat, render_entries};
use crate::JournalDb;
use crate::model::Scope;
use crate::reader::JournalRead;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub journal: Arc<JournalDb>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(journal: Arc<JournalDb>, metrics: Arc<Metrics>) -> Self {
        Self { journal, metrics }
    }
}

/// Handle GET /route/{scope}
///
/// Renders the scope's entries as HTML, or as JSON when the `Accept` header
/// asks for `application/json`.
pub async fn handle_entries(
    State(state): State<AppState>,
    Path(scope): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let format = ResponseFormat::from_headers(&headers);
    let scope = Scope::new(scope)?;

    let entries = state.journal.entries(&scope).await?;

    let decode_errors = entries.iter().filter(|e| e.is_placeholder()).count();
    state
        .metrics
        .journal_entries_scanned_total
        .inc_by(entries.len() as u64);
    state
        .metrics
        .journal_decode_errors_total
        .inc_by(decode_errors as u64);

    render_entries(&scope, &entries, format)
        .map_err(|e| ApiError::internal("failed to render entries", e))
}

/// Handle GET /route and /route/
///
/// Rejects the request without touching storage.
pub async fn handle_missing_scope() -> ApiError {
    ApiError::MissingScope
}

/// Handle GET /metrics
pub async fn handle_metrics(State(state): State<AppState>) -> String {
    state.metrics.encode()
}

/// Handle GET /-/healthy
pub async fn handle_healthy() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Handle GET /-/ready
///
/// The journal is opened before the server starts, so a running server is
/// ready.
pub async fn handle_ready(State(_state): State<AppState>) -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
