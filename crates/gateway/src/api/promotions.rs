//! Admin-only endpoints for the addon banner and cache-conflict dismissal.
//!
//! - `GET  /v1/admin/addons/note`: banner markup (empty if none due)
//! - `POST /v1/admin/addons/note/dismiss`: acknowledge the current catalog
//! - `GET  /v1/admin/addons/refresh`: whether the addons page is stale
//! - `POST /v1/admin/cache/dismiss-conflict`: exclude cache plugins from warnings

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use serde::Deserialize;

use crate::api::scope::AdminGuard;
use crate::state::AppState;

/// Build a standardized JSON error response: `{ "error": "<message>" }`.
fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

pub async fn addon_note(_guard: AdminGuard, State(state): State<AppState>) -> Response {
    match state.addon_notes().note_markup() {
        Ok(markup) => Html(markup.unwrap_or_default()).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "addon note check failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub async fn dismiss_addon_note(_guard: AdminGuard, State(state): State<AppState>) -> Response {
    match state.addon_notes().dismiss() {
        Ok(()) => Json(serde_json::json!({ "dismissed": true })).into_response(),
        Err(e) => api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

pub async fn addon_refresh(_guard: AdminGuard, State(state): State<AppState>) -> Response {
    match state.addon_notes().needs_refresh() {
        Ok(needs_refresh) => {
            Json(serde_json::json!({ "needs_refresh": needs_refresh })).into_response()
        }
        Err(e) => api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

#[derive(Debug, Deserialize)]
pub struct DismissConflictBody {
    /// Cache plugins currently active without a forum exclusion rule.
    #[serde(default)]
    pub plugins: Vec<String>,
}

pub async fn dismiss_cache_conflict(
    _guard: AdminGuard,
    State(state): State<AppState>,
    Json(body): Json<DismissConflictBody>,
) -> Response {
    match state.cache_conflicts().dismiss(&body.plugins) {
        Ok(excluded) => Json(serde_json::json!({ "excluded": excluded })).into_response(),
        Err(e) => api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
