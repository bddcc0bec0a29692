//! Notice endpoints.
//!
//! - `POST   /v1/notices`: add one or more messages of one type
//! - `GET    /v1/notices`: render as escaped `<p class>` fragment and clear
//! - `GET    /v1/notices/show`: render for the request context and clear
//! - `GET    /v1/notices/pending`: inspect without clearing
//! - `GET    /v1/notices/timeouts`: auto-dismiss delays per type
//! - `DELETE /v1/notices`: clear
//!
//! Each request gets its own `NoticeStore`, bound to the session resolved by
//! [`RequestScope`].

use std::collections::BTreeMap;

use axum::extract::State;
use axum::response::{Html, IntoResponse, Json};
use serde::Deserialize;

use crate::api::scope::RequestScope;
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/notices
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct AddNoticesBody {
    /// Single message shorthand; prepended to `messages`.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub messages: Vec<String>,
    /// Notice type (`neutral` when omitted).
    #[serde(default, rename = "type")]
    pub notice_type: Option<String>,
    /// Substitution arguments, one set per message, paired by position.
    #[serde(default)]
    pub args: Vec<Vec<String>>,
}

pub async fn add_notices(
    State(state): State<AppState>,
    scope: RequestScope,
    Json(body): Json<AddNoticesBody>,
) -> impl IntoResponse {
    let messages: Vec<&str> = body
        .message
        .iter()
        .chain(body.messages.iter())
        .map(String::as_str)
        .collect();
    let args: Vec<Vec<&str>> = body
        .args
        .iter()
        .map(|set| set.iter().map(String::as_str).collect())
        .collect();
    let arg_sets: Vec<&[&str]> = args.iter().map(Vec::as_slice).collect();
    let ty = body.notice_type.as_deref().unwrap_or("neutral");

    let mut store = state.notice_store(&scope);
    let added = store.add_many(&messages, ty, &arg_sets);

    Json(serde_json::json!({ "added": added }))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/notices, GET /v1/notices/show
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn get_notices(State(state): State<AppState>, scope: RequestScope) -> Html<String> {
    Html(state.notice_store(&scope).get_notices_sanitized())
}

pub async fn show_notices(State(state): State<AppState>, scope: RequestScope) -> Html<String> {
    Html(state.notice_store(&scope).show())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/notices/pending
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn pending_notices(
    State(state): State<AppState>,
    scope: RequestScope,
) -> impl IntoResponse {
    let store = state.notice_store(&scope);
    let notices: BTreeMap<&str, &[String]> = store
        .notices()
        .iter()
        .filter(|(_, msgs)| !msgs.is_empty())
        .map(|(ty, msgs)| (ty.as_str(), msgs))
        .collect();

    Json(serde_json::json!({
        "session": scope.session.is_present(),
        "empty": store.is_empty(),
        "notices": notices,
    }))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/notices/timeouts
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn get_timeouts(State(state): State<AppState>, scope: RequestScope) -> impl IntoResponse {
    let store = state.notice_store(&scope);
    Json(store.timeouts().clone())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DELETE /v1/notices
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn clear_notices(State(state): State<AppState>, scope: RequestScope) -> impl IntoResponse {
    let cleared = state.notice_store(&scope).clear();
    Json(serde_json::json!({ "cleared": cleared }))
}
