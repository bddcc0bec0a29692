//! Request-scoped extractors.
//!
//! - [`RequestScope`]: the visitor's session token plus the ajax/admin flags
//!   a notice store needs.
//! - [`AdminGuard`]: rejects admin routes without a valid bearer token.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use nb_domain::notice::{RequestContext, SessionToken};

use crate::state::AppState;

pub const SESSION_HEADER: &str = "x-session-token";
pub const ADMIN_CONTEXT_HEADER: &str = "x-admin-context";

/// Session identity and request flags, resolved from headers.
///
/// The session token comes from `X-Session-Token`, or failing that from the
/// configured session cookie.  `X-Requested-With: XMLHttpRequest` marks the
/// request as ajax.  Admin context requires a valid admin bearer token; in
/// dev mode (no token configured) `X-Admin-Context: 1` is enough.
#[derive(Debug, Clone, Default)]
pub struct RequestScope {
    pub session: SessionToken,
    pub context: RequestContext,
}

#[async_trait]
impl FromRequestParts<AppState> for RequestScope {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;

        let session = header_str(headers, SESSION_HEADER)
            .map(str::to_owned)
            .or_else(|| cookie_value(headers, &state.config.server.session_cookie))
            .into();

        let is_ajax = header_str(headers, "x-requested-with")
            .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));

        let is_admin = match &state.admin_token_hash {
            Some(expected) => bearer_matches(headers, expected),
            None => header_str(headers, ADMIN_CONTEXT_HEADER)
                .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
        };

        Ok(RequestScope {
            session,
            context: RequestContext { is_ajax, is_admin },
        })
    }
}

/// Axum extractor that enforces the admin bearer token.
///
/// If no admin token is configured (dev mode), all requests pass.
pub struct AdminGuard;

#[async_trait]
impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let expected_hash = match &state.admin_token_hash {
            Some(h) => h,
            None => return Ok(AdminGuard),
        };

        if !bearer_matches(&parts.headers, expected_hash) {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "invalid admin token" })),
            ));
        }
        Ok(AdminGuard)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Hash the provided bearer token and compare in constant time, so neither
/// the token nor its length leaks through timing.
fn bearer_matches(headers: &HeaderMap, expected_hash: &[u8]) -> bool {
    let provided = header_str(headers, "authorization")
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");
    let provided_hash = Sha256::digest(provided.as_bytes());
    bool::from(provided_hash.ct_eq(expected_hash))
}

/// Value of cookie `name` across all `Cookie` headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all("cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
