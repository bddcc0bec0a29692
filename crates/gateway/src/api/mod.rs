pub mod notices;
pub mod promotions;
pub mod scope;

use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the full API router.
///
/// Notice routes are public and scoped to the caller's session.  Admin
/// routes are gated per handler by [`scope::AdminGuard`].
pub fn router() -> Router<AppState> {
    let notices = Router::new()
        .route(
            "/v1/notices",
            get(notices::get_notices)
                .post(notices::add_notices)
                .delete(notices::clear_notices),
        )
        .route("/v1/notices/show", get(notices::show_notices))
        .route("/v1/notices/pending", get(notices::pending_notices))
        .route("/v1/notices/timeouts", get(notices::get_timeouts));

    let admin = Router::new()
        .route("/v1/admin/addons/note", get(promotions::addon_note))
        .route(
            "/v1/admin/addons/note/dismiss",
            post(promotions::dismiss_addon_note),
        )
        .route("/v1/admin/addons/refresh", get(promotions::addon_refresh))
        .route(
            "/v1/admin/cache/dismiss-conflict",
            post(promotions::dismiss_cache_conflict),
        );

    Router::new()
        .route("/health", get(health))
        .merge(notices)
        .merge(admin)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
