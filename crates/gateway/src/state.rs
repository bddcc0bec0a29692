use std::sync::Arc;

use nb_domain::config::Config;
use nb_notices::{
    AddonNotes, CacheConflicts, EscapeHtml, NoticeLog, NoticeStore, PhraseBook, SettingsStore,
};

use crate::api::scope::RequestScope;

/// Shared application state passed to all API handlers.
///
/// Everything here outlives a single request.  Per-request notice stores
/// are built from it on demand via [`AppState::notice_store`].
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    // ── Collaborators ────────────────────────────────────────────────
    pub log: Arc<dyn NoticeLog>,
    pub settings: Arc<dyn SettingsStore>,
    pub phrases: Arc<dyn PhraseBook>,

    // ── Security (startup-computed) ───────────────────────────────────
    /// SHA-256 hash of the admin bearer token (read once at startup).
    /// `None` = dev mode (admin endpoints accessible without auth).
    pub admin_token_hash: Option<Vec<u8>>,
}

impl AppState {
    /// A notice store bound to the request's session and flags, with any
    /// notices left by earlier requests already merged in.
    pub fn notice_store(&self, scope: &RequestScope) -> NoticeStore {
        let mut store = NoticeStore::new(
            &self.config.notices,
            self.log.clone(),
            self.phrases.clone(),
        )
        .with_sanitizer(Arc::new(EscapeHtml));
        store.load(scope.session.clone(), scope.context);
        store
    }

    pub fn addon_notes(&self) -> AddonNotes {
        AddonNotes::new(self.settings.clone(), self.config.promotions.clone())
    }

    pub fn cache_conflicts(&self) -> CacheConflicts {
        CacheConflicts::new(self.settings.clone(), &self.config.promotions)
    }
}
