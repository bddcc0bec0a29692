//! Request-scoped notice store.
//!
//! One `NoticeStore` lives for one request.  Construction fixes the set of
//! notice types; [`NoticeStore::load`] binds the visitor's session token and
//! merges whatever an earlier request left in the log.  Producers then call
//! [`NoticeStore::add_one`] / [`NoticeStore::add_many`]; the response either
//! renders the notices (which clears them) or leaves them in the log for the
//! next request.
//!
//! Every operation is best-effort: collaborator failures are logged and
//! swallowed, and the boolean results only report whether a session was
//! present.

use std::collections::BTreeMap;
use std::sync::Arc;

use nb_domain::config::NoticesConfig;
use nb_domain::notice::{
    resolve_types, token_fingerprint, NoticeType, RequestContext, SessionToken,
};
use nb_domain::trace::TraceEvent;

use crate::buffer::NoticeBuffer;
use crate::log::{LogRecord, NoticeLog};
use crate::phrases::{interpolate, PhraseBook};
use crate::render::{self, PassThrough, Sanitize};

/// Auto-dismiss delay in milliseconds per notice type.
pub type TimeoutTable = BTreeMap<NoticeType, u64>;

/// Convenience for `add_one` calls without substitutions.
pub const NO_ARGS: &[&str] = &[];

pub struct NoticeStore {
    config: NoticesConfig,
    types: Vec<NoticeType>,
    timeouts: TimeoutTable,
    notices: NoticeBuffer,
    session: SessionToken,
    ctx: RequestContext,
    log: Arc<dyn NoticeLog>,
    phrases: Arc<dyn PhraseBook>,
    sanitizer: Arc<dyn Sanitize>,
}

impl NoticeStore {
    pub fn new(
        config: &NoticesConfig,
        log: Arc<dyn NoticeLog>,
        phrases: Arc<dyn PhraseBook>,
    ) -> Self {
        let types = resolve_types(&config.additional_types);
        let notices = NoticeBuffer::with_types(&types);
        Self {
            config: config.clone(),
            types,
            timeouts: TimeoutTable::new(),
            notices,
            session: SessionToken::absent(),
            ctx: RequestContext::default(),
            log,
            phrases,
            sanitizer: Arc::new(PassThrough),
        }
    }

    /// Replace the message filter used by [`NoticeStore::show`].
    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn Sanitize>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Bind the request's session and flags, and merge notices persisted by
    /// earlier requests of the same session.
    pub fn load(&mut self, session: SessionToken, ctx: RequestContext) {
        if self.timeouts.is_empty() {
            self.timeouts = self
                .types
                .iter()
                .map(|t| (t.clone(), self.resolve_timeout(t)))
                .collect();
        }
        self.session = session;
        self.ctx = ctx;

        let Some(sid) = self.session.get().map(str::to_owned) else {
            return;
        };

        let rows = match self.log.query(&sid, &self.types) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(
                    session = %token_fingerprint(&sid),
                    error = %e,
                    "notice log query failed"
                );
                return;
            }
        };

        let row_count = rows.len();
        for (key, value) in rows {
            if value.trim().is_empty() {
                continue;
            }
            self.notices.extend_unique(&key, decode_value(&value));
        }

        if row_count > 0 {
            TraceEvent::NoticesLoaded {
                session: token_fingerprint(&sid),
                rows: row_count,
                messages: self.notices.len(),
            }
            .emit();
        }
    }

    /// Add one message.  `args`, when non-empty, are substituted into the
    /// resolved phrase printf-style.
    pub fn add_one(&mut self, message: &str, ty: &str, args: &[&str]) -> bool {
        self.add_many(&[message], ty, &[args])
    }

    /// Add several messages of one type.  `args_per_message[i]` pairs with
    /// `messages[i]`; messages without a (non-empty) argument set only go
    /// through phrase lookup.
    ///
    /// Returns `false` without touching anything when `messages` is empty or
    /// no session is bound.
    pub fn add_many(&mut self, messages: &[&str], ty: &str, args_per_message: &[&[&str]]) -> bool {
        if messages.is_empty() {
            return false;
        }
        let Some(sid) = self.session.get().map(str::to_owned) else {
            tracing::debug!("notice dropped: no session");
            return false;
        };

        let ty = NoticeType::new(ty);
        if !self.notices.has_slot(&ty) {
            tracing::debug!(notice_type = %ty, "notice type not registered, buffering for this request only");
            let timeout = self.resolve_timeout(&ty);
            self.timeouts.entry(ty.clone()).or_insert(timeout);
        }

        let resolved: Vec<String> = messages
            .iter()
            .enumerate()
            .map(|(i, msg)| {
                let phrase = self.phrases.phrase(msg);
                match args_per_message.get(i) {
                    Some(&args) if !args.is_empty() => interpolate(&phrase, args),
                    _ => phrase,
                }
            })
            .collect();

        self.notices.extend_unique(&ty, resolved.iter().cloned());

        let persisted = !self.ctx.is_ajax && self.persist(&sid, &ty, &resolved);

        TraceEvent::NoticeAdded {
            session: token_fingerprint(&sid),
            notice_type: ty.to_string(),
            messages: resolved.len(),
            persisted,
        }
        .emit();

        true
    }

    /// Empty the buffer and delete the session's log rows.  Returns `false`
    /// (and does nothing) when no session is bound.
    pub fn clear(&mut self) -> bool {
        let Some(sid) = self.session.get().map(str::to_owned) else {
            return false;
        };

        self.notices.reset();
        let rows_deleted = match self.log.delete_session(&sid) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(
                    session = %token_fingerprint(&sid),
                    error = %e,
                    "notice log delete failed"
                );
                0
            }
        };

        TraceEvent::NoticesCleared {
            session: token_fingerprint(&sid),
            rows_deleted,
        }
        .emit();

        true
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    /// Render every buffered notice as `<p class="{type}">{message}</p>` and
    /// clear the store.  Empty string when there is nothing to show.
    pub fn get_notices(&mut self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let out = render::notices_fragment(&self.notices);
        self.emit_rendered("fragment");
        self.clear();
        out
    }

    /// [`NoticeStore::get_notices`] with messages passed through the store's
    /// sanitizer, for hosts that emit the fragment as HTML.
    pub fn get_notices_sanitized(&mut self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let out = render::notices_fragment_with(&self.notices, self.sanitizer.as_ref());
        self.emit_rendered("fragment");
        self.clear();
        out
    }

    /// Render for the current context (admin blocks or front-end script)
    /// and clear the store.  Empty string when there is nothing to show.
    pub fn show(&mut self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let out = if self.ctx.is_admin {
            self.emit_rendered("admin");
            render::admin_markup(&self.notices, self.sanitizer.as_ref())
        } else {
            self.emit_rendered("frontend");
            render::frontend_script(&self.notices, self.sanitizer.as_ref())
        };
        self.clear();
        out
    }

    pub fn timeouts(&self) -> &TimeoutTable {
        &self.timeouts
    }

    /// Timeout for `ty`, falling back to the configured/default value for
    /// types that never made it into the table.
    pub fn timeout_for(&self, ty: &NoticeType) -> u64 {
        self.timeouts
            .get(ty)
            .copied()
            .unwrap_or_else(|| self.resolve_timeout(ty))
    }

    pub fn types(&self) -> &[NoticeType] {
        &self.types
    }

    pub fn notices(&self) -> &NoticeBuffer {
        &self.notices
    }

    pub fn session(&self) -> &SessionToken {
        &self.session
    }

    pub fn context(&self) -> RequestContext {
        self.ctx
    }

    // ── Private helpers ───────────────────────────────────────────────

    fn resolve_timeout(&self, ty: &NoticeType) -> u64 {
        self.config
            .timeout_override(ty)
            .unwrap_or_else(|| ty.default_timeout_ms())
    }

    fn persist(&self, sid: &str, ty: &NoticeType, resolved: &[String]) -> bool {
        let value = match serde_json::to_string(resolved) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "encoding notices failed");
                return false;
            }
        };
        match self.log.append(LogRecord::new(sid, ty.clone(), value)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    session = %token_fingerprint(&sid),
                    error = %e,
                    "notice log append failed"
                );
                false
            }
        }
    }

    fn emit_rendered(&self, target: &'static str) {
        TraceEvent::NoticesRendered {
            session: self.session.fingerprint().unwrap_or_default(),
            target,
            messages: render::visible(&self.notices).count(),
        }
        .emit();
    }
}

/// A stored value is either a JSON array of messages or one literal message.
fn decode_value(value: &str) -> Vec<String> {
    match serde_json::from_str::<serde_json::Value>(value) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => vec![value.to_owned()],
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
