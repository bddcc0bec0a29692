//! Notice types and session identity.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Built-in notice types, in registration order.
pub const BUILTIN_TYPES: [&str; 3] = ["neutral", "error", "success"];

/// Auto-dismiss delay used for every type without a dedicated default.
pub const DEFAULT_TIMEOUT_MS: u64 = 8000;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// NoticeType
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity/category label for a notice (`neutral`, `success`, `error`, or
/// any configured extra).  Always stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NoticeType(String);

impl NoticeType {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    pub fn neutral() -> Self {
        Self("neutral".into())
    }

    pub fn success() -> Self {
        Self("success".into())
    }

    pub fn error() -> Self {
        Self("error".into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_builtin(&self) -> bool {
        BUILTIN_TYPES.contains(&self.0.as_str())
    }

    /// Milliseconds before the client auto-dismisses a notice of this type
    /// when no override is configured.  `0` means never.
    pub fn default_timeout_ms(&self) -> u64 {
        match self.0.as_str() {
            "success" => 4000,
            "neutral" => 0,
            _ => DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Default for NoticeType {
    fn default() -> Self {
        Self::neutral()
    }
}

impl fmt::Display for NoticeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NoticeType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NoticeType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NoticeType {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<NoticeType> for String {
    fn from(t: NoticeType) -> Self {
        t.0
    }
}

/// Build the full type list: built-ins first, then `extra` in order.
/// Names are lower-cased, blanks dropped, duplicates removed (first wins).
pub fn resolve_types<S: AsRef<str>>(extra: &[S]) -> Vec<NoticeType> {
    let mut types: Vec<NoticeType> = Vec::with_capacity(BUILTIN_TYPES.len() + extra.len());
    let candidates = BUILTIN_TYPES
        .iter()
        .copied()
        .chain(extra.iter().map(|s| s.as_ref()));
    for name in candidates {
        let t = NoticeType::new(name);
        if !t.is_blank() && !types.contains(&t) {
            types.push(t);
        }
    }
    types
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session identity
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionToken(Option<String>);

impl SessionToken {
    /// Wrap a raw token.  Blank tokens are treated as absent.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.trim().is_empty() {
            Self(None)
        } else {
            Self(Some(raw))
        }
    }

    pub fn absent() -> Self {
        Self(None)
    }

    pub fn get(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    /// Loggable stand-in for the token.  `None` when absent.
    pub fn fingerprint(&self) -> Option<String> {
        self.0.as_deref().map(token_fingerprint)
    }
}

/// First 12 hex digits of the token's SHA-256.  The raw token is a bearer
/// credential for the session's notices and must not reach the logs.
pub fn token_fingerprint(raw: &str) -> String {
    Sha256::digest(raw.as_bytes())
        .iter()
        .take(6)
        .map(|b| format!("{b:02x}"))
        .collect()
}

impl From<Option<String>> for SessionToken {
    fn from(raw: Option<String>) -> Self {
        raw.map(Self::new).unwrap_or_default()
    }
}

/// Request-scoped flags supplied by the host alongside the session token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Background/asynchronous sub-request: notices are buffered but not
    /// persisted.
    pub is_ajax: bool,
    /// Administrative page: notices render as dismissible blocks instead
    /// of front-end script calls.
    pub is_admin: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
