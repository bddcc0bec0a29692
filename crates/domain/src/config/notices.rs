use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::notice::NoticeType;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Notices
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Extension points for the notice store: extra notice types and per-type
/// auto-dismiss overrides.
///
/// ```toml
/// [notices]
/// additional_types = ["warning", "info"]
///
/// [notices.timeout_overrides]
/// success = 2500
/// timeout_warning = 12000
///
/// [notices.phrases]
/// "Reply posted" = "Réponse publiée"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NoticesConfig {
    /// Types registered on top of `neutral`, `error`, `success`.
    #[serde(default)]
    pub additional_types: Vec<String>,

    /// Milliseconds keyed by type name.  `timeout_<type>` is accepted as an
    /// alias for `<type>`.
    #[serde(default)]
    pub timeout_overrides: HashMap<String, u64>,

    /// Display text keyed by message template.  Templates without an entry
    /// are shown as written.
    #[serde(default)]
    pub phrases: HashMap<String, String>,
}

impl NoticesConfig {
    /// The notice type an override key refers to.
    pub fn override_type(key: &str) -> NoticeType {
        let t = NoticeType::new(key);
        match t.as_str().strip_prefix("timeout_") {
            Some(rest) if !rest.is_empty() => NoticeType::new(rest),
            _ => t,
        }
    }

    /// Whether `key` uses the `timeout_<type>` spelling.
    fn is_alias_key(key: &str) -> bool {
        Self::override_type(key).as_str() != NoticeType::new(key).as_str()
    }

    /// Configured override for `ty`, if any.
    ///
    /// When several keys name the same type, a plain `<type>` key beats a
    /// `timeout_<type>` alias, then the lexically smallest key wins.
    pub fn timeout_override(&self, ty: &NoticeType) -> Option<u64> {
        self.timeout_overrides
            .iter()
            .filter(|(key, _)| Self::override_type(key) == *ty)
            .min_by_key(|&(key, _)| (Self::is_alias_key(key), key.as_str()))
            .map(|(_, ms)| *ms)
    }
}
