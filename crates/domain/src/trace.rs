use serde::Serialize;

/// Structured trace events emitted across all noticeboard crates.
///
/// `session` fields carry [`crate::notice::token_fingerprint`] output, never
/// the raw token.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    NoticesLoaded {
        session: String,
        rows: usize,
        messages: usize,
    },
    NoticeAdded {
        session: String,
        notice_type: String,
        messages: usize,
        persisted: bool,
    },
    NoticesCleared {
        session: String,
        rows_deleted: usize,
    },
    NoticesRendered {
        session: String,
        target: &'static str,
        messages: usize,
    },
    AddonNoteDismissed {
        hash: String,
    },
    CacheConflictDismissed {
        excluded: String,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "nb_event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_tag() {
        let ev = TraceEvent::NoticeAdded {
            session: "abc".into(),
            notice_type: "success".into(),
            messages: 2,
            persisted: true,
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["event"], "NoticeAdded");
        assert_eq!(v["notice_type"], "success");
        assert_eq!(v["messages"], 2);
    }

    #[test]
    fn session_token_never_serialized() {
        let fp = crate::notice::token_fingerprint("SECRET-TOKEN");
        let ev = TraceEvent::NoticesCleared {
            session: fp.clone(),
            rows_deleted: 1,
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains(&fp));
        assert!(!json.contains("SECRET-TOKEN"));
    }
}
