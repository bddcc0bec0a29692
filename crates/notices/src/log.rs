//! Persistent notice log.
//!
//! Notices that outlive a request are appended here as one record per
//! `add`, keyed by `(session_id, type)`.  The next request for the same
//! session merges every record back into its buffer; only an explicit
//! clear deletes them.
//!
//! Two backends ship with the crate: [`MemoryLog`] for tests and
//! single-process hosts, and [`JsonlLog`], an append-only JSON-lines file
//! with an in-memory write-through cache.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use nb_domain::error::{Error, Result};
use nb_domain::notice::NoticeType;

/// One persisted row.  `value` is either a literal message or a JSON array
/// of messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub session_id: String,
    pub key: NoticeType,
    pub value: String,
    pub created_at: DateTime<Utc>,
}

impl LogRecord {
    pub fn new(session_id: &str, key: NoticeType, value: String) -> Self {
        Self {
            session_id: session_id.to_owned(),
            key,
            value,
            created_at: Utc::now(),
        }
    }
}

/// Append / query / delete contract the notice store relies on.
pub trait NoticeLog: Send + Sync {
    fn append(&self, record: LogRecord) -> Result<()>;

    /// Distinct `(key, value)` pairs for `session_id` whose key is one of
    /// `keys`, in first-seen order.
    fn query(&self, session_id: &str, keys: &[NoticeType]) -> Result<Vec<(NoticeType, String)>>;

    /// Delete every record of `session_id`.  Returns the number removed.
    fn delete_session(&self, session_id: &str) -> Result<usize>;
}

fn distinct_pairs(
    records: &[LogRecord],
    session_id: &str,
    keys: &[NoticeType],
) -> Vec<(NoticeType, String)> {
    let mut rows: Vec<(NoticeType, String)> = Vec::new();
    for r in records {
        if r.session_id != session_id || !keys.contains(&r.key) {
            continue;
        }
        if !rows.iter().any(|(k, v)| *k == r.key && *v == r.value) {
            rows.push((r.key.clone(), r.value.clone()));
        }
    }
    rows
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Default)]
pub struct MemoryLog {
    records: RwLock<Vec<LogRecord>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of rows across all sessions.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Snapshot of every row belonging to `session_id`.
    pub fn records_for(&self, session_id: &str) -> Vec<LogRecord> {
        self.records
            .read()
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect()
    }
}

impl NoticeLog for MemoryLog {
    fn append(&self, record: LogRecord) -> Result<()> {
        self.records.write().push(record);
        Ok(())
    }

    fn query(&self, session_id: &str, keys: &[NoticeType]) -> Result<Vec<(NoticeType, String)>> {
        Ok(distinct_pairs(&self.records.read(), session_id, keys))
    }

    fn delete_session(&self, session_id: &str) -> Result<usize> {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|r| r.session_id != session_id);
        Ok(before - records.len())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// JSON-lines file backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Append-only `log.jsonl` under `<state_path>/notices/`.
///
/// The whole file is read once at open; afterwards reads are served from the
/// cache and writes go to disk first, cache second.
///
/// Records are only removed by [`NoticeLog::delete_session`].  A session that
/// never renders or clears its notices keeps its rows in both the file and
/// the cache; expiring abandoned sessions is left to the host.
pub struct JsonlLog {
    path: PathBuf,
    cache: RwLock<Vec<LogRecord>>,
}

impl JsonlLog {
    pub fn open(state_path: &Path) -> Result<Self> {
        let dir = state_path.join("notices");
        std::fs::create_dir_all(&dir).map_err(Error::Io)?;

        let path = dir.join("log.jsonl");
        let records = read_jsonl_file(&path)?;

        tracing::info!(
            records = records.len(),
            path = %path.display(),
            "notice log loaded"
        );

        Ok(Self {
            path,
            cache: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NoticeLog for JsonlLog {
    fn append(&self, record: LogRecord) -> Result<()> {
        let mut line = serde_json::to_string(&record)
            .map_err(|e| Error::Other(format!("serializing log record: {e}")))?;
        line.push('\n');

        // Hold the lock across the write so file order matches cache order.
        let mut cache = self.cache.write();
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(Error::Io)?;
        file.write_all(line.as_bytes()).map_err(Error::Io)?;
        cache.push(record);
        Ok(())
    }

    fn query(&self, session_id: &str, keys: &[NoticeType]) -> Result<Vec<(NoticeType, String)>> {
        Ok(distinct_pairs(&self.cache.read(), session_id, keys))
    }

    fn delete_session(&self, session_id: &str) -> Result<usize> {
        let mut cache = self.cache.write();
        let kept: Vec<LogRecord> = cache
            .iter()
            .filter(|r| r.session_id != session_id)
            .cloned()
            .collect();
        let removed = cache.len() - kept.len();
        if removed == 0 {
            return Ok(0);
        }

        let mut buf = String::new();
        for r in &kept {
            let json = serde_json::to_string(r)
                .map_err(|e| Error::Other(format!("serializing log record: {e}")))?;
            buf.push_str(&json);
            buf.push('\n');
        }
        let tmp = self.path.with_extension("jsonl.tmp");
        std::fs::write(&tmp, buf).map_err(Error::Io)?;
        std::fs::rename(&tmp, &self.path).map_err(Error::Io)?;

        *cache = kept;
        Ok(removed)
    }
}

fn read_jsonl_file(path: &Path) -> Result<Vec<LogRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let raw = std::fs::read_to_string(path).map_err(Error::Io)?;
    let mut records = Vec::new();
    for (lineno, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LogRecord>(line) {
            Ok(r) => records.push(r),
            Err(e) => {
                tracing::warn!(
                    line = lineno + 1,
                    error = %e,
                    "skipping malformed notice log line"
                );
            }
        }
    }
    Ok(records)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(session: &str, key: &str, value: &str) -> LogRecord {
        LogRecord::new(session, NoticeType::new(key), value.into())
    }

    fn all_types() -> Vec<NoticeType> {
        nb_domain::notice::resolve_types::<String>(&[])
    }

    #[test]
    fn memory_query_is_distinct_and_filtered() {
        let log = MemoryLog::new();
        log.append(rec("s1", "error", r#"["a"]"#)).unwrap();
        log.append(rec("s1", "error", r#"["a"]"#)).unwrap();
        log.append(rec("s1", "success", "done")).unwrap();
        log.append(rec("s1", "bogus", "x")).unwrap();
        log.append(rec("s2", "error", "other")).unwrap();

        let rows = log.query("s1", &all_types()).unwrap();
        assert_eq!(
            rows,
            vec![
                (NoticeType::error(), r#"["a"]"#.to_string()),
                (NoticeType::success(), "done".to_string()),
            ]
        );
        assert_eq!(log.len(), 5);
    }

    #[test]
    fn memory_delete_only_touches_one_session() {
        let log = MemoryLog::new();
        log.append(rec("s1", "error", "a")).unwrap();
        log.append(rec("s1", "neutral", "b")).unwrap();
        log.append(rec("s2", "error", "c")).unwrap();

        assert_eq!(log.delete_session("s1").unwrap(), 2);
        assert!(log.records_for("s1").is_empty());
        assert_eq!(log.records_for("s2").len(), 1);
        assert_eq!(log.delete_session("missing").unwrap(), 0);
    }

    #[test]
    fn jsonl_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let log = JsonlLog::open(dir.path()).unwrap();
            log.append(rec("s1", "success", r#"["Saved"]"#)).unwrap();
            log.append(rec("s2", "error", "Nope")).unwrap();
        }

        let log = JsonlLog::open(dir.path()).unwrap();
        let rows = log.query("s1", &all_types()).unwrap();
        assert_eq!(rows, vec![(NoticeType::success(), r#"["Saved"]"#.to_string())]);
    }

    #[test]
    fn jsonl_delete_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        {
            let log = JsonlLog::open(dir.path()).unwrap();
            log.append(rec("s1", "success", "a")).unwrap();
            log.append(rec("s2", "error", "b")).unwrap();
            assert_eq!(log.delete_session("s1").unwrap(), 1);
            assert!(log.query("s1", &all_types()).unwrap().is_empty());
        }

        let log = JsonlLog::open(dir.path()).unwrap();
        assert!(log.query("s1", &all_types()).unwrap().is_empty());
        assert_eq!(log.query("s2", &all_types()).unwrap().len(), 1);
    }

    #[test]
    fn jsonl_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let notices_dir = dir.path().join("notices");
        std::fs::create_dir_all(&notices_dir).unwrap();
        let good = serde_json::to_string(&rec("s1", "error", "kept")).unwrap();
        std::fs::write(notices_dir.join("log.jsonl"), format!("not json\n\n{good}\n")).unwrap();

        let log = JsonlLog::open(dir.path()).unwrap();
        let rows = log.query("s1", &all_types()).unwrap();
        assert_eq!(rows, vec![(NoticeType::error(), "kept".to_string())]);
    }
}
