//! Session-scoped flash notices for the forum.
//!
//! Notices added during one request are buffered by type, appended to a
//! persistent log keyed by the visitor's session token, and rendered (then
//! discarded) by whichever request displays them first: usually the one
//! after a redirect.

pub mod buffer;
pub mod log;
pub mod phrases;
pub mod promotions;
pub mod render;
pub mod settings;
pub mod store;

pub use buffer::NoticeBuffer;
pub use log::{JsonlLog, LogRecord, MemoryLog, NoticeLog};
pub use phrases::{interpolate, PhraseBook, PhraseMap, Verbatim};
pub use promotions::{AddonNoteState, AddonNotes, CacheConflicts};
pub use render::{EscapeHtml, PassThrough, Sanitize};
pub use settings::{JsonSettings, MemorySettings, SettingsStore};
pub use store::{NoticeStore, TimeoutTable, NO_ARGS};
