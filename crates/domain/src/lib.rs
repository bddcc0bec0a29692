//! Shared types for the noticeboard crates: configuration, errors,
//! notice types, and structured trace events.

pub mod config;
pub mod error;
pub mod notice;
pub mod trace;
