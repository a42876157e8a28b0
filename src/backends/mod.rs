//! Backends module - the commands the engine exposes
//!
//! Provides:
//! - files: log file listing with walkdir
//! - tail: last N lines of a file
//! - search: one query across many files
//! - explain: tokenized and built form of a pattern

pub mod explain;
pub mod files;
pub mod search;
pub mod tail;
