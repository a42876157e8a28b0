//! File listing backend
//!
//! Uses walkdir to enumerate log files under every permitted root

use anyhow::Result;
use chrono::{DateTime, Local};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::core::config::LogsConfig;
use crate::core::error::LogError;
use crate::core::model::{Meta, ResultItem, ResultSet};
use crate::core::paths::{make_relative, normalize_path, RootSet};
use crate::core::render::{RenderConfig, Renderer};

const MOD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A log file found under one of the roots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    /// Path relative to `root`, '/'-separated
    pub path: String,
    pub name: String,
    pub size: u64,
    pub modified: SystemTime,
    pub root: PathBuf,
}

impl LogFile {
    /// Modification time in local time
    pub fn mod_time(&self) -> String {
        DateTime::<Local>::from(self.modified)
            .format(MOD_TIME_FORMAT)
            .to_string()
    }
}

impl From<&LogFile> for ResultItem {
    fn from(file: &LogFile) -> Self {
        ResultItem::file(file.path.as_str(), file.name.as_str()).with_meta(Meta {
            size: Some(file.size),
            mod_time: Some(file.mod_time()),
            root: Some(normalize_path(&file.root)),
        })
    }
}

/// Compile a file-name pattern
pub fn compile_pattern(pattern: &str) -> Result<Regex, LogError> {
    Regex::new(pattern).map_err(|source| LogError::InvalidFilePattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn scan_root(root: &Path, pattern: &Regex, out: &mut Vec<LogFile>) {
    if !root.is_dir() {
        warn!(root = %root.display(), "log directory does not exist");
        return;
    }

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if !pattern.is_match(&name) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                warn!(file = %entry.path().display(), error = %e, "skipping file without metadata");
                continue;
            }
        };

        let path = match make_relative(entry.path(), root) {
            Some(r) => r,
            None => continue,
        };

        out.push(LogFile {
            path,
            name,
            size: metadata.len(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            root: root.to_path_buf(),
        });
    }
}

/// List log files under all roots, newest first
pub fn list_files(roots: &RootSet, pattern: &Regex) -> Vec<LogFile> {
    let mut files = Vec::new();
    for root in roots.iter() {
        scan_root(root, pattern, &mut files);
    }
    debug!(count = files.len(), "listed log files");

    files.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| a.root.cmp(&b.root))
            .then_with(|| a.path.cmp(&b.path))
    });
    files
}

/// Run the files command
pub fn run_files(
    roots: &RootSet,
    pattern: Option<&str>,
    logs: &LogsConfig,
    render: RenderConfig,
) -> Result<()> {
    let regex = compile_pattern(pattern.unwrap_or(&logs.pattern))?;
    let files = list_files(roots, &regex);
    info!(count = files.len(), roots = roots.len(), "found log files");

    let result_set: ResultSet = files.iter().map(ResultItem::from).collect();
    Renderer::with_config(render).print(&result_set);
    Ok(())
}
