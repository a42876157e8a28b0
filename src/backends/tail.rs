//! Tail backend - last N lines of a log file

use anyhow::Result;
use serde_json::json;
use std::collections::VecDeque;
use std::path::Path;
use tracing::info;

use crate::core::config::LogsConfig;
use crate::core::error::LogError;
use crate::core::lines::LineReader;
use crate::core::model::{ResultItem, ResultSet};
use crate::core::paths::{resolve, RootSet};
use crate::core::render::{RenderConfig, Renderer};

/// Read the last `n` lines of a file, optionally newest first.
///
/// Memory is bounded by `n` regardless of file size.
pub fn tail(path: &Path, n: usize, reverse: bool) -> Result<Vec<String>, LogError> {
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut window: VecDeque<String> = VecDeque::with_capacity(n.min(4096));
    for line in LineReader::open(path)? {
        let line = line.map_err(|e| LogError::io(path, e))?;
        if window.len() == n {
            window.pop_front();
        }
        window.push_back(line);
    }

    let mut lines: Vec<String> = window.into();
    if reverse {
        lines.reverse();
    }
    Ok(lines)
}

/// Lines to return for a request: the configured default when none is
/// given, never more than the configured ceiling
pub fn effective_line_count(requested: Option<usize>, config: &LogsConfig) -> usize {
    requested
        .unwrap_or(config.default_lines)
        .min(config.max_search_results)
}

/// Run the tail command
pub fn run_tail(
    roots: &RootSet,
    reference: &str,
    lines: Option<usize>,
    reverse: bool,
    logs: &LogsConfig,
    render: RenderConfig,
) -> Result<()> {
    let resolved = resolve(reference, roots).map_err(LogError::from)?;
    let count = effective_line_count(lines, logs);
    let content = tail(resolved.as_path(), count, reverse)?;
    let name = resolved.file_name();

    info!(file = %resolved.as_path().display(), lines = content.len(), "read tail");

    let mut result_set = ResultSet::new();
    let total = content.len();
    result_set.extend(
        content
            .into_iter()
            .map(|line| ResultItem::line(name.as_str(), line)),
    );
    result_set.push(ResultItem::summary(json!({
        "file": name,
        "path": resolved.relative(),
        "lines": total,
    })));

    Renderer::with_config(render).print(&result_set);
    Ok(())
}
