//! Search backend - one query across many log files
//!
//! Each file is streamed line by line and checked with a [`LineMatcher`].
//! Files are independent, so with the `parallel` feature they are scanned
//! on a rayon pool; results are gathered back in input order and sorted,
//! so the output never depends on scheduling.

use anyhow::Result;
use serde_json::json;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::core::config::LogsConfig;
use crate::core::error::LogError;
use crate::core::lines::LineReader;
use crate::core::model::{ItemError, ResultItem, ResultSet};
use crate::core::paths::{normalize_path, resolve, ResolvedPath, RootSet};
use crate::core::render::{RenderConfig, Renderer};
use crate::query::{LineMatcher, Query, QueryBuilder, WordMode};

/// Lines scanned between deadline/cancel checks
const CHECK_INTERVAL: usize = 1024;

/// One matching line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// 1-based line number in the original file
    pub line_number: u64,
    /// Line content, trimmed
    pub content: String,
    pub source_file: PathBuf,
}

impl SearchHit {
    fn new(line_number: u64, line: &str, source_file: &Path) -> Self {
        Self {
            line_number,
            content: line.trim().to_string(),
            source_file: source_file.to_path_buf(),
        }
    }
}

impl From<&SearchHit> for ResultItem {
    fn from(hit: &SearchHit) -> Self {
        ResultItem::match_result(
            normalize_path(&hit.source_file),
            hit.line_number,
            hit.content.as_str(),
        )
    }
}

/// A file left out of the results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub code: &'static str,
    pub reason: String,
}

impl SkippedFile {
    fn new(path: &Path, err: &LogError) -> Self {
        Self {
            path: path.to_path_buf(),
            code: err.code(),
            reason: err.to_string(),
        }
    }
}

/// Everything one search produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub hits: Vec<SearchHit>,
    /// Files scanned to completion
    pub files_searched: usize,
    pub skipped: Vec<SkippedFile>,
}

impl SearchOutcome {
    pub fn count(&self) -> usize {
        self.hits.len()
    }
}

/// Shared flag a caller can flip to stop a running search.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    #[cfg(test)]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Configured ceiling on results (0 = unbounded)
    pub max_results: usize,
    /// Requested cap on results (0 = unbounded)
    pub result_cap: usize,
    /// Newest lines first
    pub reverse: bool,
    /// Only consider the first N lines, or the last N when reversed (0 = all)
    pub within: usize,
    pub deadline: Option<Instant>,
    pub cancel: CancelFlag,
    /// Worker threads (0 = one per core, 1 = sequential)
    pub workers: usize,
}

impl SearchOptions {
    /// The smaller of the two limits, ignoring zeros
    pub fn effective_cap(&self) -> Option<usize> {
        match (self.max_results, self.result_cap) {
            (0, 0) => None,
            (0, cap) | (cap, 0) => Some(cap),
            (a, b) => Some(a.min(b)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    fn should_stop(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Order hits by line number: ascending, or descending when reversed
fn sort_hits(hits: &mut [SearchHit], reverse: bool) {
    if reverse {
        hits.sort_by(|a, b| b.line_number.cmp(&a.line_number));
    } else {
        hits.sort_by(|a, b| a.line_number.cmp(&b.line_number));
    }
}

/// Search a single file.
///
/// Line numbers always refer to the original file. In reverse mode the file
/// is still read front to back, keeping only the newest `cap` matches.
pub fn search_file(
    path: &Path,
    matcher: &LineMatcher,
    options: &SearchOptions,
) -> Result<Vec<SearchHit>, LogError> {
    let cap = options.effective_cap();
    let mut hits: VecDeque<SearchHit> = VecDeque::new();
    let mut total: u64 = 0;

    for (index, line) in LineReader::open(path)?.enumerate() {
        if index % CHECK_INTERVAL == 0 && options.should_stop() {
            debug!(file = %path.display(), line = index, "scan stopped");
            return Err(LogError::cancelled(path));
        }
        if !options.reverse && options.within > 0 && index >= options.within {
            break;
        }

        let line = line.map_err(|e| LogError::io(path, e))?;
        total = index as u64 + 1;

        if !matcher.is_match(&line) {
            continue;
        }

        if options.reverse {
            if cap.is_some_and(|c| hits.len() == c) {
                hits.pop_front();
            }
            hits.push_back(SearchHit::new(total, &line, path));
        } else {
            hits.push_back(SearchHit::new(total, &line, path));
            if cap.is_some_and(|c| hits.len() >= c) {
                break;
            }
        }
    }

    if options.reverse && options.within > 0 {
        let first_allowed = total.saturating_sub(options.within as u64) + 1;
        hits.retain(|hit| hit.line_number >= first_allowed);
    }

    let mut hits: Vec<SearchHit> = hits.into();
    sort_hits(&mut hits, options.reverse);
    debug!(file = %path.display(), matches = hits.len(), "scanned file");
    Ok(hits)
}

fn scan_sequential(
    paths: &[ResolvedPath],
    matcher: &LineMatcher,
    options: &SearchOptions,
) -> Vec<Result<Vec<SearchHit>, LogError>> {
    paths
        .iter()
        .map(|path| search_file(path.as_path(), matcher, options))
        .collect()
}

#[cfg(feature = "parallel")]
fn scan_all(
    paths: &[ResolvedPath],
    matcher: &LineMatcher,
    options: &SearchOptions,
) -> Vec<Result<Vec<SearchHit>, LogError>> {
    use rayon::prelude::*;

    if options.workers == 1 || paths.len() < 2 {
        return scan_sequential(paths, matcher, options);
    }

    match rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .build()
    {
        Ok(pool) => pool.install(|| {
            paths
                .par_iter()
                .map(|path| search_file(path.as_path(), matcher, options))
                .collect()
        }),
        Err(e) => {
            warn!(error = %e, "could not start search workers, scanning sequentially");
            scan_sequential(paths, matcher, options)
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn scan_all(
    paths: &[ResolvedPath],
    matcher: &LineMatcher,
    options: &SearchOptions,
) -> Vec<Result<Vec<SearchHit>, LogError>> {
    scan_sequential(paths, matcher, options)
}

/// Run one query across files and merge the results.
///
/// A file that cannot be read (or runs past the deadline) is logged and
/// reported in [`SearchOutcome::skipped`]; it never fails the search.
pub fn search(paths: &[ResolvedPath], query: &Query, options: &SearchOptions) -> SearchOutcome {
    let matcher = LineMatcher::new(query);
    let mut outcome = SearchOutcome::default();

    for (path, result) in paths.iter().zip(scan_all(paths, &matcher, options)) {
        match result {
            Ok(mut hits) => {
                outcome.files_searched += 1;
                outcome.hits.append(&mut hits);
            }
            Err(e) => {
                warn!(file = %path.as_path().display(), error = %e, "skipping file");
                outcome.skipped.push(SkippedFile::new(path.as_path(), &e));
            }
        }
    }

    if let Some(cap) = options.effective_cap() {
        outcome.hits.truncate(cap);
    }
    sort_hits(&mut outcome.hits, options.reverse);
    outcome
}

/// Flags accepted by the search command
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub reverse: bool,
    pub max: Option<usize>,
    pub within: usize,
    pub timeout_ms: Option<u64>,
    pub word_mode: Option<WordMode>,
}

/// Resolve references, dropping repeats of the same file
fn resolve_all(references: &[String], roots: &RootSet) -> Result<Vec<ResolvedPath>, LogError> {
    let mut seen = HashSet::new();
    let mut paths = Vec::with_capacity(references.len());
    for reference in references {
        let resolved = resolve(reference, roots)?;
        if seen.insert(resolved.as_path().to_path_buf()) {
            paths.push(resolved);
        } else {
            debug!(reference = %reference, "duplicate file reference ignored");
        }
    }
    Ok(paths)
}

/// Build a result set: matches, then skipped files, then the summary
pub fn outcome_to_result_set(outcome: &SearchOutcome) -> ResultSet {
    let mut result_set: ResultSet = outcome.hits.iter().map(ResultItem::from).collect();

    for skipped in &outcome.skipped {
        result_set.push(
            ResultItem::error(ItemError::new(skipped.code, skipped.reason.as_str()))
                .with_path(normalize_path(&skipped.path)),
        );
    }

    result_set.push(ResultItem::summary(json!({
        "count": outcome.count(),
        "files_searched": outcome.files_searched,
        "files_skipped": outcome.skipped.len(),
    })));
    result_set
}

/// Run the search command
pub fn run_search(
    roots: &RootSet,
    pattern: &str,
    references: &[String],
    request: &SearchRequest,
    logs: &LogsConfig,
    render: RenderConfig,
) -> Result<()> {
    let paths = resolve_all(references, roots)?;
    let query = QueryBuilder::new()
        .with_word_mode(request.word_mode.unwrap_or(logs.bare_words))
        .parse(pattern)
        .map_err(LogError::from)?;

    let mut options = SearchOptions {
        max_results: logs.max_search_results,
        result_cap: request.max.unwrap_or(0),
        reverse: request.reverse,
        within: request.within,
        workers: logs.workers,
        ..SearchOptions::default()
    };
    let timeout_ms = request.timeout_ms.unwrap_or(logs.timeout_ms);
    if timeout_ms > 0 {
        options = options.with_timeout(Duration::from_millis(timeout_ms));
    }

    let outcome = search(&paths, &query, &options);
    info!(
        pattern,
        files = paths.len(),
        matches = outcome.count(),
        skipped = outcome.skipped.len(),
        "search finished"
    );

    Renderer::with_config(render).print(&outcome_to_result_set(&outcome));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::builder::parse;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn write_log(dir: &Path, name: &str, lines: &[&str]) -> ResolvedPath {
        let path = dir.join(name);
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(&path, content).unwrap();
        ResolvedPath::new_unchecked(path.canonicalize().unwrap(), dir.canonicalize().unwrap())
    }

    fn sample_files() -> (TempDir, Vec<ResolvedPath>) {
        let temp = tempdir().unwrap();
        let a = write_log(
            temp.path(),
            "a.log",
            &[
                "INFO start",
                "ERROR disk full",
                "INFO tick",
                "ERROR timeout",
                "INFO tick",
                "ERROR disk full again",
            ],
        );
        let b = write_log(
            temp.path(),
            "b.log",
            &["ERROR one", "INFO two", "ERROR three", "ERROR four"],
        );
        (temp, vec![a, b])
    }

    fn options() -> SearchOptions {
        SearchOptions {
            max_results: 1000,
            ..SearchOptions::default()
        }
    }

    fn numbers(outcome: &SearchOutcome) -> Vec<u64> {
        outcome.hits.iter().map(|h| h.line_number).collect()
    }

    #[test]
    fn test_effective_cap() {
        let mut opts = SearchOptions::default();
        assert_eq!(opts.effective_cap(), None);
        opts.max_results = 1000;
        assert_eq!(opts.effective_cap(), Some(1000));
        opts.result_cap = 5;
        assert_eq!(opts.effective_cap(), Some(5));
        opts.max_results = 0;
        assert_eq!(opts.effective_cap(), Some(5));
    }

    #[test]
    fn test_single_file_forward() {
        let (_temp, files) = sample_files();
        let query = parse("error").unwrap();

        let outcome = search(&files[..1], &query, &options());

        assert_eq!(numbers(&outcome), vec![2, 4, 6]);
        assert_eq!(outcome.hits[0].content, "ERROR disk full");
        assert_eq!(outcome.hits[0].source_file, files[0].as_path());
        assert_eq!(outcome.files_searched, 1);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_content_is_trimmed() {
        let temp = tempdir().unwrap();
        let file = write_log(temp.path(), "pad.log", &["   ERROR padded   "]);
        let outcome = search(&[file], &parse("error").unwrap(), &options());
        assert_eq!(outcome.hits[0].content, "ERROR padded");
    }

    #[test]
    fn test_reverse_reports_original_line_numbers() {
        let (_temp, files) = sample_files();
        let query = parse("error").unwrap();
        let opts = SearchOptions {
            reverse: true,
            ..options()
        };

        let outcome = search(&files[..1], &query, &opts);
        assert_eq!(numbers(&outcome), vec![6, 4, 2]);
        assert_eq!(outcome.hits[0].content, "ERROR disk full again");
    }

    #[test]
    fn test_reverse_cap_keeps_newest_matches() {
        let (_temp, files) = sample_files();
        let query = parse("error").unwrap();
        let opts = SearchOptions {
            reverse: true,
            result_cap: 2,
            ..options()
        };

        let outcome = search(&files[..1], &query, &opts);
        assert_eq!(numbers(&outcome), vec![6, 4]);
    }

    #[test]
    fn test_forward_cap_keeps_oldest_matches() {
        let (_temp, files) = sample_files();
        let query = parse("error").unwrap();
        let opts = SearchOptions {
            result_cap: 2,
            ..options()
        };

        let outcome = search(&files[..1], &query, &opts);
        assert_eq!(numbers(&outcome), vec![2, 4]);
    }

    #[test]
    fn test_within_limits_scanned_lines() {
        let (_temp, files) = sample_files();
        let query = parse("error").unwrap();

        let forward = SearchOptions {
            within: 3,
            ..options()
        };
        assert_eq!(numbers(&search(&files[..1], &query, &forward)), vec![2]);

        let reverse = SearchOptions {
            within: 3,
            reverse: true,
            ..options()
        };
        assert_eq!(numbers(&search(&files[..1], &query, &reverse)), vec![6, 4]);
    }

    #[test]
    fn test_multi_file_cap_and_ordering() {
        let (_temp, files) = sample_files();
        let query = parse("error").unwrap();

        for reverse in [false, true] {
            let opts = SearchOptions {
                result_cap: 5,
                reverse,
                ..options()
            };
            let outcome = search(&files, &query, &opts);
            let lines = numbers(&outcome);

            assert!(outcome.count() <= 5);
            let ordered = lines.windows(2).all(|w| {
                if reverse {
                    w[0] >= w[1]
                } else {
                    w[0] <= w[1]
                }
            });
            assert!(ordered, "reverse={reverse}: {lines:?}");
        }
    }

    #[test]
    fn test_merge_truncates_in_input_order_then_sorts() {
        let (_temp, files) = sample_files();
        let query = parse("error").unwrap();
        let opts = SearchOptions {
            result_cap: 4,
            ..options()
        };

        // a.log yields 2,4,6 and b.log yields 1,3,4; the first four in
        // input order are a:2, a:4, a:6, b:1.
        let outcome = search(&files, &query, &opts);
        assert_eq!(numbers(&outcome), vec![1, 2, 4, 6]);
        assert_eq!(outcome.hits[0].source_file, files[1].as_path());
    }

    #[test]
    fn test_or_query_across_files() {
        let (_temp, files) = sample_files();
        let query = parse("timeout or three").unwrap();

        let outcome = search(&files, &query, &options());
        let contents: Vec<_> = outcome.hits.iter().map(|h| h.content.as_str()).collect();
        assert_eq!(contents, vec!["ERROR three", "ERROR timeout"]);
    }

    #[test_log::test]
    fn test_unreadable_file_is_skipped() {
        let (temp, mut files) = sample_files();
        let ghost = temp.path().join("ghost.log");
        files.insert(
            0,
            ResolvedPath::new_unchecked(ghost.clone(), temp.path().to_path_buf()),
        );

        let outcome = search(&files, &parse("error").unwrap(), &options());

        assert_eq!(outcome.files_searched, 2);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].path, ghost);
        assert_eq!(outcome.skipped[0].code, "IO_ERROR");
        assert_eq!(outcome.count(), 6);
    }

    #[test]
    fn test_all_files_failing_is_empty_not_error() {
        let temp = tempdir().unwrap();
        let files: Vec<_> = ["x.log", "y.log"]
            .iter()
            .map(|n| ResolvedPath::new_unchecked(temp.path().join(n), temp.path().to_path_buf()))
            .collect();

        let outcome = search(&files, &parse("error").unwrap(), &options());
        assert_eq!(outcome.count(), 0);
        assert_eq!(outcome.files_searched, 0);
        assert_eq!(outcome.skipped.len(), 2);
    }

    #[test]
    fn test_expired_deadline_marks_files_cancelled() {
        let (_temp, files) = sample_files();
        let opts = SearchOptions {
            deadline: Some(Instant::now()),
            ..options()
        };

        let outcome = search(&files, &parse("error").unwrap(), &opts);
        assert_eq!(outcome.count(), 0);
        assert_eq!(outcome.skipped.len(), 2);
        assert!(outcome.skipped.iter().all(|s| s.code == "CANCELLED"));
    }

    #[test]
    fn test_cancel_flag_stops_search() {
        let (_temp, files) = sample_files();
        let opts = options();
        opts.cancel.cancel();

        let outcome = search(&files, &parse("error").unwrap(), &opts);
        assert_eq!(outcome.skipped.len(), 2);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let temp = tempdir().unwrap();
        let files: Vec<_> = (0..6)
            .map(|n| {
                let lines: Vec<String> = (0..200)
                    .map(|i| {
                        if i % (n + 3) == 0 {
                            format!("ERROR file{n} line{i}")
                        } else {
                            format!("INFO file{n} line{i}")
                        }
                    })
                    .collect();
                let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
                write_log(temp.path(), &format!("f{n}.log"), &refs)
            })
            .collect();
        let query = parse("error").unwrap();

        for reverse in [false, true] {
            let sequential = SearchOptions {
                workers: 1,
                result_cap: 50,
                reverse,
                ..options()
            };
            let parallel = SearchOptions {
                workers: 4,
                ..sequential.clone()
            };
            assert_eq!(
                search(&files, &query, &sequential),
                search(&files, &query, &parallel)
            );
        }
    }

    #[test]
    fn test_search_is_idempotent() {
        let (_temp, files) = sample_files();
        let query = parse(r#""disk full" or timeout"#).unwrap();
        let first = search(&files, &query, &options());
        let second = search(&files, &query, &options());
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_all_deduplicates() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("app.log"), "x\n").unwrap();
        let roots = RootSet::new([temp.path()]);

        let refs = vec!["app.log".to_string(), "./app.log".to_string()];
        let paths = resolve_all(&refs, &roots).unwrap();
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn test_resolve_all_rejects_any_bad_reference() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("app.log"), "x\n").unwrap();
        let roots = RootSet::new([temp.path()]);

        let refs = vec!["app.log".to_string(), "../outside.log".to_string()];
        assert!(matches!(resolve_all(&refs, &roots), Err(LogError::Path(_))));
    }

    #[test]
    fn test_outcome_to_result_set() {
        let (_temp, files) = sample_files();
        let outcome = search(&files[1..], &parse("three").unwrap(), &options());
        let set = outcome_to_result_set(&outcome);

        assert_eq!(set.len(), 2);
        assert_eq!(set.items[0].line, Some(3));
        let summary = set.items[1].data.as_ref().unwrap();
        assert_eq!(summary["count"], 1);
        assert_eq!(summary["files_searched"], 1);
        assert_eq!(summary["files_skipped"], 0);
    }
}
