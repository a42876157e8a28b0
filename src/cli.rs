//! CLI module - Command-line interface definitions and handlers

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::backends::search::SearchRequest;
use crate::core::config::{AppConfig, DEFAULT_CONFIG_FILE};
use crate::core::error::LogError;
use crate::core::paths::RootSet;
use crate::core::render::{OutputFormat, RenderConfig};
use crate::query::WordMode;

/// logsift - search log files confined to a set of permitted directories.
#[derive(Parser, Debug)]
#[command(name = "logsift")]
#[command(
    author,
    version,
    about,
    long_about = r#"logsift reads and searches log files that live under a fixed set of
permitted root directories. File references are resolved against those roots
and anything that would escape them is rejected.

Each command prints a ResultSet in the selected format (default: jsonl).

Output formats:
- jsonl: one JSON object per line (best for piping into tools)
- json: a single JSON array
- md: human-friendly Markdown
- raw: line content only

Pattern language:
- "disk full"     exact phrase (case-insensitive substring)
- `a.b[0]`        literal phrase, no special characters
- timeout         bare word, matches a whole whitespace-delimited word
- and / or        combine keywords; any `or` makes the whole query OR

Examples:
    logsift files
    logsift tail app.log -n 50 --reverse
    logsift search '"disk full" or timeout' app.log nginx/error.log --max 20
    logsift query 'error and `conn[1]`' --test 'ERROR conn[1] reset'
"#
)]
pub struct Cli {
    /// Configuration file.
    #[arg(
        long,
        global = true,
        env = "LOGSIFT_CONFIG",
        default_value = DEFAULT_CONFIG_FILE,
        value_name = "PATH",
        long_help = "TOML configuration file. A missing file means built-in defaults:\n\
a single root at ./logs, 200 tail lines and at most 1000 search results."
    )]
    pub config: PathBuf,

    /// Permitted root directory (repeatable).
    #[arg(
        long = "root",
        global = true,
        value_name = "DIR",
        action = ArgAction::Append,
        long_help = "Permitted root directory. Repeat to allow several; roots are tried in\n\
the order given. When present, replaces the directories from the config file."
    )]
    pub roots: Vec<PathBuf>,

    /// Output format (jsonl/json/md/raw).
    #[arg(
        long,
        global = true,
        default_value = "jsonl",
        value_name = "FORMAT",
        long_help = "Select the output format for ResultSet.\n\n\
Supported values:\n\
- jsonl (default)\n\
- json\n\
- md (markdown)\n\
- raw\n\n\
Tip: Prefer jsonl when you want stable, line-oriented output for piping."
    )]
    pub format: String,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(
        long,
        global = true,
        long_help = "Pretty-print JSON and JSONL output with indentation for human readability.\n\n\
Has no effect on md/raw formats."
    )]
    pub pretty: bool,

    /// Quiet mode (warnings only on stderr).
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        long_help = "Only log warnings and errors to stderr. Results are still printed to stdout."
    )]
    pub quiet: bool,

    /// Verbose mode (repeat for more).
    #[arg(
        short,
        long,
        global = true,
        action = ArgAction::Count,
        long_help = "Log more diagnostics to stderr: -v for debug, -vv for trace.\n\n\
RUST_LOG, when set, takes precedence."
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log filter used when RUST_LOG is not set
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List log files under the permitted roots.
    #[command(
        long_about = "Walk every permitted root and emit one `file` item per log file whose\n\
name matches the pattern. Paths are relative to the root they were found in.\n\
Newest files come first.\n\n\
Examples:\n\
  logsift files\n\
  logsift files --pattern '\\.(log|out)$'\n"
    )]
    Files {
        /// File-name regex (defaults to the configured pattern).
        #[arg(
            long,
            value_name = "REGEX",
            long_help = "Regular expression matched against each file name.\n\n\
Defaults to logs.pattern from the config file (\\.log)."
        )]
        pattern: Option<String>,
    },

    /// Print the last lines of a log file.
    #[command(
        long_about = "Emit the last N lines of FILE as `line` items, followed by a summary.\n\n\
FILE is resolved against the permitted roots in order.\n\n\
Examples:\n\
  logsift tail app.log\n\
  logsift tail nginx/error.log -n 20 --reverse\n"
    )]
    Tail {
        /// File reference under one of the roots.
        file: String,

        /// Number of lines.
        #[arg(
            short = 'n',
            long,
            value_name = "N",
            long_help = "Number of lines to return. Defaults to logs.default_lines and never\n\
exceeds logs.max_search_results."
        )]
        lines: Option<usize>,

        /// Newest line first.
        #[arg(long)]
        reverse: bool,
    },

    /// Search one or more log files.
    #[command(
        long_about = "Evaluate PATTERN against every line of each FILE and emit one `match`\n\
item per matching line, then `error` items for files that could not be\n\
searched, then a summary.\n\n\
Results are ordered by line number (descending with --reverse). Line numbers\n\
always refer to the original file.\n\n\
Examples:\n\
  logsift search error app.log\n\
  logsift search '\"disk full\" or timeout' app.log db.log --reverse --max 10\n\
  logsift search error app.log --within 500 --reverse\n"
    )]
    Search {
        /// Search pattern.
        pattern: String,

        /// File references under the roots.
        #[arg(required = true, value_name = "FILE")]
        files: Vec<String>,

        /// Newest matches first.
        #[arg(
            long,
            long_help = "Order results newest first. With --max, keeps the last N matches of\n\
each file rather than the first."
        )]
        reverse: bool,

        /// Maximum number of results.
        #[arg(
            long,
            value_name = "N",
            long_help = "Maximum number of results across all files. The configured\n\
logs.max_search_results still applies when it is smaller."
        )]
        max: Option<usize>,

        /// Only consider the first (or, with --reverse, last) N lines.
        #[arg(long, value_name = "N", default_value_t = 0)]
        within: usize,

        /// Deadline in milliseconds.
        #[arg(
            long,
            value_name = "MS",
            long_help = "Stop scanning after MS milliseconds. Files not finished in time are\n\
reported as skipped. Defaults to logs.timeout_ms (0 = no deadline)."
        )]
        timeout_ms: Option<u64>,

        /// How bare words match (whole/substring).
        #[arg(long, value_name = "MODE")]
        words: Option<WordMode>,
    },

    /// Show how a pattern is tokenized and built.
    #[command(
        long_about = "Emit one `query` item holding the tokens and the built query for\n\
PATTERN. Each --test line is evaluated against the query.\n\n\
Examples:\n\
  logsift query '\"disk full\" or timeout'\n\
  logsift query error --test 'ERROR boom' --test 'errors everywhere'\n"
    )]
    Query {
        /// Search pattern.
        pattern: String,

        /// Sample line to evaluate (repeatable).
        #[arg(long = "test", value_name = "LINE", action = ArgAction::Append)]
        tests: Vec<String>,

        /// How bare words match (whole/substring).
        #[arg(long, value_name = "MODE")]
        words: Option<WordMode>,
    },
}

/// Execute the CLI command
pub fn run(cli: Cli) -> Result<()> {
    // Parse output format
    let format: OutputFormat = cli.format.parse().unwrap_or_default();
    let render_config = RenderConfig::with_pretty(format, cli.pretty);

    let config = AppConfig::load_or_default(&cli.config)
        .map_err(|e| LogError::config(format!("{}: {e}", cli.config.display())))?;
    let logs = &config.logs;

    let roots = if cli.roots.is_empty() {
        config.root_set()
    } else {
        RootSet::new(cli.roots)
    };

    match cli.command {
        Commands::Files { pattern } => {
            crate::backends::files::run_files(&roots, pattern.as_deref(), logs, render_config)
        }

        Commands::Tail {
            file,
            lines,
            reverse,
        } => crate::backends::tail::run_tail(&roots, &file, lines, reverse, logs, render_config),

        Commands::Search {
            pattern,
            files,
            reverse,
            max,
            within,
            timeout_ms,
            words,
        } => {
            let request = SearchRequest {
                reverse,
                max,
                within,
                timeout_ms,
                word_mode: words,
            };
            crate::backends::search::run_search(
                &roots,
                &pattern,
                &files,
                &request,
                logs,
                render_config,
            )
        }

        Commands::Query {
            pattern,
            tests,
            words,
        } => crate::backends::explain::run_query(
            &pattern,
            words.unwrap_or(logs.bare_words),
            &tests,
            render_config,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_command() {
        let cli = Cli::parse_from([
            "logsift", "--root", "/a", "--root", "/b", "search", "error", "x.log", "y.log",
            "--reverse", "--max", "5",
        ]);
        assert_eq!(cli.roots, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        match cli.command {
            Commands::Search {
                files, reverse, max, ..
            } => {
                assert_eq!(files, vec!["x.log", "y.log"]);
                assert!(reverse);
                assert_eq!(max, Some(5));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_search_requires_a_file() {
        assert!(Cli::try_parse_from(["logsift", "search", "error"]).is_err());
    }

    #[test]
    fn test_word_mode_flag() {
        let cli = Cli::parse_from(["logsift", "query", "err", "--words", "substring"]);
        match cli.command {
            Commands::Query { words, .. } => assert_eq!(words, Some(WordMode::Substring)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_log_filter() {
        let cli = Cli::parse_from(["logsift", "files"]);
        assert_eq!(cli.log_filter(), "info");
        let cli = Cli::parse_from(["logsift", "-vv", "files"]);
        assert_eq!(cli.log_filter(), "trace");
        let cli = Cli::parse_from(["logsift", "-q", "files"]);
        assert_eq!(cli.log_filter(), "warn");
    }
}
