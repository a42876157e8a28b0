//! logsift - search log files confined to a set of permitted directories
//!
//! logsift provides:
//! - Path resolution that never escapes the configured roots
//! - Tail reading with bounded memory
//! - A small query language (phrases, literals, words, AND/OR)
//! - Multi-file search with caps, reverse ordering and deadlines
//! - Unified output format (jsonl/json/md/raw)

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod backends;
mod cli;
mod core;
mod query;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .init();

    cli::run(cli)
}
