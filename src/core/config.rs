//! Configuration loading and validation
//!
//! Loads `logsift.toml`. Every field has a default, so a missing file or an
//! empty `[logs]` table is a valid configuration.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::paths::{RootSet, DEFAULT_ROOT};
use crate::query::WordMode;

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "logsift.toml";

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logs: LogsConfig,
}

/// Log directories and search limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    /// Permitted root directories, searched in order.
    #[serde(default)]
    pub directories: Vec<PathBuf>,

    /// Single-directory form kept for older config files; ignored when
    /// `directories` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// File-name regex used when listing log files.
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Lines returned by `tail` when no count is given.
    #[serde(default = "default_lines")]
    pub default_lines: usize,

    /// Ceiling on search results and tail length.
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,

    /// Worker threads for multi-file search (0 = one per core).
    #[serde(default)]
    pub workers: usize,

    /// Deadline for one search in milliseconds (0 = none).
    #[serde(default)]
    pub timeout_ms: u64,

    /// How bare (unquoted) words match.
    #[serde(default)]
    pub bare_words: WordMode,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            directory: None,
            pattern: default_pattern(),
            default_lines: default_lines(),
            max_search_results: default_max_search_results(),
            workers: 0,
            timeout_ms: 0,
            bare_words: WordMode::default(),
        }
    }
}

fn default_pattern() -> String {
    r"\.log".to_string()
}

fn default_lines() -> usize {
    200
}

fn default_max_search_results() -> usize {
    1000
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            let mut config = Self::default();
            config.normalize();
            Ok(config)
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let mut config: AppConfig = toml::from_str(s)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Replace zero limits with their defaults, as older config files
    /// used 0 to mean "unset".
    fn normalize(&mut self) {
        if self.logs.default_lines == 0 {
            self.logs.default_lines = default_lines();
        }
        if self.logs.max_search_results == 0 {
            self.logs.max_search_results = default_max_search_results();
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(e) = Regex::new(&self.logs.pattern) {
            return Err(ConfigError::Validation(format!(
                "logs.pattern is not a valid regex: {e}"
            )));
        }
        if self.logs.workers > 512 {
            return Err(ConfigError::Validation(format!(
                "logs.workers must be at most 512, got {}",
                self.logs.workers
            )));
        }
        Ok(())
    }

    /// Configured directories in precedence order: `directories`, then the
    /// legacy `directory`, then the conventional default.
    pub fn directories(&self) -> Vec<PathBuf> {
        if !self.logs.directories.is_empty() {
            self.logs.directories.clone()
        } else if let Some(dir) = &self.logs.directory {
            vec![dir.clone()]
        } else {
            vec![PathBuf::from(DEFAULT_ROOT)]
        }
    }

    /// Build the permitted root set, warning about directories that do not
    /// exist (they are kept; resolution simply never succeeds under them).
    pub fn root_set(&self) -> RootSet {
        let roots = RootSet::new(self.directories());
        for root in roots.iter() {
            if !root.is_dir() {
                warn!(root = %root.display(), "log directory does not exist");
            }
        }
        roots
    }
}
