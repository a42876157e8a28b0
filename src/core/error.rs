//! Error taxonomy for the search engine
//!
//! Three families surface to callers:
//! - [`PathError`]: a file reference did not resolve to an in-bounds file
//! - [`PatternError`]: the query string is syntactically invalid
//! - [`LogError::Io`]: a file could not be opened or read
//!
//! Every variant carries a stable `code()` used when an error is embedded
//! in a result item.

use std::path::PathBuf;
use thiserror::Error;

/// Rejection of a caller-supplied file reference.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("file reference is empty")]
    Empty,

    #[error("file not found: {reference}")]
    NotFound { reference: String },

    #[error("file is outside the permitted directories: {reference}")]
    OutsideRoots { reference: String },

    #[error("not a regular file: {reference}")]
    NotAFile { reference: String },
}

impl PathError {
    pub fn code(&self) -> &'static str {
        match self {
            PathError::Empty => "PATH_EMPTY",
            PathError::NotFound { .. } => "PATH_NOT_FOUND",
            PathError::OutsideRoots { .. } => "PATH_OUTSIDE_ROOTS",
            PathError::NotAFile { .. } => "PATH_NOT_A_FILE",
        }
    }
}

/// Syntax errors in a search pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("search pattern is empty")]
    Empty,

    #[error("operator '{operator}' cannot appear at the start or end of a pattern (token {position})")]
    OperatorAtBoundary { operator: String, position: usize },

    #[error("search pattern contains no keywords")]
    NoKeywords,
}

impl PatternError {
    pub fn code(&self) -> &'static str {
        match self {
            PatternError::Empty => "PATTERN_EMPTY",
            PatternError::OperatorAtBoundary { .. } => "PATTERN_OPERATOR_AT_BOUNDARY",
            PatternError::NoKeywords => "PATTERN_NO_KEYWORDS",
        }
    }
}

/// The main error type for engine operations.
#[derive(Error, Debug)]
pub enum LogError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("invalid search pattern: {0}")]
    Pattern(#[from] PatternError),

    /// File could not be opened or read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A scan was stopped by its deadline or by an explicit cancel
    #[error("search cancelled while scanning {}", path.display())]
    Cancelled { path: PathBuf },

    /// File-name pattern did not compile
    #[error("invalid file pattern '{pattern}': {source}")]
    InvalidFilePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("configuration error: {message}")]
    Config { message: String },
}

/// Standard Result type for engine operations.
pub type Result<T> = std::result::Result<T, LogError>;

impl LogError {
    /// Create an Io error bound to the file it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn cancelled(path: impl Into<PathBuf>) -> Self {
        Self::Cancelled { path: path.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            LogError::Path(e) => e.code(),
            LogError::Pattern(e) => e.code(),
            LogError::Io { .. } => "IO_ERROR",
            LogError::Cancelled { .. } => "CANCELLED",
            LogError::InvalidFilePattern { .. } => "FILE_PATTERN_INVALID",
            LogError::Config { .. } => "CONFIG_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_error_messages() {
        let err = PathError::OutsideRoots {
            reference: "../etc/passwd".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "file is outside the permitted directories: ../etc/passwd"
        );
        assert_eq!(err.code(), "PATH_OUTSIDE_ROOTS");
    }

    #[test]
    fn test_pattern_error_wraps_into_log_error() {
        let err: LogError = PatternError::NoKeywords.into();
        assert_eq!(
            err.to_string(),
            "invalid search pattern: search pattern contains no keywords"
        );
        assert_eq!(err.code(), "PATTERN_NO_KEYWORDS");
    }

    #[test]
    fn test_path_error_is_transparent() {
        let err: LogError = PathError::NotFound {
            reference: "app.log".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "file not found: app.log");
        assert_eq!(err.code(), "PATH_NOT_FOUND");
    }

    #[test]
    fn test_io_error_carries_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = LogError::io("/var/log/app.log", io_err);
        assert!(err.to_string().contains("/var/log/app.log"));
        assert_eq!(err.code(), "IO_ERROR");
    }
}
