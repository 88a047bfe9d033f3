//! Error types for LegalWatch.
//!
//! Library crates use [`LegalWatchError`] via `thiserror`.
//! The CLI wraps this with `color-eyre`; the HTTP layer maps it to status codes.

use std::fmt;
use std::path::PathBuf;

/// One failed completion-provider call, kept for diagnostics when the whole
/// fallback chain is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAttempt {
    /// Provider name (e.g. `yandex`).
    pub provider: String,
    /// Why the call failed.
    pub reason: String,
}

impl fmt::Display for ProviderAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.reason)
    }
}

/// Top-level error type for all LegalWatch operations.
#[derive(Debug, thiserror::Error)]
pub enum LegalWatchError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while talking to the feed or the NER server.
    #[error("network error: {0}")]
    Network(String),

    /// Feed or response parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Query or write failure on an open database.
    #[error("storage error: {0}")]
    Storage(String),

    /// The persistent store could not be opened or read at all.
    #[error("store unreachable: {0}")]
    StoreUnreachable(String),

    /// Entity extraction failed for a piece of text.
    #[error("NER error: {0}")]
    Ner(String),

    /// Every provider in the fallback chain failed.
    #[error("report unavailable: all providers failed ({})", format_attempts(.attempts))]
    ReportUnavailable { attempts: Vec<ProviderAttempt> },

    /// There were no analyzed items to build a report from.
    #[error("nothing to report: no items were analyzed")]
    NothingToReport,

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LegalWatchError>;

fn format_attempts(attempts: &[ProviderAttempt]) -> String {
    if attempts.is_empty() {
        return "no providers configured".into();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LegalWatchError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
