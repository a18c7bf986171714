//! Error types for the file watching system.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during file watching operations.
#[derive(Error, Debug)]
pub enum WatchError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system watching error.
    #[error("File watching error: {0}")]
    Watch(String),

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Pattern matching error.
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Invalid watch directory.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Watcher is already running.
    #[error("Watcher is already running")]
    AlreadyRunning,

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for file watching operations.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Convert notify errors to our error type.
impl From<notify::Error> for WatchError {
    fn from(err: notify::Error) -> Self {
        WatchError::Watch(err.to_string())
    }
}

/// Convert globset errors to our error type.
impl From<globset::Error> for WatchError {
    fn from(err: globset::Error) -> Self {
        WatchError::Pattern(err.to_string())
    }
}

/// Readiness could not be determined. Treated as "not ready" by callers.
#[derive(Error, Debug)]
#[error("stability check failed for {}: {source}", path.display())]
pub struct StabilityCheckError {
    /// File being checked.
    pub path: PathBuf,
    /// Underlying IO error.
    #[source]
    pub source: std::io::Error,
}
