//! Error types for xmage_maintenance

use std::path::PathBuf;

/// Unified error type for maintenance operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Set directory (or the repository's sets tree) does not exist
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    /// Set code unknown to Scryfall
    #[error("Set not found on Scryfall: {0}")]
    SetNotFound(String),
    /// Revision unknown to the repository
    #[error("Revision not found: {0}")]
    RevisionNotFound(String),
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP error status code
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),
    /// Failed to parse JSON response
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Card source file or spoiler page not in the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
    /// File could not be read or written
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// git exited unsuccessfully
    #[error("git error: {0}")]
    Git(String),
    #[error("Invalid set code: {0:?} (expected uppercase letters and digits)")]
    InvalidSetCode(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

impl Error {
    /// Wrap an I/O error together with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for maintenance operations
pub type Result<T> = std::result::Result<T, Error>;
