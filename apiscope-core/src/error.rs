//! Error types for apiscope-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the apiscope-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Capture log does not exist
    #[error("log file not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The log parsed but held no requests to analyze
    #[error("no requests to analyze")]
    EmptyDataset,

    /// Report rendering failed
    #[error("failed to render report: {0}")]
    Render(#[from] std::fmt::Error),

    /// Report could not be written to disk
    #[error("failed to write report to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for apiscope-core
pub type Result<T> = std::result::Result<T, Error>;
