use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure of one source adapter. Recovered by the aggregator.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error (status {status}): {message}")]
    Http { status: u16, message: String },

    #[error("HTTP client unavailable: {0}")]
    Client(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected payload: {0}")]
    Parse(String),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Network(format!("request timed out: {}", err))
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Import file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read import file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// A row rejected during mapping because it cannot identify a job.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("row {0}: no title column resolved")]
    MissingTitle(usize),

    #[error("row {row}: malformed ({reason})")]
    Malformed { row: usize, reason: String },
}

/// Failure to write the scaffold file. Fatal for the run.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write scaffold to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to flush scaffold to {}: {source}", path.display())]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
