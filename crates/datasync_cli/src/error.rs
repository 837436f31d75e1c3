//! Error types for the CLI.

use datasync_engine::SyncError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors raised while loading definitions and datasets.
#[derive(Error, Debug)]
pub enum CliError {
    /// A file could not be read or written.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A file did not contain valid JSON.
    #[error("invalid JSON in {path:?}: {source}")]
    Json {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// A dataset file was not a JSON array.
    #[error("{path:?}: expected a JSON array of records")]
    NotAnArray {
        /// File path.
        path: PathBuf,
    },

    /// A record lacks the key field.
    #[error("{path:?}: record {index} has no usable '{field}' field")]
    MissingKey {
        /// File path.
        path: PathBuf,
        /// Position of the record in the file.
        index: usize,
        /// Key field name.
        field: String,
    },

    /// No synchronization with this name is defined.
    #[error("no synchronization named '{0}'")]
    UnknownSynchronization(String),

    /// One or more runs failed.
    #[error("{failed} of {total} synchronizations failed")]
    RunsFailed {
        /// Number of failed runs.
        failed: usize,
        /// Number of runs.
        total: usize,
    },

    /// Engine error.
    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl CliError {
    /// Creates an I/O error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a JSON error for a path.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
