//! Error types for the synchronization engine.

use std::fmt;
use thiserror::Error;

/// Result type for synchronization operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Boxed error produced by an external collaborator (fetch or save).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which dataset of a synchronization an error or item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The authoritative dataset.
    Source,
    /// The persisted dataset that is brought in line with the source.
    Destination,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => f.write_str("source"),
            Side::Destination => f.write_str("destination"),
        }
    }
}

/// Errors that can occur during a synchronization run.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A data provider could not fetch its items.
    #[error("failed to retrieve {side} data: {message}")]
    DataRetrieval {
        /// Side whose provider failed.
        side: Side,
        /// Error message.
        message: String,
    },

    /// The save callback rejected the computed delta.
    #[error("save failed: {0}")]
    Save(String),

    /// The same key was produced twice by one side under the reject policy.
    #[error("duplicate key {key} in {side} data")]
    DuplicateKey {
        /// Side that produced the key twice.
        side: Side,
        /// Debug rendering of the key.
        key: String,
    },

    /// A configuration with this name is already registered.
    #[error("synchronization '{0}' is already registered")]
    DuplicateConfiguration(String),

    /// Another run of the same configuration is in progress.
    #[error("synchronization '{0}' is already running")]
    AlreadyRunning(String),

    /// The run context deadline passed before the collaborator finished.
    #[error("synchronization deadline exceeded")]
    DeadlineExceeded,

    /// Error raised by an external collaborator, carried unchanged.
    #[error(transparent)]
    External(#[from] BoxError),
}

impl SyncError {
    /// Creates a data retrieval error for the given side.
    pub fn data_retrieval(side: Side, message: impl Into<String>) -> Self {
        Self::DataRetrieval {
            side,
            message: message.into(),
        }
    }

    /// Creates a save error.
    pub fn save(message: impl Into<String>) -> Self {
        Self::Save(message.into())
    }

    /// Wraps any collaborator error.
    pub fn external<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::External(Box::new(error))
    }

    /// Returns true if the error stems from the data of one side
    /// (fetch failure or duplicate key) rather than from saving.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            SyncError::DataRetrieval { .. } | SyncError::DuplicateKey { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_errors() {
        assert!(SyncError::data_retrieval(Side::Source, "offline").is_data_error());
        assert!(SyncError::DuplicateKey {
            side: Side::Destination,
            key: "7".into(),
        }
        .is_data_error());
        assert!(!SyncError::save("constraint violation").is_data_error());
        assert!(!SyncError::AlreadyRunning("users".into()).is_data_error());
    }

    #[test]
    fn error_display() {
        let err = SyncError::data_retrieval(Side::Destination, "connection refused");
        assert_eq!(
            err.to_string(),
            "failed to retrieve destination data: connection refused"
        );

        let err = SyncError::DuplicateKey {
            side: Side::Source,
            key: "\"alice\"".into(),
        };
        assert_eq!(err.to_string(), "duplicate key \"alice\" in source data");
    }

    #[test]
    fn external_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "users.json missing");
        let err = SyncError::external(io);
        assert_eq!(err.to_string(), "users.json missing");
        assert!(matches!(err, SyncError::External(_)));
    }
}
