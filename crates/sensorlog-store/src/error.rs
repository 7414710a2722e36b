//! Error types for sensorlog-store.

use std::path::PathBuf;

use sensorlog_types::{Timestamp, ValidationError};

/// Result type for sensorlog-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sensorlog-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A reading failed validation before anything was written.
    #[error("Invalid reading: {0}")]
    InvalidReading(#[from] ValidationError),

    /// An advance asked the checkpoint register to move backward.
    ///
    /// The register only moves forward in time. The call is rejected
    /// before the register is touched; retrying with the same arguments
    /// fails the same way.
    #[error("Checkpoint cannot move backward (from {expected} to {requested})")]
    CheckpointRegression {
        /// The previous value the caller claimed to have observed.
        expected: Timestamp,
        /// The smaller value the caller asked to store.
        requested: Timestamp,
    },

    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create a database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// True for errors caused by the caller's input.
    ///
    /// Validation failures reject the call before any state changes, so
    /// retrying without fixing the input is pointless.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidReading(_) | Error::CheckpointRegression { .. }
        )
    }

    /// True for storage-layer failures where retrying the call may help.
    ///
    /// A retried append can at worst duplicate a reading, which the log
    /// permits; a retried advance whose first attempt actually landed
    /// reports success again because equal values compare-and-swap cleanly.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !self.is_validation()
    }
}
