//! Error types for batch operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running a batch
///
/// Only configuration, pattern and directory errors abort a run; the others are
/// recorded against the file they happened to.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File pattern is not a valid glob
    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Pattern as configured
        pattern: String,
        /// Parser message
        reason: String,
    },

    /// Filesystem operation failed
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being read, written or moved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Another file in the run already wrote this artifact path
    #[error("Artifact {} already written for {claimed_by}", path.display())]
    ArtifactClaimed {
        /// Contested artifact path
        path: PathBuf,
        /// File that owns it
        claimed_by: String,
    },

    /// Artifact rendering failed
    #[error("Output error: {0}")]
    Output(String),
}

impl BatchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BatchError::Io {
            path: path.into(),
            source,
        }
    }
}
