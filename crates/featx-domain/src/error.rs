//! Error types for schema construction

use thiserror::Error;

/// Errors raised while building a [`FeatureSchema`](crate::FeatureSchema)
///
/// These are fatal for a run: they surface before any file is dispatched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// No feature definitions remained after skipping blanks and comments
    #[error("Feature list is empty")]
    Empty,

    /// Two definitions share a name (compared case-insensitively)
    #[error("Duplicate feature name: {0}")]
    Duplicate(String),

    /// A line could not be read as a feature definition
    #[error("Invalid feature definition on line {line}: {reason}")]
    InvalidLine {
        /// 1-based line number in the feature list
        line: usize,
        /// What was wrong with the line
        reason: String,
    },
}
