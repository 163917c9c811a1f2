//! Seams between the orchestrator and the filesystem

use crate::error::BatchError;
use crate::summary::RunSummary;
use async_trait::async_trait;
use featx_domain::{ExtractionResult, FeatureSchema};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where a source file goes once its extraction is settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// Successful or partial extraction with a written artifact
    Processed,

    /// Failed extraction
    Error,
}

/// Persists one artifact per successful or partial extraction
#[async_trait]
pub trait OutputWriter: Send + Sync {
    /// Write the artifact and return its path
    ///
    /// Either the complete artifact exists afterwards or nothing does.
    async fn write(&self, result: &ExtractionResult, schema: &FeatureSchema) -> Result<PathBuf, BatchError>;

    /// Remove a previously written artifact
    async fn remove(&self, path: &Path) -> Result<(), BatchError>;
}

/// Moves source files out of the input directory
#[async_trait]
pub trait FileMover: Send + Sync {
    /// Move `source` to `destination` and return the new path
    ///
    /// Succeeds without doing anything when the file has already been moved.
    async fn relocate(&self, source: &Path, destination: Destination) -> Result<PathBuf, BatchError>;
}

/// Persists the run summary once at the end of a run
#[async_trait]
pub trait SummaryWriter: Send + Sync {
    /// Write the summary and return its path
    async fn write(&self, summary: &RunSummary) -> Result<PathBuf, BatchError>;
}
