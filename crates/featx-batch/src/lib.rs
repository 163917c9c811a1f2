//! featx Batch Processing
//!
//! Drives every input file through extraction with bounded concurrency.
//!
//! # Architecture
//!
//! ```text
//! discover → BatchOrchestrator ─┬─ ExtractionEngine → LlmClient
//!                               ├─ OutputWriter (artifact)
//!                               ├─ FileMover (processed/ or processed/errors/)
//!                               └─ RunSummary → SummaryWriter
//! ```
//!
//! Each file moves through `Discovered → Dispatched → {Succeeded | Partial |
//! Failed} → Relocated`. A failure only ever affects its own file; the run always
//! ends with a summary listing every file's final status.

#![warn(missing_docs)]

pub mod config;
pub mod discovery;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod relocate;
pub mod summary;
pub mod traits;

pub use config::{BatchConfig, ERROR_SUBDIR};
pub use discovery::{discover, SourceFile};
pub use error::BatchError;
pub use orchestrator::{BatchOrchestrator, Progress, ProgressCallback};
pub use output::{CsvOutputWriter, JsonSummaryWriter};
pub use relocate::FsMover;
pub use summary::{FileReport, FileStatus, RunSummary};
pub use traits::{Destination, FileMover, OutputWriter, SummaryWriter};
