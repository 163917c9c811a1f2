//! Error types for the CLI application.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that stop a run before or while it starts.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("Cannot read config file {}: {source}", path.display())]
    ConfigFile {
        /// Config file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Feature list could not be read
    #[error("Cannot read features file {}: {source}", path.display())]
    FeaturesFile {
        /// Features file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Feature schema error
    #[error("Feature schema error: {0}")]
    Schema(#[from] featx_domain::SchemaError),

    /// Provider construction error
    #[error("LLM provider error: {0}")]
    Llm(#[from] featx_llm::LlmError),

    /// Extraction engine configuration error
    #[error("Extractor error: {0}")]
    Extractor(#[from] featx_extractor::ExtractorError),

    /// Batch setup error
    #[error("Batch error: {0}")]
    Batch(#[from] featx_batch::BatchError),

    /// Logging could not be installed
    #[error("Logging error: {0}")]
    Logging(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
