//! Error types for the Extractor

use thiserror::Error;

/// Errors raised by extractor configuration and input checks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractorError {
    /// Input text is empty or whitespace only
    #[error("Input text is empty")]
    EmptyInput,

    /// Text exceeds maximum length
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// Configuration value out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML (de)serialization error
    #[error("TOML error: {0}")]
    Toml(String),
}
