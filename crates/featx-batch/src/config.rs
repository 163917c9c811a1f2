//! Configuration for batch runs
//!
//! Defines where input files are found and where artifacts, processed files and
//! the run summary go.

use crate::error::BatchError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sub-directory of `processed_dir` receiving failed files
pub const ERROR_SUBDIR: &str = "errors";

/// Configuration for the batch orchestrator
///
/// # Examples
///
/// ```
/// use featx_batch::BatchConfig;
///
/// let config = BatchConfig::default();
/// assert_eq!(config.batch_size, 5);
/// assert_eq!(config.file_pattern, "product_*.txt");
/// assert!(config.error_dir().ends_with("processed_files/errors"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Directory scanned for input files
    pub input_dir: PathBuf,

    /// Directory receiving one artifact per successful file
    pub output_dir: PathBuf,

    /// Directory receiving processed input files
    pub processed_dir: PathBuf,

    /// Glob matched against file names in `input_dir`
    pub file_pattern: String,

    /// Maximum number of files extracted at the same time
    pub batch_size: usize,

    /// Where the run summary is written
    pub summary_file: PathBuf,
}

impl BatchConfig {
    /// Location of files that failed
    pub fn error_dir(&self) -> PathBuf {
        self.processed_dir.join(ERROR_SUBDIR)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.batch_size == 0 {
            return Err(BatchError::Config("batch_size must be at least 1".to_string()));
        }
        if self.file_pattern.trim().is_empty() {
            return Err(BatchError::Config("file_pattern must not be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input_files"),
            output_dir: PathBuf::from("output_files"),
            processed_dir: PathBuf::from("processed_files"),
            file_pattern: "product_*.txt".to_string(),
            batch_size: 5,
            summary_file: PathBuf::from("extraction_summary.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let config = BatchConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(BatchError::Config(_))));
    }

    #[test]
    fn test_blank_pattern_is_rejected() {
        let config = BatchConfig {
            file_pattern: " ".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
