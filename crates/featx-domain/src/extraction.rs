//! Extraction requests, results and file-scoped error classification

use crate::schema::FeatureSchema;
use crate::value::FeatureValues;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Classification of a file-scoped failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// HTTP or network failure talking to the provider
    ProviderError,

    /// The provider did not answer within the allotted time
    Timeout,

    /// The provider signalled a rate limit
    RateLimited,

    /// The reply could not be parsed into a structured mapping
    InvalidResponse,

    /// Reading, writing or moving a local file failed, or the input was unusable
    IoError,
}

impl ErrorKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ProviderError => "provider_error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::InvalidResponse => "invalid_response",
            ErrorKind::IoError => "io_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified, file-scoped failure
///
/// These never abort a batch; they are retried per policy and then recorded.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ErrorInfo {
    /// Failure classification
    pub kind: ErrorKind,

    /// Human-readable detail
    pub message: String,

    /// Whether another attempt may succeed
    pub retryable: bool,
}

impl ErrorInfo {
    /// Create an error with explicit retry semantics
    pub fn new(kind: ErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    /// Provider-side HTTP or network failure
    pub fn provider(message: impl Into<String>, retryable: bool) -> Self {
        Self::new(ErrorKind::ProviderError, message, retryable)
    }

    /// Timeout (always retryable)
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message, true)
    }

    /// Rate limit (always retryable)
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message, true)
    }

    /// Unparseable or empty reply (retryable; the engine caps repeats)
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidResponse, message, true)
    }

    /// Local I/O or unusable input (not retryable)
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IoError, message, false)
    }
}

/// Final status of one extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    /// Every feature resolved to a value
    Success,

    /// The reply was valid but some features are null
    Partial,

    /// No usable reply was obtained
    Failed,
}

impl ExtractionStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStatus::Success => "success",
            ExtractionStatus::Partial => "partial",
            ExtractionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to extract features from one input file
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Identifier of the source file (its file name)
    pub file_id: String,

    /// Full product description text
    pub raw_text: String,

    /// Run-wide feature schema
    pub schema: Arc<FeatureSchema>,
}

impl ExtractionRequest {
    /// Create a new request
    pub fn new(
        file_id: impl Into<String>,
        raw_text: impl Into<String>,
        schema: Arc<FeatureSchema>,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            raw_text: raw_text.into(),
            schema,
        }
    }
}

/// Outcome of extracting one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    /// Identifier of the source file
    pub file_id: String,

    /// One entry per schema feature
    pub values: FeatureValues,

    /// Final status
    pub status: ExtractionStatus,

    /// Last error, set when the status is `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,

    /// Provider attempts made (0 when the request failed before any call)
    pub attempts: u32,
}

impl ExtractionResult {
    /// Build a successful or partial result from validated values
    pub fn from_values(file_id: impl Into<String>, values: FeatureValues, attempts: u32) -> Self {
        let status = if values.is_complete() {
            ExtractionStatus::Success
        } else {
            ExtractionStatus::Partial
        };

        Self {
            file_id: file_id.into(),
            values,
            status,
            error: None,
            attempts,
        }
    }

    /// Build a failed result with all-null values
    pub fn failed(
        file_id: impl Into<String>,
        schema: &FeatureSchema,
        error: ErrorInfo,
        attempts: u32,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            values: FeatureValues::unresolved(schema),
            status: ExtractionStatus::Failed,
            error: Some(error),
            attempts,
        }
    }

    /// Whether the extraction failed
    pub fn is_failed(&self) -> bool {
        self.status == ExtractionStatus::Failed
    }

    /// Number of features that resolved to a value
    pub fn features_found(&self) -> usize {
        self.values.resolved_count()
    }

    /// Turn this result into a failure, keeping the attempt count
    ///
    /// Used when a later pipeline step (artifact write, relocation) fails.
    pub fn into_failed(self, schema: &FeatureSchema, error: ErrorInfo) -> Self {
        Self::failed(self.file_id, schema, error, self.attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> FeatureSchema {
        FeatureSchema::parse(["weight_kg", "material"]).unwrap()
    }

    #[test]
    fn test_error_constructors_set_retry_semantics() {
        assert!(ErrorInfo::rate_limited("slow down").retryable);
        assert!(ErrorInfo::timeout("late").retryable);
        assert!(ErrorInfo::invalid_response("garbage").retryable);
        assert!(!ErrorInfo::io("missing").retryable);
        assert!(!ErrorInfo::provider("401", false).retryable);
    }

    #[test]
    fn test_error_display() {
        let err = ErrorInfo::rate_limited("HTTP 429");
        assert_eq!(err.to_string(), "rate_limited: HTTP 429");
    }

    #[test]
    fn test_result_status_from_values() {
        let schema = schema();
        let complete = schema.validate(json!({"weight_kg": 2, "material": "oak"}).as_object().unwrap());
        let result = ExtractionResult::from_values("a.txt", complete, 1);
        assert_eq!(result.status, ExtractionStatus::Success);
        assert_eq!(result.features_found(), 2);

        let partial = schema.validate(json!({"weight_kg": 2}).as_object().unwrap());
        let result = ExtractionResult::from_values("a.txt", partial, 2);
        assert_eq!(result.status, ExtractionStatus::Partial);
        assert_eq!(result.attempts, 2);
    }

    #[test]
    fn test_failed_result_has_every_key_null() {
        let schema = schema();
        let result = ExtractionResult::failed("a.txt", &schema, ErrorInfo::io("empty"), 0);

        assert!(result.is_failed());
        assert_eq!(result.values.len(), 2);
        assert_eq!(result.features_found(), 0);
        assert_eq!(result.error.unwrap().kind, ErrorKind::IoError);
    }

    #[test]
    fn test_result_serialization() {
        let schema = schema();
        let result = ExtractionResult::failed("a.txt", &schema, ErrorInfo::timeout("60s"), 3);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"]["kind"], "timeout");
        assert_eq!(json["values"]["weight_kg"], serde_json::Value::Null);
        assert_eq!(json["attempts"], 3);
    }
}
