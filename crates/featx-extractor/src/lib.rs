//! featx Extractor
//!
//! Turns one product description into validated feature values using an LLM.
//!
//! # Architecture
//!
//! ```text
//! Text + FeatureSchema → PromptBuilder → LlmClient → validate → ExtractionResult
//! ```
//!
//! The [`ExtractionEngine`] owns the retry policy: retryable failures are retried
//! with capped exponential backoff, invalid replies are retried up to a separate
//! cap, and a cancellation token stops retries between attempts.
//!
//! # Example Usage
//!
//! ```
//! use featx_domain::{ExtractionRequest, ExtractionStatus, FeatureSchema};
//! use featx_extractor::{ExtractionEngine, ExtractorConfig};
//! use featx_llm::MockClient;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let schema = Arc::new(FeatureSchema::parse(["weight_kg", "material"]).unwrap());
//! let client = MockClient::new(r#"{"weight_kg": 1.2, "material": "steel"}"#);
//! let engine = ExtractionEngine::new(ExtractorConfig::default());
//!
//! let request = ExtractionRequest::new("kettle.txt", "A 1.2 kg steel kettle.", schema);
//! let result = engine.extract(&request, &client).await;
//!
//! assert_eq!(result.status, ExtractionStatus::Success);
//! assert_eq!(result.attempts, 1);
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod prompt;


pub use config::ExtractorConfig;
pub use engine::ExtractionEngine;
pub use error::ExtractorError;
pub use prompt::{build_prompt, PromptBuilder};
