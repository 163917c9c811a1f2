//! featx Domain Layer
//!
//! Core data model for LLM-driven product feature extraction. Every other crate in
//! the workspace depends on these types; infrastructure (HTTP providers, filesystem,
//! CLI) lives elsewhere.
//!
//! ## Key Concepts
//!
//! - **Feature**: a named, typed attribute to extract (e.g. `weight_kg`, `is_waterproof`)
//! - **FeatureSchema**: the ordered, run-wide set of features parsed from a feature list
//! - **Structured reply**: the provider's answer parsed into a `name → value` mapping
//! - **Sentinel**: the `UNKNOWN` marker a model emits for undeterminable features
//! - **ErrorInfo**: file-scoped failure classification with a retry hint
//!
//! ## Example
//!
//! ```
//! use featx_domain::{FeatureSchema, FeatureValue};
//! use serde_json::json;
//!
//! let schema = FeatureSchema::parse(["weight_kg", "is_waterproof", "material"]).unwrap();
//! let raw = json!({"weight_kg": "1.2", "is_waterproof": "UNKNOWN", "material": "steel"});
//! let values = schema.validate(raw.as_object().unwrap());
//!
//! assert_eq!(values.get("weight_kg"), Some(&Some(FeatureValue::Number(1.2))));
//! assert_eq!(values.get("is_waterproof"), Some(&None));
//! assert!(!values.is_complete());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod extraction;
pub mod feature;
pub mod reply;
pub mod schema;
pub mod traits;
pub mod value;

// Re-exports for convenience
pub use error::SchemaError;
pub use extraction::{
    ErrorInfo, ErrorKind, ExtractionRequest, ExtractionResult, ExtractionStatus,
};
pub use feature::{FeatureDefinition, FeatureType};
pub use reply::{parse_structured_reply, StructuredReply};
pub use schema::FeatureSchema;
pub use traits::{LlmClient, DEFAULT_REQUEST_TIMEOUT};
pub use value::{FeatureValue, FeatureValues, UNKNOWN_SENTINEL};
