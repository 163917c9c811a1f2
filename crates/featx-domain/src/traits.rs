//! Trait definitions for external interactions
//!
//! Provider implementations live in `featx-llm`; the extraction engine only sees
//! this capability.

use crate::extraction::ErrorInfo;
use crate::reply::{parse_structured_reply, StructuredReply};
use crate::schema::FeatureSchema;
use async_trait::async_trait;
use std::time::Duration;

/// Request timeout used when a client does not configure its own
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Uniform extraction capability over an LLM provider
///
/// Each implementation classifies its provider's failures into
/// [`ErrorInfo`](crate::ErrorInfo) kinds so callers can apply one retry policy.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider name (e.g. "openai")
    fn provider(&self) -> &str;

    /// Model used for completions
    fn model(&self) -> &str;

    /// Timeout applied to each `complete` call made by `extract`
    fn request_timeout(&self) -> Duration {
        DEFAULT_REQUEST_TIMEOUT
    }

    /// Send a prompt and return the raw model text
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, ErrorInfo>;

    /// Send a prompt and parse the reply as a `feature → value` mapping
    ///
    /// The schema is available to implementations that can request
    /// provider-native structured output; the default parses free text.
    async fn extract(
        &self,
        prompt: &str,
        _schema: &FeatureSchema,
    ) -> Result<StructuredReply, ErrorInfo> {
        let text = self.complete(prompt, self.request_timeout()).await?;
        parse_structured_reply(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ErrorKind;

    struct CannedClient {
        reply: &'static str,
    }

    #[async_trait]
    impl LlmClient for CannedClient {
        fn provider(&self) -> &str {
            "canned"
        }

        fn model(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, ErrorInfo> {
            Ok(self.reply.to_string())
        }
    }

    #[tokio::test]
    async fn test_default_extract_parses_reply() {
        let schema = FeatureSchema::parse(["material"]).unwrap();
        let client = CannedClient {
            reply: "```json\n{\"material\": \"oak\"}\n```",
        };

        let reply = client.extract("prompt", &schema).await.unwrap();
        assert_eq!(reply["material"], "oak");
        assert_eq!(client.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_default_extract_rejects_prose() {
        let schema = FeatureSchema::parse(["material"]).unwrap();
        let client = CannedClient {
            reply: "I could not find any features.",
        };

        let err = client.extract("prompt", &schema).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidResponse);
    }
}
