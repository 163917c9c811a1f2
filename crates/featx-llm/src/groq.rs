//! Groq Provider Implementation
//!
//! Groq serves an OpenAI-compatible API, so this wraps [`OpenAiClient`] with
//! Groq's base URL, credential and default model.

use crate::openai::OpenAiClient;
use crate::LlmError;
use async_trait::async_trait;
use featx_domain::{ErrorInfo, FeatureSchema, LlmClient, StructuredReply};
use std::time::Duration;

/// Default Groq API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

/// Environment variable holding the API key
pub const API_KEY_VAR: &str = "GROQ_API_KEY";

/// Client for the Groq API
#[derive(Clone)]
pub struct GroqClient {
    inner: OpenAiClient,
}

impl GroqClient {
    /// Create a client for the Groq API
    ///
    /// # Errors
    ///
    /// Returns `MissingCredential` if the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let inner = OpenAiClient::new(api_key)
            .map_err(|_| LlmError::MissingCredential(API_KEY_VAR.to_string()))?
            .with_base_url(DEFAULT_BASE_URL)
            .with_model(DEFAULT_MODEL)
            .with_provider_name("groq");
        Ok(Self { inner })
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.inner = self.inner.with_model(model);
        self
    }

    /// Set a custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.inner = self.inner.with_base_url(url);
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.with_timeout(timeout);
        self
    }
}

#[async_trait]
impl LlmClient for GroqClient {
    fn provider(&self) -> &str {
        self.inner.provider()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    fn request_timeout(&self) -> Duration {
        self.inner.request_timeout()
    }

    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, ErrorInfo> {
        self.inner.complete(prompt, timeout).await
    }

    async fn extract(
        &self,
        prompt: &str,
        schema: &FeatureSchema,
    ) -> Result<StructuredReply, ErrorInfo> {
        self.inner.extract(prompt, schema).await
    }
}
