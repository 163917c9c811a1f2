//! OpenAI Provider Implementation
//!
//! Talks to the chat completions endpoint. The same wire format is served by
//! OpenAI-compatible providers, which reuse this client with their own base URL
//! (see [`GroqClient`](crate::GroqClient)).
//!
//! # Examples
//!
//! ```no_run
//! use featx_llm::OpenAiClient;
//!
//! let client = OpenAiClient::new("sk-...").unwrap().with_model("gpt-4o-mini");
//! ```

use crate::http::{build_client, status_error, transport_error};
use crate::{LlmError, DEFAULT_TEMPERATURE};
use async_trait::async_trait;
use featx_domain::traits::DEFAULT_REQUEST_TIMEOUT;
use featx_domain::{ErrorInfo, LlmClient};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default OpenAI API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Environment variable holding the API key
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Client for OpenAI-style chat completion APIs
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    provider: &'static str,
    temperature: f32,
    timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: u64,
}

impl OpenAiClient {
    /// Create a client for the OpenAI API
    ///
    /// # Errors
    ///
    /// Returns `MissingCredential` if the key is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingCredential(API_KEY_VAR.to_string()));
        }

        Ok(Self {
            http: build_client()?,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            provider: "openai",
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Set the chat model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (proxies, compatible providers, tests)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn with_provider_name(mut self, provider: &'static str) -> Self {
        self.provider = provider;
        self
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn provider(&self) -> &str {
        self.provider
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn request_timeout(&self) -> Duration {
        self.timeout
    }

    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, ErrorInfo> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(self.provider, e))?;

        if !response.status().is_success() {
            return Err(status_error(self.provider, response).await);
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| transport_error(self.provider, e))?;

        if let Some(usage) = &body.usage {
            debug!(provider = self.provider, tokens = usage.total_tokens, "Completion usage");
        }

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ErrorInfo::invalid_response(format!("No content in {} response", self.provider))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featx_domain::ErrorKind;

    const T: Duration = Duration::from_secs(5);

    fn client(server: &mockito::ServerGuard) -> OpenAiClient {
        OpenAiClient::new("test-key").unwrap().with_base_url(server.url())
    }

    #[test]
    fn test_openai_client_creation() {
        let client = OpenAiClient::new("key").unwrap();
        assert_eq!(client.model(), DEFAULT_MODEL);
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.provider(), "openai");
        assert_eq!(client.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_openai_rejects_empty_key() {
        let err = OpenAiClient::new("  ").err().unwrap();
        assert_eq!(err, LlmError::MissingCredential(API_KEY_VAR.into()));
    }

    #[tokio::test]
    async fn test_openai_complete_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4o",
                "temperature": 0.1
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"message":{"role":"assistant","content":"{\"color\":\"red\"}"}}],
                    "usage":{"total_tokens":42}}"#,
            )
            .create_async()
            .await;

        let text = client(&server).complete("prompt", T).await.unwrap();
        assert_eq!(text, r#"{"color":"red"}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_openai_rate_limit_is_classified() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error":{"code":"rate_limit_exceeded"}}"#)
            .create_async()
            .await;

        let err = client(&server).complete("prompt", T).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RateLimited);
        assert!(err.retryable);
    }

    #[tokio::test]
    async fn test_openai_unauthorized_is_not_retryable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key"}}"#)
            .create_async()
            .await;

        let err = client(&server).complete("prompt", T).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ProviderError);
        assert!(!err.retryable);
    }

    #[tokio::test]
    async fn test_openai_missing_content_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = client(&server).complete("prompt", T).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_openai_malformed_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let err = client(&server).complete("prompt", T).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_openai_connection_failure_is_retryable() {
        let client = OpenAiClient::new("key")
            .unwrap()
            .with_base_url("http://127.0.0.1:9");

        let err = client.complete("prompt", T).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ProviderError);
        assert!(err.retryable);
    }
}
