//! featx LLM Provider Layer
//!
//! Implementations of the `LlmClient` capability from `featx-domain`.
//!
//! # Providers
//!
//! - `MockClient`: Deterministic mock for testing
//! - `OpenAiClient`: OpenAI chat completions API
//! - `AnthropicClient`: Anthropic messages API
//! - `GroqClient`: Groq's OpenAI-compatible API
//!
//! Use [`ProviderFactory`] to build the configured provider by name.
//!
//! # Examples
//!
//! ```
//! use featx_llm::MockClient;
//! use featx_domain::LlmClient;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let client = MockClient::new(r#"{"color": "red"}"#);
//! let text = client.complete("any prompt", Duration::from_secs(1)).await.unwrap();
//! assert_eq!(text, r#"{"color": "red"}"#);
//! # }
//! ```

#![warn(missing_docs)]

pub mod anthropic;
pub mod factory;
pub mod groq;
mod http;
pub mod openai;

use async_trait::async_trait;
use featx_domain::{ErrorInfo, LlmClient};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

pub use anthropic::AnthropicClient;
pub use factory::{ProviderFactory, ProviderKind};
pub use groq::GroqClient;
pub use openai::OpenAiClient;

/// Sampling temperature shared by all providers
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Errors raised while constructing a provider client
///
/// Failures of individual requests are reported as [`ErrorInfo`] instead, so the
/// extraction engine can classify and retry them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// No credential available for the provider
    #[error("Missing credential: {0} is not set")]
    MissingCredential(String),

    /// Provider name not recognized
    #[error("Unknown provider '{name}' (supported: {supported})")]
    UnknownProvider {
        /// Name as configured
        name: String,
        /// Comma-separated list of supported names
        supported: String,
    },

    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// A canned outcome for one `MockClient` call
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Return this text as the model output
    Text(String),

    /// Fail with this error
    Fail(ErrorInfo),
}

impl MockReply {
    /// Text reply
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text(text.into())
    }

    /// Failing reply
    pub fn fail(error: ErrorInfo) -> Self {
        MockReply::Fail(error)
    }
}

#[derive(Debug, Default)]
struct MockStats {
    calls: usize,
    in_flight: usize,
    max_in_flight: usize,
}

/// Mock LLM client for deterministic testing
///
/// Returns pre-configured replies without making network calls. Replies are
/// chosen in this order: the first marker contained in the prompt, then the next
/// scripted reply, then the default.
///
/// Clones share their script and counters.
///
/// # Examples
///
/// ```
/// use featx_domain::ErrorInfo;
/// use featx_llm::{MockClient, MockReply};
///
/// let client = MockClient::new("{}")
///     .with_marker("broken.txt", MockReply::fail(ErrorInfo::provider("HTTP 401", false)));
/// client.push_reply(MockReply::fail(ErrorInfo::rate_limited("HTTP 429")));
/// assert_eq!(client.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockClient {
    default_reply: MockReply,
    markers: Vec<(String, MockReply)>,
    script: Arc<Mutex<VecDeque<MockReply>>>,
    stats: Arc<Mutex<MockStats>>,
    delay: Duration,
}

impl MockClient {
    /// Create a client that answers every prompt with `text`
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_default(MockReply::text(text))
    }

    /// Create a client with an arbitrary default reply
    pub fn with_default(reply: MockReply) -> Self {
        Self {
            default_reply: reply,
            markers: Vec::new(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            stats: Arc::new(Mutex::new(MockStats::default())),
            delay: Duration::ZERO,
        }
    }

    /// Answer with `reply` whenever the prompt contains `marker`
    pub fn with_marker(mut self, marker: impl Into<String>, reply: MockReply) -> Self {
        self.markers.push((marker.into(), reply));
        self
    }

    /// Wait this long inside every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queue a one-shot reply, consumed in FIFO order
    pub fn push_reply(&self, reply: MockReply) {
        lock(&self.script).push_back(reply);
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        lock(&self.stats).calls
    }

    /// Highest number of calls that were in progress at the same time
    pub fn max_in_flight(&self) -> usize {
        lock(&self.stats).max_in_flight
    }

    fn next_reply(&self, prompt: &str) -> MockReply {
        if let Some((_, reply)) = self.markers.iter().find(|(m, _)| prompt.contains(m.as_str())) {
            return reply.clone();
        }
        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new("{}")
    }
}

/// Decrements the in-flight counter even when the call is cancelled
struct InFlight<'a>(&'a Mutex<MockStats>);

impl<'a> InFlight<'a> {
    fn enter(stats: &'a Mutex<MockStats>) -> Self {
        let mut guard = lock(stats);
        guard.calls += 1;
        guard.in_flight += 1;
        guard.max_in_flight = guard.max_in_flight.max(guard.in_flight);
        Self(stats)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.0).in_flight -= 1;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl LlmClient for MockClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, prompt: &str, _timeout: Duration) -> Result<String, ErrorInfo> {
        let _in_flight = InFlight::enter(&self.stats);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.next_reply(prompt) {
            MockReply::Text(text) => Ok(text),
            MockReply::Fail(error) => Err(error),
        }
    }
}
