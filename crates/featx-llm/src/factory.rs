//! Provider selection and construction
//!
//! The single place that maps a configured provider name to a client. Adding a
//! provider means adding a [`ProviderKind`] variant and one match arm in
//! [`ProviderFactory::create`].

use crate::{anthropic, groq, openai, AnthropicClient, GroqClient, LlmError, OpenAiClient};
use featx_domain::traits::DEFAULT_REQUEST_TIMEOUT;
use featx_domain::LlmClient;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// OpenAI chat completions
    OpenAi,
    /// Anthropic messages
    Anthropic,
    /// Groq (OpenAI-compatible)
    Groq,
}

impl ProviderKind {
    /// Every supported provider
    pub const ALL: [ProviderKind; 3] = [ProviderKind::OpenAi, ProviderKind::Anthropic, ProviderKind::Groq];

    /// Configuration name of the provider
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Groq => "groq",
        }
    }

    /// Environment variable holding the provider's API key
    pub fn api_key_var(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => openai::API_KEY_VAR,
            ProviderKind::Anthropic => anthropic::API_KEY_VAR,
            ProviderKind::Groq => groq::API_KEY_VAR,
        }
    }

    /// Model used when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => openai::DEFAULT_MODEL,
            ProviderKind::Anthropic => anthropic::DEFAULT_MODEL,
            ProviderKind::Groq => groq::DEFAULT_MODEL,
        }
    }

    fn supported() -> String {
        Self::ALL
            .iter()
            .map(ProviderKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| LlmError::UnknownProvider {
                name: s.to_string(),
                supported: Self::supported(),
            })
    }
}

type CredentialLookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Builds the configured [`LlmClient`]
///
/// # Examples
///
/// ```
/// use featx_domain::LlmClient;
/// use featx_llm::ProviderFactory;
///
/// let factory = ProviderFactory::with_credentials(|var| {
///     (var == "GROQ_API_KEY").then(|| "gsk-test".to_string())
/// });
/// let client = factory.create("Groq", None).unwrap();
/// assert_eq!(client.model(), "llama3-70b-8192");
///
/// assert!(factory.create("openai", None).is_err());
/// ```
pub struct ProviderFactory {
    credentials: Box<CredentialLookup>,
    request_timeout: Duration,
}

impl ProviderFactory {
    /// Factory reading credentials from the process environment
    pub fn from_env() -> Self {
        Self::with_credentials(|var| std::env::var(var).ok())
    }

    /// Factory with a custom credential lookup
    pub fn with_credentials<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            credentials: Box::new(lookup),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Per-request timeout given to created clients
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Create the client for `provider`, optionally overriding its default model
    ///
    /// # Errors
    ///
    /// - `UnknownProvider` if the name is not supported
    /// - `MissingCredential` if the provider's API key is unset or empty
    pub fn create(&self, provider: &str, model: Option<&str>) -> Result<Arc<dyn LlmClient>, LlmError> {
        let kind: ProviderKind = provider.parse()?;
        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(kind.default_model());

        let api_key = (self.credentials)(kind.api_key_var())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| LlmError::MissingCredential(kind.api_key_var().to_string()))?;

        info!(provider = %kind, model, "Creating LLM client");

        let client: Arc<dyn LlmClient> = match kind {
            ProviderKind::OpenAi => Arc::new(
                OpenAiClient::new(api_key)?
                    .with_model(model)
                    .with_timeout(self.request_timeout),
            ),
            ProviderKind::Anthropic => Arc::new(
                AnthropicClient::new(api_key)?
                    .with_model(model)
                    .with_timeout(self.request_timeout),
            ),
            ProviderKind::Groq => Arc::new(
                GroqClient::new(api_key)?
                    .with_model(model)
                    .with_timeout(self.request_timeout),
            ),
        };
        Ok(client)
    }
}

impl Default for ProviderFactory {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory_with_all_keys() -> ProviderFactory {
        ProviderFactory::with_credentials(|var| Some(format!("key-for-{}", var)))
    }

    #[test]
    fn test_provider_kind_parsing_is_case_insensitive() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(" anthropic ".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert_eq!("GROQ".parse::<ProviderKind>().unwrap(), ProviderKind::Groq);
    }

    #[test]
    fn test_unknown_provider_lists_supported_names() {
        let err = "mistral".parse::<ProviderKind>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown provider 'mistral' (supported: openai, anthropic, groq)"
        );
    }

    #[test]
    fn test_create_each_provider_with_default_model() {
        let factory = factory_with_all_keys();
        for kind in ProviderKind::ALL {
            let client = factory.create(kind.as_str(), None).unwrap();
            assert_eq!(client.provider(), kind.as_str());
            assert_eq!(client.model(), kind.default_model());
        }
    }

    #[test]
    fn test_create_with_model_override() {
        let client = factory_with_all_keys()
            .create("openai", Some("gpt-4o-mini"))
            .unwrap();
        assert_eq!(client.model(), "gpt-4o-mini");

        let client = factory_with_all_keys().create("openai", Some("  ")).unwrap();
        assert_eq!(client.model(), "gpt-4o");
    }

    #[test]
    fn test_create_passes_request_timeout() {
        let client = factory_with_all_keys()
            .with_request_timeout(Duration::from_secs(5))
            .create("anthropic", None)
            .unwrap();
        assert_eq!(client.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_missing_credential() {
        let factory = ProviderFactory::with_credentials(|_| None);
        let err = factory.create("anthropic", None).err().unwrap();
        assert_eq!(err, LlmError::MissingCredential("ANTHROPIC_API_KEY".into()));

        let factory = ProviderFactory::with_credentials(|_| Some(String::new()));
        assert!(factory.create("groq", None).is_err());
    }

    #[test]
    fn test_unknown_provider_fails_before_credential_lookup() {
        let factory = ProviderFactory::with_credentials(|_| panic!("lookup must not run"));
        assert!(matches!(
            factory.create("cohere", None).err().unwrap(),
            LlmError::UnknownProvider { .. }
        ));
    }
}
