//! Core extraction engine: prompt, call, validate, retry

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::prompt::build_prompt;
use featx_domain::{
    ErrorInfo, ErrorKind, ExtractionRequest, ExtractionResult, FeatureSchema, FeatureValues,
    LlmClient,
};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Drives one extraction request through the provider with retries
///
/// Cheap to clone; clones share the cancellation token.
#[derive(Debug, Clone)]
pub struct ExtractionEngine {
    config: ExtractorConfig,
    cancel: CancellationToken,
}

impl ExtractionEngine {
    /// Create a new engine
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop retrying once `token` is cancelled
    ///
    /// An attempt already in progress is allowed to finish.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Engine configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract features for one request
    ///
    /// Never returns an error: failures are classified into the result's
    /// `error` with status `Failed` and all-null values.
    pub async fn extract(&self, request: &ExtractionRequest, client: &dyn LlmClient) -> ExtractionResult {
        let file_id = request.file_id.as_str();
        let schema = request.schema.as_ref();

        if let Err(e) = self.check_input(&request.raw_text) {
            warn!(file_id, error = %e, "Rejecting input without calling the provider");
            return ExtractionResult::failed(file_id, schema, ErrorInfo::io(e.to_string()), 0);
        }

        let prompt = build_prompt(schema, &request.raw_text);
        debug!(file_id, prompt_len = prompt.len(), "Prompt built");

        let mut attempts = 0u32;
        let mut invalid_responses = 0u32;

        loop {
            attempts += 1;

            let error = match self.attempt(&prompt, schema, client).await {
                Ok(values) => {
                    let result = ExtractionResult::from_values(file_id, values, attempts);
                    info!(
                        file_id,
                        status = %result.status,
                        attempts,
                        features_found = result.features_found(),
                        "Extraction complete"
                    );
                    return result;
                }
                Err(error) => error,
            };

            if error.kind == ErrorKind::InvalidResponse {
                invalid_responses += 1;
            }

            let give_up = !error.retryable
                || attempts >= self.config.max_attempts
                || invalid_responses > self.config.max_invalid_responses
                || self.cancel.is_cancelled();

            if give_up {
                warn!(file_id, attempts, error = %error, "Extraction failed");
                return ExtractionResult::failed(file_id, schema, error, attempts);
            }

            let delay = self.config.backoff_for(attempts);
            warn!(
                file_id,
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Attempt failed, retrying"
            );

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!(file_id, attempts, "Retry abandoned after cancellation");
                    return ExtractionResult::failed(file_id, schema, error, attempts);
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    fn check_input(&self, text: &str) -> Result<(), ExtractorError> {
        if text.trim().is_empty() {
            return Err(ExtractorError::EmptyInput);
        }
        let length = text.chars().count();
        if length > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(length, self.config.max_text_length));
        }
        Ok(())
    }

    /// One provider call under the outer timeout, validated against the schema
    async fn attempt(
        &self,
        prompt: &str,
        schema: &FeatureSchema,
        client: &dyn LlmClient,
    ) -> Result<FeatureValues, ErrorInfo> {
        let limit = self.config.attempt_timeout();
        let reply = timeout(limit, client.extract(prompt, schema))
            .await
            .map_err(|_| {
                ErrorInfo::timeout(format!(
                    "{} gave no reply within {}s",
                    client.provider(),
                    limit.as_secs()
                ))
            })??;

        if reply.is_empty() {
            return Err(ErrorInfo::invalid_response("Reply contained no features"));
        }

        Ok(schema.validate(&reply))
    }
}

impl Default for ExtractionEngine {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}
