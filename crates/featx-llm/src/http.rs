//! Shared HTTP plumbing and failure classification for provider clients

use crate::LlmError;
use featx_domain::ErrorInfo;
use reqwest::{Response, StatusCode};

/// Longest slice of an error body kept in messages
const MAX_ERROR_BODY: usize = 300;

pub(crate) fn build_client() -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .build()
        .map_err(|e| LlmError::HttpClient(e.to_string()))
}

/// Classify a transport-level failure
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> ErrorInfo {
    if err.is_timeout() {
        ErrorInfo::timeout(format!("{} request timed out: {}", provider, err))
    } else if err.is_decode() {
        ErrorInfo::invalid_response(format!("{} returned an unreadable body: {}", provider, err))
    } else {
        ErrorInfo::provider(format!("{} request failed: {}", provider, err), true)
    }
}

/// Classify a non-success HTTP response
pub(crate) async fn status_error(provider: &str, response: Response) -> ErrorInfo {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    classify_status(provider, status, &body)
}

pub(crate) fn classify_status(provider: &str, status: StatusCode, body: &str) -> ErrorInfo {
    let detail: String = body.trim().chars().take(MAX_ERROR_BODY).collect();
    let message = format!("{} HTTP {}: {}", provider, status.as_u16(), detail);

    if status == StatusCode::TOO_MANY_REQUESTS || body.contains("rate_limit") {
        ErrorInfo::rate_limited(message)
    } else if status.is_server_error() {
        ErrorInfo::provider(message, true)
    } else {
        ErrorInfo::provider(message, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featx_domain::ErrorKind;

    #[test]
    fn test_classify_rate_limit() {
        let err = classify_status("openai", StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert_eq!(err.kind, ErrorKind::RateLimited);
        assert!(err.retryable);
    }

    #[test]
    fn test_classify_rate_limit_error_type_in_body() {
        let body = r#"{"type":"error","error":{"type":"rate_limit_error"}}"#;
        let err = classify_status("anthropic", StatusCode::BAD_REQUEST, body);
        assert_eq!(err.kind, ErrorKind::RateLimited);
    }

    #[test]
    fn test_classify_server_error_is_retryable() {
        let err = classify_status("groq", StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.kind, ErrorKind::ProviderError);
        assert!(err.retryable);
    }

    #[test]
    fn test_classify_auth_error_is_not_retryable() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN, StatusCode::NOT_FOUND] {
            let err = classify_status("openai", status, "nope");
            assert_eq!(err.kind, ErrorKind::ProviderError);
            assert!(!err.retryable);
        }
    }

    #[test]
    fn test_error_body_is_truncated() {
        let body = "x".repeat(2_000);
        let err = classify_status("openai", StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert!(err.message.len() < 400);
    }
}
