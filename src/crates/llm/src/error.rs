//! Error types for text-generation providers.

use thiserror::Error;

/// Result type for LLM operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur when talking to an LLM provider.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to serialize/deserialize data.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// API authentication failed.
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// No API key was supplied for a provider that needs one.
    #[error("API key not found: {0}")]
    ApiKeyNotFound(String),

    /// Provider answered with HTTP 429.
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Request timed out.
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Any other non-success answer from the provider.
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Provider selection or client construction is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl LlmError {
    /// The provider refused the call because of rate limiting.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LlmError::RateLimitExceeded(_))
    }

    /// The call did not complete within the configured timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            LlmError::Timeout(_) => true,
            LlmError::HttpError(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Classify a transport error, separating timeouts from other failures.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout(err.to_string())
        } else {
            LlmError::HttpError(err)
        }
    }

    /// Map a non-success HTTP status and body to an error.
    pub fn from_status(provider: &str, status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            429 => LlmError::RateLimitExceeded(body),
            401 | 403 => LlmError::AuthenticationError(body),
            408 | 504 => LlmError::Timeout(format!("{} API error {}: {}", provider, status, body)),
            _ => LlmError::ProviderError(format!("{} API error {}: {}", provider, status, body)),
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_429_is_rate_limit() {
        let err = LlmError::from_status("Groq", StatusCode::TOO_MANY_REQUESTS, "slow down".into());
        assert!(err.is_rate_limited());
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_status_401_is_auth_error() {
        let err = LlmError::from_status("OpenAI", StatusCode::UNAUTHORIZED, "bad key".into());
        assert!(matches!(err, LlmError::AuthenticationError(_)));
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_gateway_timeout_is_timeout() {
        let err = LlmError::from_status("xAI", StatusCode::GATEWAY_TIMEOUT, String::new());
        assert!(err.is_timeout());
    }

    #[test]
    fn test_other_status_is_provider_error() {
        let err = LlmError::from_status("OpenAI", StatusCode::INTERNAL_SERVER_ERROR, "boom".into());
        assert!(matches!(err, LlmError::ProviderError(_)));
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("boom"));
    }
}
