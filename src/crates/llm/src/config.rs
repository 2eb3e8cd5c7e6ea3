//! Connection settings shared by the remote providers.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a remote LLM provider (OpenAI, Groq, xAI, Gemini).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLlmConfig {
    /// API key for authentication.
    pub api_key: String,

    /// Base URL for the API.
    ///
    /// Examples:
    /// - OpenAI: "https://api.openai.com/v1"
    /// - Groq: "https://api.groq.com/openai/v1"
    /// - xAI: "https://api.x.ai/v1"
    /// - Gemini: "https://generativelanguage.googleapis.com/v1beta"
    pub base_url: String,

    /// Model name/identifier.
    pub model: String,

    /// Request timeout duration.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Maximum tokens to generate per call.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl RemoteLlmConfig {
    /// Create a new remote LLM configuration.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            timeout: default_timeout(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the generation token limit.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Base URL without a trailing slash.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_tokens() -> usize {
    400
}

fn default_temperature() -> f32 {
    0.7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RemoteLlmConfig::new("key", "https://api.openai.com/v1", "gpt-4o-mini");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_tokens, 400);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_builders() {
        let config = RemoteLlmConfig::new("key", "https://api.x.ai/v1", "grok-beta")
            .with_timeout(Duration::from_secs(10))
            .with_max_tokens(300)
            .with_temperature(0.2);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.max_tokens, 300);
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let config = RemoteLlmConfig::new("key", "https://api.groq.com/openai/v1/", "m");
        assert_eq!(
            config.endpoint("chat/completions"),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }
}
