//! Provider selection and the `TextGenerator` seam.
//!
//! Every backend reduces to one capability: turn a prompt into text. The
//! provider is chosen once from a [`ProviderKind`] tag; the `None` provider
//! never touches the network.

use crate::config::RemoteLlmConfig;
use crate::error::{LlmError, Result};
use crate::noop::NoopClient;
use crate::remote::{GeminiClient, OpenAiCompatibleClient};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Synchronous-per-call text generation capability.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for a single user prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier used for calls.
    fn model(&self) -> &str;

    /// Which provider this generator talks to.
    fn provider(&self) -> ProviderKind;
}

/// Supported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// No AI enhancement.
    #[default]
    None,
    /// Groq's OpenAI-compatible endpoint (free tier, model must be chosen).
    Groq,
    /// OpenAI chat completions.
    OpenAi,
    /// xAI Grok, OpenAI-compatible.
    Xai,
    /// Google Gemini generateContent.
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::None,
        ProviderKind::Groq,
        ProviderKind::OpenAi,
        ProviderKind::Xai,
        ProviderKind::Gemini,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Groq => "groq",
            Self::OpenAi => "openai",
            Self::Xai => "xai",
            Self::Gemini => "gemini",
        }
    }

    /// Human-readable name used in messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Groq => "Groq",
            Self::OpenAi => "OpenAI",
            Self::Xai => "xAI",
            Self::Gemini => "Gemini",
        }
    }

    /// Default API base URL.
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Groq => Some("https://api.groq.com/openai/v1"),
            Self::OpenAi => Some("https://api.openai.com/v1"),
            Self::Xai => Some("https://api.x.ai/v1"),
            Self::Gemini => Some("https://generativelanguage.googleapis.com/v1beta"),
        }
    }

    /// Default model. Groq has none: the caller picks from the live catalogue.
    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("gpt-4o-mini"),
            Self::Xai => Some("grok-beta"),
            Self::Gemini => Some("gemini-pro"),
            Self::None | Self::Groq => None,
        }
    }

    /// Environment variable conventionally holding this provider's key.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Groq => Some("GROQ_API_KEY"),
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Xai => Some("XAI_API_KEY"),
            Self::Gemini => Some("GEMINI_API_KEY"),
        }
    }

    /// Providers that speak the OpenAI chat completions dialect.
    pub fn is_openai_compatible(&self) -> bool {
        matches!(self, Self::Groq | Self::OpenAi | Self::Xai)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "" | "none" => Ok(Self::None),
            "groq" | "groq (free tier)" => Ok(Self::Groq),
            "openai" => Ok(Self::OpenAi),
            "xai" | "grok" => Ok(Self::Xai),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(LlmError::ConfigError(format!("Unknown LLM provider: {}", other))),
        }
    }
}

/// Everything needed to build a generator for one call site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmSelection {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
    pub timeout: Option<Duration>,
}

impl LlmSelection {
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// True when calls would actually reach a provider.
    pub fn is_enabled(&self) -> bool {
        self.provider != ProviderKind::None
            && self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Model that will be used, if one can be determined.
    pub fn resolved_model(&self) -> Option<String> {
        self.model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| self.provider.default_model().map(str::to_string))
    }

    /// Build the remote configuration for this selection.
    pub fn remote_config(&self) -> Result<RemoteLlmConfig> {
        let name = self.provider.display_name();
        let api_key = self
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::ApiKeyNotFound(format!("{} API key not configured", name)))?;
        let model = self
            .resolved_model()
            .ok_or_else(|| LlmError::ConfigError(format!("No {} model selected", name)))?;
        let base_url = self
            .api_base
            .clone()
            .or_else(|| self.provider.default_base_url().map(str::to_string))
            .ok_or_else(|| LlmError::ConfigError(format!("No base URL for {}", name)))?;

        let mut config = RemoteLlmConfig::new(api_key, base_url, model);
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        if let Some(max_tokens) = self.max_tokens {
            config = config.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            config = config.with_temperature(temperature);
        }
        Ok(config)
    }

    /// Build a generator for this selection.
    pub fn build(&self) -> Result<Arc<dyn TextGenerator>> {
        match self.provider {
            ProviderKind::None => Ok(Arc::new(NoopClient)),
            ProviderKind::Groq | ProviderKind::OpenAi | ProviderKind::Xai => {
                let config = self.remote_config()?;
                Ok(Arc::new(OpenAiCompatibleClient::new(self.provider, config)?))
            }
            ProviderKind::Gemini => {
                let config = self.remote_config()?;
                Ok(Arc::new(GeminiClient::new(config)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_tags() {
        assert_eq!("none".parse::<ProviderKind>().unwrap(), ProviderKind::None);
        assert_eq!("Groq (Free Tier)".parse::<ProviderKind>().unwrap(), ProviderKind::Groq);
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!("grok".parse::<ProviderKind>().unwrap(), ProviderKind::Xai);
        assert_eq!("Gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert!("claude".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.to_string().parse::<ProviderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_groq_requires_model() {
        let selection = LlmSelection::new(ProviderKind::Groq).with_api_key("k");
        let err = selection.remote_config().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: No Groq model selected");
    }

    #[test]
    fn test_openai_uses_default_model() {
        let selection = LlmSelection::new(ProviderKind::OpenAi).with_api_key("k");
        let config = selection.remote_config().unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_missing_key_is_reported() {
        let selection = LlmSelection::new(ProviderKind::Xai);
        assert!(matches!(
            selection.remote_config(),
            Err(LlmError::ApiKeyNotFound(_))
        ));
        assert!(!selection.is_enabled());
    }

    #[test]
    fn test_none_provider_is_never_enabled() {
        let selection = LlmSelection::new(ProviderKind::None).with_api_key("k");
        assert!(!selection.is_enabled());
        let generator = selection.build().unwrap();
        assert_eq!(generator.provider(), ProviderKind::None);
    }

    #[test]
    fn test_api_base_override() {
        let selection = LlmSelection::new(ProviderKind::Groq)
            .with_api_key("k")
            .with_model("llama-3.1-8b-instant")
            .with_api_base("http://localhost:9999/v1");
        let config = selection.remote_config().unwrap();
        assert_eq!(config.base_url, "http://localhost:9999/v1");
        assert_eq!(config.model, "llama-3.1-8b-instant");
    }
}
