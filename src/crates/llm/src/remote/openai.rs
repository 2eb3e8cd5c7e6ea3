//! OpenAI-compatible chat completions client.
//!
//! Serves OpenAI itself plus the providers that mirror its API shape
//! (Groq and xAI). Only the base URL, default model and display name differ.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::{LlmSelection, ProviderKind};
//!
//! let generator = LlmSelection::new(ProviderKind::Groq)
//!     .with_api_key(std::env::var("GROQ_API_KEY")?)
//!     .with_model("llama-3.1-8b-instant")
//!     .build()?;
//! let text = generator.generate("Summarize these tickets").await?;
//! ```

use crate::config::RemoteLlmConfig;
use crate::error::{LlmError, Result};
use crate::provider::{ProviderKind, TextGenerator};
use crate::provider_utils::{ModelInfo, ProviderUtils};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    kind: ProviderKind,
    config: RemoteLlmConfig,
    client: Client,
}

impl OpenAiCompatibleClient {
    /// Create a new client for the given provider and configuration.
    pub fn new(kind: ProviderKind, config: RemoteLlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            kind,
            config,
            client,
        })
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
            stream: false,
        }
    }

    fn extract_text(&self, response: ChatCompletionResponse) -> Result<String> {
        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| {
                LlmError::InvalidResponse(format!(
                    "{} returned no choices",
                    self.kind.display_name()
                ))
            })
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = self.config.endpoint("chat/completions");
        let body = self.build_request(prompt);

        debug!(provider = %self.kind, model = %self.config.model, "Sending chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(
                self.kind.display_name(),
                status,
                error_text,
            ));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        self.extract_text(completion)
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn provider(&self) -> ProviderKind {
        self.kind
    }
}

#[async_trait]
impl ProviderUtils for OpenAiCompatibleClient {
    async fn fetch_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self.config.endpoint("models");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(
                self.kind.display_name(),
                status,
                error_text,
            ));
        }

        let listing: ModelListResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let mut models: Vec<ModelInfo> = listing
            .data
            .into_iter()
            .map(|m| ModelInfo {
                id: m.id,
                owned_by: m.owned_by,
            })
            .collect();
        models.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(models)
    }

    fn current_model(&self) -> &str {
        &self.config.model
    }
}

// OpenAI API types
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ModelListResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
    #[serde(default)]
    owned_by: Option<String>,
}
