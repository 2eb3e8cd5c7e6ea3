//! `statusgen models`

use super::OutputFormat;
use crate::config::StatusConfig;
use crate::error::{Result, StatusError};
use colored::Colorize;
use llm::{ModelInfo, OpenAiCompatibleClient, ProviderUtils, RemoteLlmConfig};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "Model")]
    id: String,
    #[tabled(rename = "Owner")]
    owner: String,
}

impl From<ModelInfo> for ModelRow {
    fn from(info: ModelInfo) -> Self {
        Self {
            id: info.id,
            owner: info.owned_by.unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Handle models command
pub async fn handle_models(config: &StatusConfig, provider: &str, format: OutputFormat) -> Result<()> {
    let selection = config.llm_selection(Some(provider), None)?;
    let kind = selection.provider;
    if !kind.is_openai_compatible() {
        return Err(StatusError::Input(format!(
            "Model listing is only available for OpenAI-compatible providers, not {}",
            kind.display_name()
        )));
    }

    let api_key = selection
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| StatusError::Config(format!("{} API key not configured", kind.display_name())))?;
    let base_url = selection
        .api_base
        .clone()
        .or_else(|| kind.default_base_url().map(str::to_string))
        .ok_or_else(|| StatusError::Config(format!("No base URL for {}", kind.display_name())))?;
    // Listing does not depend on the model.
    let model = selection.resolved_model().unwrap_or_default();

    let client = OpenAiCompatibleClient::new(kind, RemoteLlmConfig::new(api_key, base_url, model))?;
    let models = client.fetch_models().await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }
    if models.is_empty() {
        println!("{}", "No models available".yellow());
        return Ok(());
    }
    let rows: Vec<ModelRow> = models.into_iter().map(ModelRow::from).collect();
    println!("{}", Table::new(rows));
    Ok(())
}
