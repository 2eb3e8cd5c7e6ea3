//! Model discovery for providers.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Information about an available model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier/name.
    pub id: String,

    /// Organisation that owns the model, when the provider reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
}

impl ModelInfo {
    /// Create a new ModelInfo with just an ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owned_by: None,
        }
    }
}

/// Model catalogue operations.
#[async_trait]
pub trait ProviderUtils: Send + Sync {
    /// Fetch the models available to the configured credential, sorted by id.
    ///
    /// Providers without a listing endpoint return just the current model.
    async fn fetch_models(&self) -> Result<Vec<ModelInfo>>;

    /// Get the currently active model.
    fn current_model(&self) -> &str;
}
