//! The "None" provider.

use crate::error::Result;
use crate::provider::{ProviderKind, TextGenerator};
use async_trait::async_trait;

/// Generator that returns empty text without any network call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClient;

#[async_trait]
impl TextGenerator for NoopClient {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(String::new())
    }

    fn model(&self) -> &str {
        ""
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::None
    }
}
