//! Macros for implementing common provider functionality.

/// Implement `ProviderUtils` for providers that don't support model listing.
#[macro_export]
macro_rules! impl_single_model_catalog {
    ($client_type:ty, $config_field:ident) => {
        #[async_trait::async_trait]
        impl $crate::provider_utils::ProviderUtils for $client_type {
            async fn fetch_models(
                &self,
            ) -> $crate::error::Result<Vec<$crate::provider_utils::ModelInfo>> {
                Ok(vec![$crate::provider_utils::ModelInfo::new(
                    self.$config_field.model.clone(),
                )])
            }

            fn current_model(&self) -> &str {
                &self.$config_field.model
            }
        }
    };
}
