//! Total summarization: every call ends in a displayable outcome.
//!
//! A failed AI enhancement degrades the report, it never aborts it. The
//! [`Summarizer`] therefore never returns an error; rate limits, timeouts and
//! provider failures are distinct [`SummaryOutcome`] variants.

use crate::error::LlmError;
use crate::provider::{LlmSelection, ProviderKind, TextGenerator};
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of one summarization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// Provider produced text.
    Generated(String),
    /// No provider configured; nothing was sent.
    Skipped,
    /// Provider answered 429. Not retried; the caller should pick another model.
    RateLimited { model: String },
    /// Call exceeded its socket timeout.
    TimedOut,
    /// Any other failure, carrying the error text.
    Failed(String),
}

impl SummaryOutcome {
    /// Text to place in the report.
    pub fn display_text(&self) -> String {
        match self {
            Self::Generated(text) => text.clone(),
            Self::Skipped => String::new(),
            Self::RateLimited { model } => format!(
                "⚠️ Rate limit hit for {}. Please select another model and regenerate.",
                model
            ),
            Self::TimedOut => "⚠️ Request timeout. Try a different model.".to_string(),
            Self::Failed(err) => format!("AI summary error: {}", err),
        }
    }

    /// Warning banner for the caller, present only for rate limiting.
    pub fn warning(&self) -> Option<String> {
        match self {
            Self::RateLimited { .. } => Some(
                "Rate limit encountered. Please select a different model and try again."
                    .to_string(),
            ),
            _ => None,
        }
    }

    /// True for rate limits, timeouts and failures.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::TimedOut | Self::Failed(_)
        )
    }

    fn from_error(model: &str, err: LlmError) -> Self {
        if err.is_rate_limited() {
            Self::RateLimited {
                model: model.to_string(),
            }
        } else if err.is_timeout() {
            Self::TimedOut
        } else {
            Self::Failed(err.to_string())
        }
    }
}

enum Backend {
    Ready(Arc<dyn TextGenerator>),
    Disabled,
    Misconfigured(String),
}

/// Wraps a generator so that every call yields a [`SummaryOutcome`].
pub struct Summarizer {
    backend: Backend,
}

impl Summarizer {
    /// Summarizer over an already-built generator.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        let backend = if generator.provider() == ProviderKind::None {
            Backend::Disabled
        } else {
            Backend::Ready(generator)
        };
        Self { backend }
    }

    /// Summarizer that never calls out.
    pub fn disabled() -> Self {
        Self {
            backend: Backend::Disabled,
        }
    }

    /// Build from a provider selection.
    ///
    /// A selection without a key, or with the `None` provider, is disabled.
    /// A selection that cannot be built (e.g. Groq without a model) still
    /// yields a summarizer; its calls report the configuration problem.
    pub fn from_selection(selection: &LlmSelection) -> Self {
        if !selection.is_enabled() {
            return Self::disabled();
        }
        match selection.build() {
            Ok(generator) => Self::new(generator),
            Err(err) => Self {
                backend: Backend::Misconfigured(err.to_string()),
            },
        }
    }

    /// Whether calls will reach a provider (or report a misconfiguration).
    pub fn is_enabled(&self) -> bool {
        !matches!(self.backend, Backend::Disabled)
    }

    /// Run one prompt. Never fails.
    pub async fn summarize(&self, prompt: &str) -> SummaryOutcome {
        let generator = match &self.backend {
            Backend::Disabled => return SummaryOutcome::Skipped,
            Backend::Misconfigured(msg) => return SummaryOutcome::Failed(msg.clone()),
            Backend::Ready(generator) => generator,
        };

        debug!(
            provider = %generator.provider(),
            model = %generator.model(),
            prompt_chars = prompt.chars().count(),
            "Requesting summary"
        );

        match generator.generate(prompt).await {
            Ok(text) => SummaryOutcome::Generated(text),
            Err(err) => {
                warn!(
                    provider = %generator.provider(),
                    model = %generator.model(),
                    error = %err,
                    "Summary generation degraded"
                );
                SummaryOutcome::from_error(generator.model(), err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use async_trait::async_trait;

    struct Failing(fn() -> LlmError);

    #[async_trait]
    impl TextGenerator for Failing {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err((self.0)())
        }

        fn model(&self) -> &str {
            "kimi-k2"
        }

        fn provider(&self) -> ProviderKind {
            ProviderKind::Groq
        }
    }

    struct Echo;

    #[async_trait]
    impl TextGenerator for Echo {
        async fn generate(&self, prompt: &str) -> Result<String> {
            Ok(format!("echo: {}", prompt))
        }

        fn model(&self) -> &str {
            "echo"
        }

        fn provider(&self) -> ProviderKind {
            ProviderKind::OpenAi
        }
    }

    #[tokio::test]
    async fn test_success() {
        let summarizer = Summarizer::new(Arc::new(Echo));
        let outcome = summarizer.summarize("hi").await;
        assert_eq!(outcome, SummaryOutcome::Generated("echo: hi".to_string()));
        assert!(!outcome.is_degraded());
    }

    #[tokio::test]
    async fn test_rate_limit_names_model() {
        let summarizer = Summarizer::new(Arc::new(Failing(|| {
            LlmError::RateLimitExceeded("429".into())
        })));
        let outcome = summarizer.summarize("hi").await;
        assert_eq!(
            outcome.display_text(),
            "⚠️ Rate limit hit for kimi-k2. Please select another model and regenerate."
        );
        assert!(outcome.warning().is_some());
    }

    #[tokio::test]
    async fn test_timeout_is_text() {
        let summarizer = Summarizer::new(Arc::new(Failing(|| LlmError::Timeout("30s".into()))));
        let outcome = summarizer.summarize("hi").await;
        assert_eq!(outcome, SummaryOutcome::TimedOut);
        assert!(outcome.display_text().contains("timeout"));
        assert!(outcome.warning().is_none());
    }

    #[tokio::test]
    async fn test_other_errors_are_wrapped() {
        let summarizer = Summarizer::new(Arc::new(Failing(|| {
            LlmError::ProviderError("model exploded".into())
        })));
        let outcome = summarizer.summarize("hi").await;
        assert_eq!(
            outcome.display_text(),
            "AI summary error: Provider error: model exploded"
        );
    }

    #[tokio::test]
    async fn test_disabled_when_no_key() {
        let selection = LlmSelection::new(ProviderKind::OpenAi);
        let summarizer = Summarizer::from_selection(&selection);
        assert!(!summarizer.is_enabled());
        assert_eq!(summarizer.summarize("hi").await, SummaryOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_misconfigured_groq_reports_missing_model() {
        let selection = LlmSelection::new(ProviderKind::Groq).with_api_key("k");
        let summarizer = Summarizer::from_selection(&selection);
        assert!(summarizer.is_enabled());
        let outcome = summarizer.summarize("hi").await;
        assert!(outcome.display_text().contains("No Groq model selected"));
    }
}
