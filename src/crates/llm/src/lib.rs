//! Text-generation providers for statusgen.
//!
//! Every provider is reduced to the [`TextGenerator`] capability: one prompt in,
//! one text out. On top of it, [`Summarizer`] turns every call into a
//! displayable [`SummaryOutcome`] so a failing provider degrades a report
//! instead of aborting it.
//!
//! # Providers
//!
//! - **Groq** - OpenAI-compatible endpoint; the model must be chosen explicitly
//! - **OpenAI** - chat completions (`gpt-4o-mini` by default)
//! - **xAI** - Grok via the OpenAI-compatible API
//! - **Gemini** - Google's `generateContent` API
//! - **None** - returns empty text without a network call
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::{LlmSelection, ProviderKind, Summarizer};
//!
//! let selection = LlmSelection::new(ProviderKind::OpenAi)
//!     .with_api_key(std::env::var("OPENAI_API_KEY")?);
//! let summarizer = Summarizer::from_selection(&selection);
//!
//! let outcome = summarizer.summarize("Summarize these completed tickets: ...").await;
//! println!("{}", outcome.display_text());
//! ```

#[macro_use]
mod provider_macros;

pub mod config;
pub mod error;
pub mod noop;
pub mod provider;
pub mod provider_utils;
pub mod remote;
pub mod summarizer;

pub use config::RemoteLlmConfig;
pub use error::{LlmError, Result};
pub use noop::NoopClient;
pub use provider::{LlmSelection, ProviderKind, TextGenerator};
pub use provider_utils::{ModelInfo, ProviderUtils};
pub use remote::{GeminiClient, OpenAiCompatibleClient};
pub use summarizer::{SummaryOutcome, Summarizer};
