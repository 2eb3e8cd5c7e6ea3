//! Remote LLM provider implementations.
//!
//! # Providers
//!
//! - **OpenAI-compatible** - OpenAI, Groq and xAI share one chat completions client
//! - **Gemini** - Google's Gemini models

pub mod gemini;
pub mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiCompatibleClient;
