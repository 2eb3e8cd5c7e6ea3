//! # statusgen - Persona Status Reports
//!
//! Turns the issues of an initiative into a status report tailored to one
//! audience: a team lead, a manager, a group manager or a CTO. An optional
//! LLM summarizes delivered work, and an optional second model checks the
//! report against the source issues and asks for regeneration when it finds
//! unsupported claims.
//!
//! ## Features
//!
//! - **Issue Normalization** - Raw tracker issues become typed records
//! - **Hierarchy Rendering** - Delivered work shown as a parent/subtask tree
//! - **Persona Digests** - Four audiences, four levels of detail
//! - **Forward Planning** - Work due in the next period
//! - **Grounding Judge** - PASS/FAIL validation with bounded regeneration
//! - **Presets** - Saved report criteria, never credentials
//! - **Dual-Location Config** - User-level and project-level configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use statusgen::{JiraAuth, JiraClient, JiraSettings, ReportRequest, ReportService};
//! use llm::Summarizer;
//! use std::sync::Arc;
//!
//! # async fn example() -> statusgen::Result<()> {
//! let settings = JiraSettings::new(
//!     "https://acme.atlassian.net",
//!     JiraAuth::Basic { email: "ana@acme.io".into(), api_token: "token".into() },
//! );
//! let service = ReportService::new(Arc::new(JiraClient::new(settings)?), Summarizer::disabled());
//!
//! let request = ReportRequest::new("Payments", "OPS", "last_week".parse()?);
//! let result = service.generate(&request).await?;
//! println!("{}", result.text);
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod hierarchy;
pub mod issue;
pub mod judge;
pub mod period;
pub mod persona;
pub mod pipeline;
pub mod planner;
pub mod report;
pub mod tracker;

// Surfaces
pub mod cli;
pub mod config;
pub mod presets;
pub mod validation;
pub mod version;

// Error types and utilities
mod error;

// Re-export key types for convenience
pub use config::{ConfigLoader, StatusConfig};
pub use issue::{IssueRecord, IssueSet};
pub use judge::{Judge, JudgeEvaluation, JudgePrompt, Recommendation, ValidationStatus};
pub use period::ReportingPeriod;
pub use persona::{Persona, PersonaPrompt, PromptCatalog, PromptStyle};
pub use pipeline::{ReportService, MAX_REGENERATION_ATTEMPTS};
pub use presets::{Preset, PresetStore};
pub use report::{ReportRequest, ReportResult, ValidationOutcome};
pub use tracker::{IssueContext, IssuePage, IssueSource, JiraAuth, JiraClient, JiraSettings};

// Error types
pub use error::{Result, StatusError};
