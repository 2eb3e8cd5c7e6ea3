//! CLI command implementations
//!
//! Provides command handlers for the statusgen binary. Report text goes to
//! stdout; progress and warnings go to stderr so the output can be piped.

pub mod generate;
pub mod models;
pub mod preset;
pub mod projects;

use crate::config::StatusConfig;
use crate::error::{Result, StatusError};
use crate::presets::PresetStore;
use crate::tracker::JiraClient;
use crate::validation::{validate_email, validate_tracker_url};
use colored::Colorize;

pub use generate::GenerateOptions;

/// Output format for commands that print data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Open the preset store named by the configuration.
pub fn preset_store(config: &StatusConfig) -> Result<PresetStore> {
    config
        .presets_path()
        .map(PresetStore::new)
        .ok_or_else(|| StatusError::Config("Cannot determine preset file location".to_string()))
}

/// Build a tracker client after validating the URL and email.
pub fn jira_client(config: &StatusConfig) -> Result<JiraClient> {
    let settings = config.jira_settings()?;
    if let Some(warning) = validate_tracker_url(&settings.base_url, config.tracker.deployment)? {
        print_warning(&warning);
    }
    if let crate::tracker::JiraAuth::Basic { email, .. } = &settings.auth {
        validate_email(email)?;
    }
    JiraClient::new(settings)
}

pub(crate) fn print_warning(message: &str) {
    eprintln!("{}", message.yellow());
}
