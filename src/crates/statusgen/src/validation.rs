//! Input validation for CLI arguments, presets and configuration.

use crate::error::{Result, StatusError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deployment {
    #[default]
    Cloud,
    OnPremise,
}

fn cloud_url() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^https://[\w-]+\.atlassian\.net/?$").expect("valid regex"))
}

fn on_premise_url() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^https?://[\w.-]+(:\d+)?(/.*)?$").expect("valid regex"))
}

fn email() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("valid regex"))
}

fn preset_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\w\s-]+$").expect("valid regex"))
}

/// Required, 3 to 100 characters.
pub fn validate_initiative_name(name: &str) -> Result<()> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err(StatusError::Input("Initiative name is required".to_string()));
    }
    if !(3..=100).contains(&len) {
        return Err(StatusError::Input(
            "Initiative name must be between 3 and 100 characters".to_string(),
        ));
    }
    Ok(())
}

/// Check a tracker URL. Returns a warning for plain-HTTP on-premise URLs.
pub fn validate_tracker_url(url: &str, deployment: Deployment) -> Result<Option<String>> {
    let (pattern, example) = match deployment {
        Deployment::Cloud => (cloud_url(), "https://yourcompany.atlassian.net"),
        Deployment::OnPremise => (on_premise_url(), "https://jira.company.com:8080"),
    };
    if !pattern.is_match(url) {
        return Err(StatusError::Input(format!(
            "Invalid URL format. Example: {}",
            example
        )));
    }
    if deployment == Deployment::OnPremise && url.starts_with("http://") {
        return Ok(Some(
            "⚠️ Warning: Using HTTP (not secure). Consider HTTPS.".to_string(),
        ));
    }
    Ok(None)
}

pub fn validate_email(value: &str) -> Result<()> {
    if email().is_match(value) {
        Ok(())
    } else {
        Err(StatusError::Input(format!("Invalid email address: {}", value)))
    }
}

/// 1 to 50 characters of letters, digits, underscores, spaces and hyphens.
pub fn validate_preset_name(name: &str) -> Result<()> {
    let len = name.chars().count();
    if len == 0 || len > 50 {
        return Err(StatusError::Input(
            "Preset name must be between 1 and 50 characters".to_string(),
        ));
    }
    if !preset_name().is_match(name) {
        return Err(StatusError::Input(
            "Preset name may only contain letters, numbers, spaces, underscores and hyphens"
                .to_string(),
        ));
    }
    Ok(())
}
