//! Preset command handlers

use super::preset_store;
use crate::config::StatusConfig;
use crate::error::{Result, StatusError};
use crate::presets::Preset;
use crate::validation::{validate_email, validate_initiative_name};
use colored::Colorize;
use tabled::Table;

/// Handle preset save command
pub fn handle_save(config: &StatusConfig, name: &str, preset: Preset) -> Result<()> {
    validate_initiative_name(&preset.initiative_name)?;
    if preset.projects.trim().is_empty() && preset.labels.trim().is_empty() {
        return Err(StatusError::Input(
            "At least one project or label is required".to_string(),
        ));
    }
    if let Some(email) = preset.email.as_deref().filter(|e| !e.is_empty()) {
        validate_email(email)?;
    }
    if !preset.period.is_empty() {
        preset.period.parse::<crate::period::ReportingPeriod>()?;
    }

    let store = preset_store(config)?;
    store.save(name, &preset)?;

    println!("{}", format!("✓ Preset '{}' saved", name).green().bold());
    println!("  File: {}", store.path().display());
    Ok(())
}

/// Handle preset list command
pub fn handle_list(config: &StatusConfig) -> Result<()> {
    let rows = preset_store(config)?.rows();
    if rows.is_empty() {
        println!("{}", "No presets saved".yellow());
        return Ok(());
    }

    let count = rows.len();
    println!("{}", Table::new(rows));
    println!("\n{} preset(s)", count);
    Ok(())
}

/// Handle preset show command
pub fn handle_show(config: &StatusConfig, name: &str) -> Result<()> {
    let preset = preset_store(config)?
        .load(name)
        .ok_or_else(|| StatusError::Input(format!("Preset '{}' not found", name)))?;
    println!("{}", serde_json::to_string_pretty(&preset)?);
    Ok(())
}

/// Handle preset delete command
pub fn handle_delete(config: &StatusConfig, name: &str) -> Result<()> {
    if preset_store(config)?.delete(name)? {
        println!("{}", format!("✓ Preset '{}' deleted", name).green().bold());
        Ok(())
    } else {
        Err(StatusError::Input(format!("Preset '{}' not found", name)))
    }
}
