//! Saved report criteria
//!
//! Presets live in one JSON object keyed by name. Credentials are never part
//! of a preset. Writes go through a temp file in the same directory and a
//! rename, so concurrent readers see either the old or the new file.

use crate::error::{Result, StatusError};
use crate::validation::validate_preset_name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tabled::Tabled;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Reusable report criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    #[serde(default)]
    pub initiative_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, alias = "spaces")]
    pub projects: String,
    #[serde(default)]
    pub labels: String,
    #[serde(default)]
    pub llm_provider: String,
    #[serde(default)]
    pub persona: String,
    #[serde(default)]
    pub period: String,
}

/// Row for `preset list`.
#[derive(Debug, Clone, Tabled)]
pub struct PresetRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Initiative")]
    pub initiative: String,
    #[tabled(rename = "Projects")]
    pub projects: String,
    #[tabled(rename = "Persona")]
    pub persona: String,
    #[tabled(rename = "Period")]
    pub period: String,
}

type PresetMap = BTreeMap<String, Preset>;

pub struct PresetStore {
    path: PathBuf,
}

impl PresetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files read as empty.
    fn read_all(&self) -> PresetMap {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No preset file");
                return PresetMap::new();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "Ignoring corrupt preset file");
            PresetMap::new()
        })
    }

    /// Strict read for read-modify-write, so a corrupt file is never overwritten.
    fn read_for_update(&self) -> Result<PresetMap> {
        if !self.path.exists() {
            return Ok(PresetMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|e| {
            StatusError::Storage(format!(
                "Preset file {} is corrupt: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn write_all(&self, presets: &PresetMap) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, presets)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| StatusError::Storage(format!("Failed to replace preset file: {}", e)))?;
        Ok(())
    }

    /// Preset names in sorted order.
    pub fn list(&self) -> Vec<String> {
        self.read_all().into_keys().collect()
    }

    pub fn rows(&self) -> Vec<PresetRow> {
        self.read_all()
            .into_iter()
            .map(|(name, preset)| PresetRow {
                name,
                initiative: preset.initiative_name,
                projects: preset.projects,
                persona: preset.persona,
                period: preset.period,
            })
            .collect()
    }

    pub fn load(&self, name: &str) -> Option<Preset> {
        self.read_all().remove(name)
    }

    /// Insert or replace a preset.
    pub fn save(&self, name: &str, preset: &Preset) -> Result<()> {
        validate_preset_name(name)?;
        let mut presets = self.read_for_update()?;
        presets.insert(name.to_string(), preset.clone());
        self.write_all(&presets)?;
        info!(preset = name, path = %self.path.display(), "Saved preset");
        Ok(())
    }

    /// Remove a preset. Returns whether it existed.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let mut presets = self.read_for_update()?;
        if presets.remove(name).is_none() {
            return Ok(false);
        }
        self.write_all(&presets)?;
        info!(preset = name, "Deleted preset");
        Ok(true)
    }
}
