//! Configuration loader with dual-location support
//!
//! Loads configuration from:
//! 1. Default values
//! 2. User-level config: ~/.statusgen/statusgen.toml
//! 3. Project-level config: ./.statusgen/statusgen.toml
//!
//! Later files override earlier ones key by key, so a project file that only
//! sets `[llm] model` keeps the user's provider and key.

use crate::config::schema::StatusConfig;
use crate::error::{Result, StatusError};
use std::path::{Path, PathBuf};
use toml::Value;
use tracing::{debug, info};

const CONFIG_DIR: &str = ".statusgen";
const CONFIG_FILE: &str = "statusgen.toml";

/// Configuration loader that handles both user and project configs
pub struct ConfigLoader {
    user_config_path: Option<PathBuf>,
    project_config_path: PathBuf,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            user_config_path: dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE)),
            project_config_path: PathBuf::from(CONFIG_DIR).join(CONFIG_FILE),
        }
    }

    /// Loader over explicit locations.
    pub fn with_paths(user: Option<PathBuf>, project: PathBuf) -> Self {
        Self {
            user_config_path: user,
            project_config_path: project,
        }
    }

    /// Load, merge, resolve and validate both layers.
    pub fn load(&self) -> Result<StatusConfig> {
        let mut merged = Value::Table(Default::default());

        let layers = self
            .user_config_path
            .iter()
            .map(PathBuf::as_path)
            .chain(std::iter::once(self.project_config_path.as_path()));
        for path in layers {
            if !path.exists() {
                debug!(path = %path.display(), "Config file not found, skipping");
                continue;
            }
            let layer = read_layer(path)?;
            debug!(path = %path.display(), "Loaded config layer");
            merge_values(&mut merged, layer);
        }

        let config = finish(merged)?;
        info!("Configuration loaded");
        Ok(config)
    }

    /// Load a single explicit file (`--config`), TOML or JSON.
    pub fn load_file(path: &Path) -> Result<StatusConfig> {
        if !path.exists() {
            return Err(StatusError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let mut config: StatusConfig = utils::load_config_file(path)?;
        config.resolve_env_vars();
        config.validate()?;
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn user_config_path(&self) -> Option<&Path> {
        self.user_config_path.as_deref()
    }

    pub fn project_config_path(&self) -> &Path {
        &self.project_config_path
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_layer(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| StatusError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| StatusError::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

fn finish(merged: Value) -> Result<StatusConfig> {
    let mut config: StatusConfig = merged
        .try_into()
        .map_err(|e: toml::de::Error| StatusError::Config(format!("Invalid configuration: {}", e)))?;
    config.resolve_env_vars();
    config.validate()?;
    Ok(config)
}

/// Recursively merge `overlay` into `base`; tables merge, everything else replaces.
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base), Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
