//! Configuration management utilities.
//!
//! - Environment variable lookup with fallbacks
//! - `${VAR}` expansion for values read from config files
//! - TOML/JSON config file loading
//!
//! # Example
//!
//! ```rust,ignore
//! use utils::config::{expand_env_var, first_env, load_config_file};
//!
//! let token = first_env(&["JIRA_API_TOKEN", "ATLASSIAN_TOKEN"]);
//! let key = expand_env_var("${GROQ_API_KEY}");
//! let config: MyConfig = load_config_file("statusgen.toml")?;
//! ```

use crate::error::{Result, UtilsError};
use serde::de::DeserializeOwned;
use std::path::Path;

/// First non-empty value among several environment variables.
pub fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.trim().is_empty())
}

/// Expand a whole-value `${VAR}` reference; anything else is returned as is.
///
/// Unset variables leave the reference untouched.
pub fn expand_env_var(value: &str) -> String {
    if value.starts_with("${") && value.ends_with('}') && value.len() > 3 {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).unwrap_or_else(|_| value.to_string())
    } else {
        value.to_string()
    }
}

/// Load configuration from a TOML file.
pub fn load_toml_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = std::fs::read_to_string(path.as_ref())?;
    toml::from_str(&content).map_err(|e| {
        UtilsError::ConfigError(format!(
            "Failed to parse TOML config from {:?}: {}",
            path.as_ref(),
            e
        ))
    })
}

/// Load configuration from a JSON file.
pub fn load_json_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = std::fs::read_to_string(path.as_ref())?;
    serde_json::from_str(&content).map_err(|e| {
        UtilsError::ConfigError(format!(
            "Failed to parse JSON config from {:?}: {}",
            path.as_ref(),
            e
        ))
    })
}

/// Load configuration from a file (auto-detect format from extension).
pub fn load_config_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| {
            UtilsError::ConfigError(format!("Unable to determine file extension for {:?}", path))
        })?;

    match extension.to_lowercase().as_str() {
        "toml" => load_toml_config(path),
        "json" => load_json_config(path),
        _ => Err(UtilsError::ConfigError(format!(
            "Unsupported config file extension: {}",
            extension
        ))),
    }
}
