//! Configuration management for statusgen
//!
//! Supports dual-location configuration:
//! - User-level: ~/.statusgen/statusgen.toml
//! - Project-level: ./.statusgen/statusgen.toml
//!
//! Project-level config overrides user-level config.

mod loader;
mod schema;

pub use loader::ConfigLoader;
pub use schema::{
    AuthMode, JudgeConfig, LlmConfig, LoggingConfig, PresetsConfig, ReportConfig, StatusConfig,
    TrackerConfig,
};

use crate::Result;
use std::path::Path;

/// Load configuration, from `path` alone when given, otherwise from both
/// locations with the project config taking precedence.
pub fn load_config(path: Option<&Path>) -> Result<StatusConfig> {
    match path {
        Some(path) => ConfigLoader::load_file(path),
        None => ConfigLoader::new().load(),
    }
}
