//! Shared plumbing for statusgen: a JSON HTTP client and config helpers.
//!
//! - [`client`] talks to the issue tracker: default auth headers, opt-in
//!   retries on rate limits and server errors, status errors with the body.
//! - [`config`] loads TOML/JSON files and resolves values from the environment.
//!
//! ```rust,ignore
//! use utils::{first_env, load_config_file, AuthHelper, ClientConfig, HttpClient};
//!
//! let token = first_env(&["JIRA_API_TOKEN"]).unwrap_or_default();
//! let client = HttpClient::new(
//!     ClientConfig::new().with_header("Authorization", AuthHelper::bearer_token(&token)),
//! )?;
//! let me: serde_json::Value = client.get_json(&format!("{}/rest/api/2/myself", base), &[]).await?;
//! let settings: AppConfig = load_config_file("statusgen.toml")?;
//! ```
//!
//! Both modules are behind default features (`client`, `config`).

pub mod error;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "config")]
pub mod config;

pub use error::{Result, UtilsError};

#[cfg(feature = "client")]
pub use client::{AuthHelper, ClientConfig, HttpClient};

#[cfg(feature = "config")]
pub use config::{expand_env_var, first_env, load_config_file, load_json_config, load_toml_config};
