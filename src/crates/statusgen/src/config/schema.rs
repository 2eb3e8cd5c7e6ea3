//! Configuration schema for statusgen

use crate::error::{Result, StatusError};
use crate::judge::JudgePrompt;
use crate::period::ReportingPeriod;
use crate::persona::{Persona, PersonaPrompt, PromptCatalog, PromptStyle};
use crate::tracker::jira::{JiraAuth, JiraSettings};
use crate::tracker::{DEFAULT_MAX_RESULTS, DEFAULT_PAGE_SIZE};
use crate::validation::Deployment;
use llm::{LlmSelection, ProviderKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use utils::config::{expand_env_var, first_env};

const MAX_PAGE_SIZE: usize = 100;

/// Main statusgen configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StatusConfig {
    #[serde(default)]
    pub tracker: TrackerConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    /// Second-opinion model used to validate generated reports
    #[serde(default)]
    pub judge: JudgeConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub presets: PresetsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// `email:api_token`, used by cloud instances
    #[default]
    Basic,
    /// Personal access token, used by on-premise instances
    Bearer,
}

/// Issue tracker connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub url: Option<String>,
    pub email: Option<String>,
    /// API token or personal access token (supports `${VAR}`)
    pub api_token: Option<String>,
    pub auth: AuthMode,
    pub deployment: Deployment,
    /// REST API version, 2 or 3
    pub api_version: u8,
    pub page_size: usize,
    pub max_results: usize,
    pub timeout_secs: u64,
    /// Extra attempts after a timeout, connection failure, 429 or 5xx (0 disables)
    pub max_retries: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            url: None,
            email: None,
            api_token: None,
            auth: AuthMode::Basic,
            deployment: Deployment::Cloud,
            api_version: 3,
            page_size: DEFAULT_PAGE_SIZE,
            max_results: DEFAULT_MAX_RESULTS,
            timeout_secs: 30,
            max_retries: 0,
        }
    }
}

/// Summary model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// "none", "groq", "openai", "xai" or "gemini"
    pub provider: String,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub max_tokens: usize,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "none".to_string(),
            model: None,
            api_key: None,
            api_base: None,
            max_tokens: 400,
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

/// Judge model. Unset fields fall back to the `[llm]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    pub enabled: bool,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Report defaults and prompt overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub persona: Persona,
    pub period: String,
    pub prompt_style: PromptStyle,
    /// Per-persona summary templates, each with one `{tickets_text}`
    pub prompts: BTreeMap<Persona, String>,
    /// Per-persona judge templates
    pub judge_prompts: BTreeMap<Persona, String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            persona: Persona::TeamLead,
            period: "last_week".to_string(),
            prompt_style: PromptStyle::Concise,
            prompts: BTreeMap::new(),
            judge_prompts: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetsConfig {
    /// Preset file (defaults to ~/.statusgen/presets.json)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level used when RUST_LOG is unset
    pub level: String,
    /// "compact", "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
        }
    }
}

fn expand(value: &mut Option<String>) {
    if let Some(raw) = value.as_deref() {
        *value = Some(expand_env_var(raw));
    }
}

/// Treat empty and unexpanded `${VAR}` values as unset.
fn is_unset(value: &Option<String>) -> bool {
    match value.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(v) => v.starts_with("${") && v.ends_with('}'),
    }
}

fn parse_provider(tag: &str) -> Result<ProviderKind> {
    tag.parse::<ProviderKind>()
        .map_err(|e| StatusError::Config(e.to_string()))
}

fn fill_from_env(value: &mut Option<String>, vars: &[&str]) {
    if is_unset(value) {
        if let Some(found) = first_env(vars) {
            *value = Some(found);
        }
    }
}

impl StatusConfig {
    /// Expand `${VAR}` values and fill unset credentials from the environment.
    pub fn resolve_env_vars(&mut self) {
        expand(&mut self.tracker.url);
        expand(&mut self.tracker.email);
        expand(&mut self.tracker.api_token);
        expand(&mut self.llm.api_key);
        expand(&mut self.llm.api_base);
        expand(&mut self.judge.api_key);
        expand(&mut self.judge.api_base);

        fill_from_env(&mut self.tracker.url, &["JIRA_DEFAULT_URL", "JIRA_URL"]);
        fill_from_env(&mut self.tracker.email, &["JIRA_EMAIL"]);
        fill_from_env(&mut self.tracker.api_token, &["JIRA_API_TOKEN"]);

        if let Ok(kind) = self.llm.provider.parse::<ProviderKind>() {
            if let Some(var) = kind.api_key_env() {
                fill_from_env(&mut self.llm.api_key, &[var]);
            }
        }
        if let Some(Ok(kind)) = self.judge.provider.as_deref().map(str::parse::<ProviderKind>) {
            if let Some(var) = kind.api_key_env() {
                fill_from_env(&mut self.judge.api_key, &[var]);
            }
        }
    }

    /// Check values serde cannot check.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.tracker.page_size) {
            return Err(StatusError::Config(format!(
                "tracker.page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        if self.tracker.max_results == 0 {
            return Err(StatusError::Config(
                "tracker.max_results must be at least 1".to_string(),
            ));
        }
        if !matches!(self.tracker.api_version, 2 | 3) {
            return Err(StatusError::Config(
                "tracker.api_version must be 2 or 3".to_string(),
            ));
        }
        parse_provider(&self.llm.provider)?;
        if let Some(provider) = &self.judge.provider {
            parse_provider(provider)?;
        }
        self.report
            .period
            .parse::<ReportingPeriod>()
            .map_err(|e| StatusError::Config(format!("report.period: {}", e)))?;
        self.prompt_catalog()?;
        self.judge_prompts()?;
        Ok(())
    }

    /// Summary model selection, with an optional provider/model override.
    ///
    /// Overriding with a different provider drops the configured key, model
    /// and base URL; the key then comes from the provider's environment variable.
    pub fn llm_selection(&self, provider: Option<&str>, model: Option<&str>) -> Result<LlmSelection> {
        let llm = &self.llm;
        let kind = parse_provider(provider.unwrap_or(&llm.provider))?;
        let configured = llm.provider.parse::<ProviderKind>().ok() == Some(kind);

        let mut selection = LlmSelection::new(kind);
        if configured {
            selection.api_key = llm.api_key.clone();
            selection.model = model.map(str::to_string).or_else(|| llm.model.clone());
            selection.api_base = llm.api_base.clone();
        } else {
            selection.api_key = kind.api_key_env().and_then(|var| first_env(&[var]));
            selection.model = model.map(str::to_string);
        }
        selection.max_tokens = Some(llm.max_tokens);
        selection.temperature = Some(llm.temperature);
        selection.timeout = Some(Duration::from_secs(llm.timeout_secs));
        Ok(selection)
    }

    /// Judge model selection, falling back to the summary model settings.
    pub fn judge_selection(&self, provider: Option<&str>, model: Option<&str>) -> Result<LlmSelection> {
        let judge = &self.judge;
        let mut selection = self.llm_selection(provider.or(judge.provider.as_deref()), None)?;

        let judge_kind = judge.provider.as_deref().map(parse_provider).transpose()?;
        if judge_kind == Some(selection.provider) {
            if let Some(key) = judge.api_key.clone().filter(|k| !k.trim().is_empty()) {
                selection.api_key = Some(key);
            }
            if let Some(base) = judge.api_base.clone() {
                selection.api_base = Some(base);
            }
        }
        if let Some(model) = model.or(judge.model.as_deref()) {
            selection.model = Some(model.to_string());
        }
        if let Some(secs) = judge.timeout_secs {
            selection.timeout = Some(Duration::from_secs(secs));
        }
        Ok(selection)
    }

    pub fn prompt_catalog(&self) -> Result<PromptCatalog> {
        let mut catalog = PromptCatalog::new(self.report.prompt_style);
        for (persona, template) in &self.report.prompts {
            let prompt = PersonaPrompt::new(template.clone())
                .map_err(|e| StatusError::Config(format!("report.prompts.{}: {}", persona.as_str(), e)))?;
            catalog = catalog.with_override(*persona, prompt);
        }
        Ok(catalog)
    }

    pub fn judge_prompts(&self) -> Result<Vec<(Persona, JudgePrompt)>> {
        self.report
            .judge_prompts
            .iter()
            .map(|(persona, template)| {
                JudgePrompt::new(template.clone())
                    .map(|prompt| (*persona, prompt))
                    .map_err(|e| {
                        StatusError::Config(format!("report.judge_prompts.{}: {}", persona.as_str(), e))
                    })
            })
            .collect()
    }

    pub fn jira_settings(&self) -> Result<JiraSettings> {
        let tracker = &self.tracker;
        let url = tracker
            .url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                StatusError::Config("Tracker URL not set (tracker.url or JIRA_DEFAULT_URL)".to_string())
            })?;
        let token = tracker
            .api_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                StatusError::Config("API token not set (tracker.api_token or JIRA_API_TOKEN)".to_string())
            })?;

        let auth = match tracker.auth {
            AuthMode::Bearer => JiraAuth::Bearer { token },
            AuthMode::Basic => {
                let email = tracker
                    .email
                    .clone()
                    .filter(|e| !e.trim().is_empty())
                    .ok_or_else(|| {
                        StatusError::Config("Email not set (tracker.email or JIRA_EMAIL)".to_string())
                    })?;
                JiraAuth::Basic { email, api_token: token }
            }
        };

        Ok(JiraSettings::new(url, auth)
            .with_api_version(tracker.api_version)
            .with_timeout(Duration::from_secs(tracker.timeout_secs))
            .with_max_retries(tracker.max_retries))
    }

    /// Preset file location, if one can be determined.
    pub fn presets_path(&self) -> Option<PathBuf> {
        self.presets
            .path
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(".statusgen").join("presets.json")))
    }
}
