//! `statusgen generate`

use super::{jira_client, preset_store, print_warning, OutputFormat};
use crate::config::StatusConfig;
use crate::error::{Result, StatusError};
use crate::judge::Judge;
use crate::period::ReportingPeriod;
use crate::persona::Persona;
use crate::pipeline::ReportService;
use crate::presets::Preset;
use crate::report::{ReportRequest, ReportResult, ValidationOutcome};
use crate::validation::validate_initiative_name;
use colored::Colorize;
use llm::Summarizer;
use std::sync::Arc;
use tabled::Table;
use tracing::info;

/// Flags of the generate command. Unset values come from the preset, then
/// from the `[report]` config section.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub initiative: Option<String>,
    pub projects: Option<String>,
    pub labels: Option<String>,
    pub persona: Option<String>,
    pub period: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub judge: bool,
    pub judge_provider: Option<String>,
    pub judge_model: Option<String>,
    pub preset: Option<String>,
    pub format: OutputFormat,
}

fn fill(slot: &mut Option<String>, value: &str) {
    if slot.as_deref().map_or(true, |s| s.trim().is_empty()) && !value.trim().is_empty() {
        *slot = Some(value.to_string());
    }
}

impl GenerateOptions {
    /// Fill unset flags from a preset, and point the tracker at its URL.
    pub fn apply_preset(&mut self, preset: &Preset, config: &mut StatusConfig) {
        fill(&mut self.initiative, &preset.initiative_name);
        fill(&mut self.projects, &preset.projects);
        fill(&mut self.labels, &preset.labels);
        fill(&mut self.persona, &preset.persona);
        fill(&mut self.period, &preset.period);
        fill(&mut self.provider, &preset.llm_provider);
        if !preset.url.trim().is_empty() {
            config.tracker.url = Some(preset.url.clone());
        }
        if let Some(email) = preset.email.as_deref().filter(|e| !e.trim().is_empty()) {
            config.tracker.email = Some(email.to_string());
        }
    }

    /// Resolve flags and config defaults into a request.
    pub fn to_request(&self, config: &StatusConfig) -> Result<ReportRequest> {
        let initiative = self.initiative.clone().unwrap_or_default();
        validate_initiative_name(&initiative)?;

        let persona = self
            .persona
            .as_deref()
            .map(Persona::from_tag)
            .unwrap_or(config.report.persona);
        let period: ReportingPeriod = self
            .period
            .as_deref()
            .unwrap_or(&config.report.period)
            .parse()?;

        let request = ReportRequest::new(
            initiative.trim(),
            self.projects.clone().unwrap_or_default(),
            period,
        )
        .with_labels(self.labels.clone().unwrap_or_default())
        .with_persona(persona);
        request.validate()?;
        Ok(request)
    }

    fn judge_enabled(&self, config: &StatusConfig) -> bool {
        self.judge || self.judge_provider.is_some() || config.judge.enabled
    }
}

/// Handle the generate command
pub async fn handle_generate(config: &StatusConfig, mut options: GenerateOptions) -> Result<()> {
    let mut config = config.clone();
    if let Some(name) = options.preset.clone() {
        let store = preset_store(&config)?;
        let preset = store
            .load(&name)
            .ok_or_else(|| StatusError::Input(format!("Preset '{}' not found", name)))?;
        options.apply_preset(&preset, &mut config);
        info!(preset = %name, "Applied preset");
    }

    let request = options.to_request(&config)?;

    let client = jira_client(&config)?;
    let user = client.myself().await?;
    if options.format == OutputFormat::Text {
        eprintln!("{} {}", "✓ Connected as".green(), user.bold());
    }

    let summarizer = Summarizer::from_selection(
        &config.llm_selection(options.provider.as_deref(), options.model.as_deref())?,
    );
    let mut service = ReportService::new(Arc::new(client), summarizer)
        .with_prompts(config.prompt_catalog()?)
        .with_paging(config.tracker.page_size, config.tracker.max_results);

    if options.judge_enabled(&config) {
        let selection = config.judge_selection(
            options.judge_provider.as_deref(),
            options.judge_model.as_deref(),
        )?;
        let mut judge = Judge::new(Summarizer::from_selection(&selection));
        for (persona, prompt) in config.judge_prompts()? {
            judge = judge.with_prompt(persona, prompt);
        }
        service = service.with_judge(judge);
    }

    let result = service.generate(&request).await?;

    match options.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print_text(&result),
    }
    Ok(())
}

fn print_text(result: &ReportResult) {
    println!("{}", result.text);

    if !result.current_issues.is_empty() {
        println!("{}", "Current Period Issues".bold());
        println!("{}", Table::new(&result.current_issues));
        println!();
    }
    if !result.next_issues.is_empty() {
        println!("{}", "Next Period Issues".bold());
        println!("{}", Table::new(&result.next_issues));
        println!();
    }

    for warning in &result.warnings {
        print_warning(warning);
    }
    print_verdict(result);
}

fn print_verdict(result: &ReportResult) {
    let evaluation = match &result.validation {
        ValidationOutcome::NotRequested => return,
        ValidationOutcome::Passed(evaluation) => {
            eprintln!(
                "{} (score {}/10)",
                "✓ Report passed validation".green().bold(),
                evaluation.score
            );
            evaluation
        }
        ValidationOutcome::Failed(evaluation) if evaluation.judge_unavailable => {
            eprintln!("{}", "⚠ Judge unavailable, report not validated".yellow().bold());
            evaluation
        }
        ValidationOutcome::Failed(evaluation) => {
            eprintln!(
                "{} {} (score {}/10, recommendation {})",
                "✗ Report failed validation:".red().bold(),
                evaluation.status,
                evaluation.score,
                evaluation.recommendation
            );
            evaluation
        }
    };

    if result.regenerations > 0 {
        eprintln!("  Regenerated {} time(s)", result.regenerations);
    }
    for (category, findings) in &evaluation.flagged {
        eprintln!("  {}:", category.cyan());
        for finding in findings {
            eprintln!("    - {}", finding);
        }
    }
}
