//! Report assembly
//!
//! Every report has the same four sections: context, delivered work, metrics
//! and forward-looking work. This module holds the request/result values and
//! the pure formatting steps; fetching and the judge loop live in
//! [`crate::pipeline`].

use crate::error::{Result, StatusError};
use crate::issue::{truncate_chars, AchievedSubset, CurrentIssueRow, IssueSet, NextIssueRow};
use crate::judge::JudgeEvaluation;
use crate::period::ReportingPeriod;
use crate::persona::{completion_percent, Persona};
use crate::tracker::IssueContext;
use chrono::{DateTime, Utc};
use llm::SummaryOutcome;
use serde::Serialize;

const CONTEXT_SUMMARY_CHARS: usize = 100;
const CONTEXT_DESCRIPTION_CHARS: usize = 150;
const CONTEXT_OVERVIEW_CHARS: usize = 200;

/// What the caller asks for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRequest {
    pub initiative: String,
    /// Comma-separated project keys or names.
    pub projects: String,
    /// Comma-separated labels.
    pub labels: String,
    pub persona: Persona,
    pub period: ReportingPeriod,
}

impl ReportRequest {
    pub fn new(initiative: impl Into<String>, projects: impl Into<String>, period: ReportingPeriod) -> Self {
        Self {
            initiative: initiative.into(),
            projects: projects.into(),
            labels: String::new(),
            persona: Persona::default(),
            period,
        }
    }

    pub fn with_labels(mut self, labels: impl Into<String>) -> Self {
        self.labels = labels.into();
        self
    }

    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.initiative.trim().is_empty() {
            return Err(StatusError::Input("Initiative name is required".to_string()));
        }
        if self.projects.trim().is_empty() && self.labels.trim().is_empty() {
            return Err(StatusError::Input(
                "At least one project or label is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Judge outcome attached to a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "evaluation", rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// The judge was not enabled.
    NotRequested,
    /// The last evaluation passed.
    Passed(JudgeEvaluation),
    /// Regeneration stopped without a pass; the report is still returned.
    Failed(JudgeEvaluation),
}

impl ValidationOutcome {
    pub fn evaluation(&self) -> Option<&JudgeEvaluation> {
        match self {
            Self::NotRequested => None,
            Self::Passed(evaluation) | Self::Failed(evaluation) => Some(evaluation),
        }
    }

    pub fn passed(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// What the caller gets back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportResult {
    pub text: String,
    pub current_issues: Vec<CurrentIssueRow>,
    pub next_issues: Vec<NextIssueRow>,
    pub validation: ValidationOutcome,
    /// Extra generation passes triggered by the judge.
    pub regenerations: u32,
    pub warnings: Vec<String>,
}

impl ReportResult {
    /// Short-circuit result for an empty fetch.
    pub fn no_issues(initiative: &str) -> Self {
        Self {
            text: format!("❌ No issues found for {}.", initiative),
            current_issues: Vec::new(),
            next_issues: Vec::new(),
            validation: ValidationOutcome::NotRequested,
            regenerations: 0,
            warnings: Vec::new(),
        }
    }

    pub fn evaluation(&self) -> Option<&JudgeEvaluation> {
        self.validation.evaluation()
    }

    pub fn validation_passed(&self) -> bool {
        self.validation.passed()
    }
}

/// Headline counts of the metrics section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub total: usize,
    pub completed: usize,
    pub completion_percent: u32,
    pub overdue: usize,
}

impl Metrics {
    /// `None` for an empty set, which must be reported as "no issues".
    pub fn compute(issues: &IssueSet) -> Option<Self> {
        let completed = issues.achieved().len();
        let completion_percent = completion_percent(completed, issues.len())?;
        Some(Self {
            total: issues.len(),
            completed,
            completion_percent,
            overdue: issues.overdue_count(),
        })
    }

    pub fn section(&self) -> String {
        format!(
            "Total Issues: {} | Completed: {} ({}%)\nOverdue: {}",
            self.total, self.completed, self.completion_percent, self.overdue
        )
    }
}

/// Context overview from the first root's tracker context.
pub fn context_overview(initiative: &str, context: Option<&IssueContext>) -> String {
    match context {
        Some(context) => {
            let joined = format!(
                "{}. {}",
                truncate_chars(&context.summary, CONTEXT_SUMMARY_CHARS),
                truncate_chars(&context.description, CONTEXT_DESCRIPTION_CHARS)
            );
            truncate_chars(&joined, CONTEXT_OVERVIEW_CHARS).trim().to_string()
        }
        None => format!("{} initiative overview not available.", initiative),
    }
}

/// Count of achieved items resolved strictly before `boundary`.
pub fn prior_progress(achieved: &AchievedSubset<'_>, boundary: DateTime<Utc>) -> String {
    let prior = achieved
        .iter()
        .filter_map(|r| r.resolved)
        .filter(|resolved| resolved.with_timezone(&Utc) < boundary)
        .count();
    if prior == 0 {
        "No prior progress.".to_string()
    } else {
        format!("{} items completed prior to this period.", prior)
    }
}

/// Delivered-work body: the digest, the AI summary, or both.
pub fn achievements_section(persona: Persona, digest: &str, summary: &SummaryOutcome) -> String {
    if matches!(summary, SummaryOutcome::Skipped) {
        return digest.to_string();
    }
    let text = summary.display_text();
    if persona.replaces_digest_with_summary() {
        format!("📖 {}", text)
    } else {
        format!("{}\n\n📖 AI SUMMARY:\n{}", digest, text)
    }
}

/// Pieces of one generated report.
#[derive(Debug, Clone)]
pub struct ReportSections<'a> {
    pub initiative: &'a str,
    pub persona: Persona,
    pub period: &'a ReportingPeriod,
    pub overview: &'a str,
    pub prior_progress: &'a str,
    pub achievements: &'a str,
    pub metrics: Metrics,
    pub next_steps: &'a str,
}

impl ReportSections<'_> {
    pub fn render(&self) -> String {
        format!(
            "\n🏛️ **{} - {} REPORT**\n\n\
             **1. CONTEXT**\n{}\n{}\n\n\
             **2. BUSINESS IMPACT - DELIVERED THIS PERIOD**\n(Based on resolution date: {})\n{}\n\n\
             **3. METRICS**\n{}\n\n\
             **4. BUSINESS IMPACT - FORWARD LOOKING**\n(Based on due dates in upcoming period)\n{}\n",
            self.initiative,
            self.persona.header_label(),
            self.overview,
            self.prior_progress,
            self.period,
            self.achievements,
            self.metrics.section(),
            self.next_steps
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issues() -> IssueSet {
        IssueSet::normalize(&[
            json!({"key": "A-1", "fields": {"summary": "Root", "status": {"name": "Done"},
                "resolutiondate": "2025-09-30T10:00:00.000+0000"}}),
            json!({"key": "A-2", "fields": {"summary": "Child", "status": {"name": "Done"},
                "resolutiondate": "2025-10-08T10:00:00Z"}}),
            json!({"key": "A-3", "fields": {"summary": "Open", "status": {"name": "In Progress"},
                "duedate": "2099-01-01"}}),
        ])
    }

    #[test]
    fn test_metrics() {
        let metrics = Metrics::compute(&issues()).unwrap();
        assert_eq!(
            metrics.section(),
            "Total Issues: 3 | Completed: 2 (67%)\nOverdue: 1"
        );
        assert!(Metrics::compute(&IssueSet::default()).is_none());
    }

    #[test]
    fn test_context_overview_truncation() {
        let context = IssueContext {
            summary: "S".repeat(120),
            description: "D".repeat(200),
        };
        let overview = context_overview("Payments", Some(&context));
        assert_eq!(overview.chars().count(), 200);
        assert!(overview.starts_with(&format!("{}. D", "S".repeat(100))));
    }

    #[test]
    fn test_context_overview_trims_and_falls_back() {
        let context = IssueContext {
            summary: "Epic".into(),
            description: "".into(),
        };
        assert_eq!(context_overview("Payments", Some(&context)), "Epic.");
        assert_eq!(
            context_overview("Payments", None),
            "Payments initiative overview not available."
        );
    }

    #[test]
    fn test_prior_progress_boundary() {
        let set = issues();
        let period: ReportingPeriod = "2025-10-01 to 2025-10-07".parse().unwrap();
        let boundary = period.end_boundary(Utc::now());
        assert_eq!(
            prior_progress(&set.achieved(), boundary),
            "1 items completed prior to this period."
        );

        let early: ReportingPeriod = "2025-09-01 to 2025-09-02".parse().unwrap();
        assert_eq!(
            prior_progress(&set.achieved(), early.end_boundary(Utc::now())),
            "No prior progress."
        );
    }

    #[test]
    fn test_achievements_section_variants() {
        let ai = SummaryOutcome::Generated("AI text".into());
        assert_eq!(
            achievements_section(Persona::TeamLead, "A-1: Root\n", &ai),
            "A-1: Root\n\n\n📖 AI SUMMARY:\nAI text"
        );
        assert_eq!(achievements_section(Persona::Cto, "digest", &ai), "📖 AI text");
        assert_eq!(
            achievements_section(Persona::Manager, "digest", &SummaryOutcome::Skipped),
            "digest"
        );
        assert!(achievements_section(Persona::Manager, "digest", &SummaryOutcome::TimedOut)
            .starts_with("📖 ⚠️ Request timeout"));
    }

    #[test]
    fn test_render_layout() {
        let period = ReportingPeriod::LastWeek;
        let sections = ReportSections {
            initiative: "Payments",
            persona: Persona::GroupManager,
            period: &period,
            overview: "Overview.",
            prior_progress: "No prior progress.",
            achievements: "digest",
            metrics: Metrics::compute(&issues()).unwrap(),
            next_steps: "📋 **NEXT STEPS**: No tickets scheduled.",
        };
        let text = sections.render();
        assert!(text.starts_with("\n🏛️ **Payments - GROUP_MANAGER REPORT**\n\n**1. CONTEXT**\nOverview.\nNo prior progress.\n\n"));
        assert!(text.contains("(Based on resolution date: last_week)\ndigest\n\n**3. METRICS**\n"));
        assert!(text.ends_with("(Based on due dates in upcoming period)\n📋 **NEXT STEPS**: No tickets scheduled.\n"));
    }

    #[test]
    fn test_request_validation() {
        let request = ReportRequest::new(" ", "OPS", ReportingPeriod::LastWeek);
        assert!(request.validate().unwrap_err().is_input_error());
        let request = ReportRequest::new("Payments", "", ReportingPeriod::LastWeek);
        assert!(request.validate().is_err());
        let request = request.with_labels("q4");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validation_passed_flags() {
        assert!(ReportResult::no_issues("X").validation_passed());
        let failed = ValidationOutcome::Failed(JudgeEvaluation::parse(""));
        assert!(!failed.passed());
        assert!(failed.evaluation().is_some());
    }
}
