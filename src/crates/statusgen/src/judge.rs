//! Judge validation
//!
//! A second LLM call checks that a generated report is grounded in the ticket
//! data. Its answer is loosely structured `LABEL: value` text; the parser here
//! fails closed, so anything it cannot read counts as FAIL.

use crate::error::{Result, StatusError};
use crate::issue::IssueSet;
use crate::persona::Persona;
use llm::{SummaryOutcome, Summarizer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, warn};

/// Placeholders every judge prompt must contain.
pub const JUDGE_PLACEHOLDERS: [&str; 3] = ["{ticket_data}", "{summary}", "{ticket_count}"];

/// Check categories the judge may flag findings under.
pub const FLAG_CATEGORIES: [&str; 4] = [
    "UNSUPPORTED_CLAIMS",
    "MISSING_ITEMS",
    "METRIC_ERRORS",
    "TONE_ISSUES",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Pass,
    Fail,
    InsufficientData,
}

impl ValidationStatus {
    fn parse(value: &str) -> Option<Self> {
        let label = normalize_label(value);
        if label.starts_with("PASS") {
            Some(Self::Pass)
        } else if label.starts_with("INSUFFICIENT_DATA") {
            Some(Self::InsufficientData)
        } else if label.starts_with("FAIL") {
            Some(Self::Fail)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::InsufficientData => "INSUFFICIENT_DATA",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Approve,
    Regenerate,
    ManualReview,
}

impl Recommendation {
    fn parse(value: &str) -> Option<Self> {
        let label = normalize_label(value);
        if label.starts_with("APPROVE") {
            Some(Self::Approve)
        } else if label.starts_with("REGENERATE") {
            Some(Self::Regenerate)
        } else if label.starts_with("MANUAL_REVIEW") {
            Some(Self::ManualReview)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::Regenerate => "REGENERATE",
            Self::ManualReview => "MANUAL_REVIEW",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one grounding check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JudgeEvaluation {
    /// 1-10 as reported by the judge; 0 when unreadable. Display only.
    pub score: u8,
    pub status: ValidationStatus,
    pub recommendation: Recommendation,
    /// Findings per check category.
    pub flagged: BTreeMap<String, Vec<String>>,
    /// Set when the judge call itself degraded and no verdict exists.
    pub judge_unavailable: bool,
    #[serde(skip)]
    pub raw: String,
}

impl JudgeEvaluation {
    /// Fail-closed evaluation for a judge that could not answer.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let mut flagged = BTreeMap::new();
        flagged.insert("JUDGE_ERRORS".to_string(), vec![reason.clone()]);
        Self {
            score: 0,
            status: ValidationStatus::Fail,
            recommendation: Recommendation::ManualReview,
            flagged,
            judge_unavailable: true,
            raw: reason,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == ValidationStatus::Pass
    }

    /// Total number of flagged findings.
    pub fn flag_count(&self) -> usize {
        self.flagged.values().map(Vec::len).sum()
    }

    /// Parse a judge response.
    ///
    /// Missing or unreadable fields default to score 0, FAIL and MANUAL_REVIEW.
    pub fn parse(response: &str) -> Self {
        let mut score = None;
        let mut status = None;
        let mut recommendation = None;
        let mut flagged: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut current_category: Option<String> = None;

        for line in response.lines() {
            let (bulleted, line) = strip_list_marker(line.trim());
            let line = line.trim().trim_matches('*').trim();
            if line.is_empty() {
                continue;
            }

            let labeled = line
                .split_once(':')
                .map(|(label, value)| (normalize_label(label), value.trim().trim_matches('*').trim()))
                .filter(|(label, _)| is_known_label(label));
            let Some((label, value)) = labeled else {
                if bulleted {
                    if let Some(category) = &current_category {
                        push_finding(&mut flagged, category, line);
                    }
                }
                continue;
            };

            let applied = match label.as_str() {
                "TRUSTWORTHINESS_SCORE" | "TRUSTWORTHINESS" | "SCORE" => {
                    let parsed = parse_score(value);
                    score = score.or(parsed);
                    parsed.is_some()
                }
                "VALIDATION_STATUS" | "STATUS" => {
                    let parsed = ValidationStatus::parse(value);
                    status = status.or(parsed);
                    parsed.is_some()
                }
                "RECOMMENDATION" => {
                    let parsed = Recommendation::parse(value);
                    recommendation = recommendation.or(parsed);
                    parsed.is_some()
                }
                category => {
                    flagged.entry(category.to_string()).or_default();
                    for item in value.split(';') {
                        push_finding(&mut flagged, category, item);
                    }
                    current_category = Some(category.to_string());
                    continue;
                }
            };

            // An unreadable verdict label inside a finding list is part of the finding.
            if bulleted && !applied {
                if let Some(category) = &current_category {
                    push_finding(&mut flagged, category, line);
                    continue;
                }
            }
            current_category = None;
        }

        Self {
            score: score.unwrap_or(0),
            status: status.unwrap_or(ValidationStatus::Fail),
            recommendation: recommendation.unwrap_or(Recommendation::ManualReview),
            flagged,
            judge_unavailable: false,
            raw: response.to_string(),
        }
    }
}

fn normalize_label(label: &str) -> String {
    label
        .trim()
        .trim_matches(|c: char| c == '*' || c == '#' || c == '`')
        .trim()
        .to_uppercase()
        .replace([' ', '-'], "_")
}

const VERDICT_LABELS: [&str; 6] = [
    "TRUSTWORTHINESS_SCORE",
    "TRUSTWORTHINESS",
    "SCORE",
    "VALIDATION_STATUS",
    "STATUS",
    "RECOMMENDATION",
];

fn is_known_label(label: &str) -> bool {
    VERDICT_LABELS.contains(&label) || FLAG_CATEGORIES.contains(&label)
}

/// Split off a leading `- `, `• `, `* `, `1.` or `1)` marker.
fn strip_list_marker(line: &str) -> (bool, &str) {
    for bullet in ["- ", "• ", "* "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return (true, rest);
        }
    }
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() < line.len() {
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            if rest.starts_with(char::is_whitespace) {
                return (true, rest);
            }
        }
    }
    (false, line)
}

fn push_finding(flagged: &mut BTreeMap<String, Vec<String>>, category: &str, item: &str) {
    let item = item.trim();
    if item.is_empty() || item.eq_ignore_ascii_case("none") || item.eq_ignore_ascii_case("n/a") {
        return;
    }
    flagged
        .entry(category.to_string())
        .or_default()
        .push(item.to_string());
}

fn parse_score(value: &str) -> Option<u8> {
    let digits: String = value
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits
        .parse::<u8>()
        .ok()
        .filter(|score| (1..=10).contains(score))
}

/// Transition out of a validation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgeDecision {
    Accept,
    Regenerate,
    GiveUp,
}

/// Decide what follows a verdict on the `attempt`-th generation (0-based).
///
/// Only the status matters; score and recommendation are advisory.
pub fn decide(evaluation: &JudgeEvaluation, attempt: u32, max_attempts: u32) -> JudgeDecision {
    if evaluation.passed() {
        JudgeDecision::Accept
    } else if evaluation.judge_unavailable
        || evaluation.status == ValidationStatus::InsufficientData
        || attempt >= max_attempts
    {
        JudgeDecision::GiveUp
    } else {
        JudgeDecision::Regenerate
    }
}

/// Verification prompt with `{ticket_data}`, `{summary}` and `{ticket_count}` slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgePrompt {
    template: String,
}

impl JudgePrompt {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        let missing: Vec<&str> = JUDGE_PLACEHOLDERS
            .iter()
            .copied()
            .filter(|slot| !template.contains(slot))
            .collect();
        if !missing.is_empty() {
            return Err(StatusError::Input(format!(
                "Judge prompt is missing {}",
                missing.join(", ")
            )));
        }
        Ok(Self { template })
    }

    pub fn builtin(persona: Persona) -> Self {
        Self {
            template: JUDGE_TEMPLATE.replacen("{persona_focus}", persona_focus(persona), 1),
        }
    }

    /// Fill the slots in a single pass; substituted text is never rescanned.
    pub fn render(&self, ticket_data: &str, summary: &str, ticket_count: usize) -> String {
        let count = ticket_count.to_string();
        let slots = [
            ("{ticket_data}", ticket_data),
            ("{summary}", summary),
            ("{ticket_count}", count.as_str()),
        ];

        let mut out = String::with_capacity(self.template.len() + ticket_data.len() + summary.len());
        let mut rest = self.template.as_str();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            match slots.iter().find(|(slot, _)| tail.starts_with(slot)) {
                Some((slot, value)) => {
                    out.push_str(value);
                    rest = &tail[slot.len()..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}

fn persona_focus(persona: Persona) -> &'static str {
    match persona {
        Persona::TeamLead => {
            "The report is for a team lead. Ticket IDs and technical claims must match the tickets exactly."
        }
        Persona::Manager => {
            "The report is for a manager. Outcome statements must be traceable to completed tickets."
        }
        Persona::GroupManager => {
            "The report is for a group manager. Counts, percentages and velocity figures must match the ticket data."
        }
        Persona::Cto => {
            "The report is for a CTO. Strategic claims must not overstate what the completed tickets delivered."
        }
    }
}

const JUDGE_TEMPLATE: &str = "You are a strict verification judge. Check whether the status report below is grounded in the ticket data. Do not rewrite the report.

{persona_focus}

TICKET DATA ({ticket_count} tickets):
{ticket_data}

REPORT UNDER REVIEW:
{summary}

CHECKS:
1. Every claim is supported by a ticket above.
2. Completed work in the tickets is not silently omitted.
3. Counts and percentages match the ticket data.
4. Tone fits the audience without inventing impact.

Answer with exactly these lines:
TRUSTWORTHINESS_SCORE: <1-10>
VALIDATION_STATUS: <PASS | FAIL | INSUFFICIENT_DATA>
RECOMMENDATION: <APPROVE | REGENERATE | MANUAL_REVIEW>
UNSUPPORTED_CLAIMS: <items separated by ';' or None>
MISSING_ITEMS: <items separated by ';' or None>
METRIC_ERRORS: <items separated by ';' or None>
TONE_ISSUES: <items separated by ';' or None>

Use INSUFFICIENT_DATA only when the ticket data is too thin to verify anything.";

/// One line per issue, as the judge sees them.
pub fn ticket_data(issues: &IssueSet) -> String {
    issues
        .iter()
        .map(|r| {
            let resolved = r
                .resolved
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string());
            format!(
                "{} [{}] {} (assignee: {}, priority: {}, resolved: {})",
                r.key, r.status, r.summary, r.assignee, r.priority, resolved
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runs grounding checks through its own summarizer.
pub struct Judge {
    summarizer: Summarizer,
    prompts: BTreeMap<&'static str, JudgePrompt>,
}

impl Judge {
    pub fn new(summarizer: Summarizer) -> Self {
        Self {
            summarizer,
            prompts: BTreeMap::new(),
        }
    }

    /// Replace the built-in judge prompt for one persona.
    pub fn with_prompt(mut self, persona: Persona, prompt: JudgePrompt) -> Self {
        self.prompts.insert(persona.as_str(), prompt);
        self
    }

    fn prompt_for(&self, persona: Persona) -> JudgePrompt {
        self.prompts
            .get(persona.as_str())
            .cloned()
            .unwrap_or_else(|| JudgePrompt::builtin(persona))
    }

    /// Evaluate one report. Never fails; a degraded call fails closed.
    pub async fn evaluate(&self, persona: Persona, issues: &IssueSet, report: &str) -> JudgeEvaluation {
        let prompt = self
            .prompt_for(persona)
            .render(&ticket_data(issues), report, issues.len());

        match self.summarizer.summarize(&prompt).await {
            SummaryOutcome::Generated(text) => {
                let evaluation = JudgeEvaluation::parse(&text);
                info!(
                    status = %evaluation.status,
                    score = evaluation.score,
                    recommendation = %evaluation.recommendation,
                    flags = evaluation.flag_count(),
                    "Judge verdict"
                );
                evaluation
            }
            SummaryOutcome::Skipped => {
                warn!("Judge has no provider configured");
                JudgeEvaluation::unavailable("Judge provider is not configured")
            }
            degraded => {
                let reason = degraded.display_text();
                warn!(reason = %reason, "Judge call degraded");
                JudgeEvaluation::unavailable(reason)
            }
        }
    }
}
