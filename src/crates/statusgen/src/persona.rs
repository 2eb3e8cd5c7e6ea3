//! Persona renderer
//!
//! A persona decides how much of the completed-work hierarchy a reader sees
//! and how the LLM is asked to summarize it. Digests are pure functions of the
//! issue data, so the same inputs always render the same text.

use crate::error::{Result, StatusError};
use crate::hierarchy;
use crate::issue::{truncate_chars, AchievedSubset, IssueSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// Placeholder every summary prompt must contain exactly once.
pub const TICKETS_PLACEHOLDER: &str = "{tickets_text}";

/// Report audience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    #[default]
    TeamLead,
    Manager,
    GroupManager,
    Cto,
}

impl Persona {
    pub const ALL: [Persona; 4] = [
        Persona::TeamLead,
        Persona::Manager,
        Persona::GroupManager,
        Persona::Cto,
    ];

    /// Resolve a tag such as `manager` or `Group Manager`.
    ///
    /// Unknown tags fall back to [`Persona::TeamLead`].
    pub fn from_tag(tag: &str) -> Self {
        Self::parse(tag).unwrap_or_else(|| {
            warn!(persona = tag, "Unknown persona, using team_lead");
            Persona::TeamLead
        })
    }

    /// Strict lookup, `None` for unknown tags.
    pub fn parse(tag: &str) -> Option<Self> {
        let normalized = tag.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "team_lead" => Some(Persona::TeamLead),
            "manager" => Some(Persona::Manager),
            "group_manager" => Some(Persona::GroupManager),
            "cto" => Some(Persona::Cto),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::TeamLead => "team_lead",
            Persona::Manager => "manager",
            Persona::GroupManager => "group_manager",
            Persona::Cto => "cto",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Persona::TeamLead => "Team Lead",
            Persona::Manager => "Manager",
            Persona::GroupManager => "Group Manager",
            Persona::Cto => "CTO",
        }
    }

    /// Report header label, e.g. `GROUP_MANAGER`.
    pub fn header_label(&self) -> String {
        self.as_str().to_uppercase()
    }

    /// Whether the AI summary replaces the digest instead of following it.
    pub fn replaces_digest_with_summary(&self) -> bool {
        !matches!(self, Persona::TeamLead)
    }

    /// Pre-LLM text for this persona.
    pub fn digest(&self, issues: &IssueSet, achieved: &AchievedSubset<'_>, roots: &[String]) -> String {
        let done = achieved.len();
        match self {
            Persona::TeamLead => hierarchy::render(issues, roots),
            Persona::Manager => {
                let summaries: Vec<&str> = achieved.iter().take(5).map(|r| r.summary.as_str()).collect();
                let tail = if done > 5 {
                    format!(", and {} other items", done - 5)
                } else {
                    ".".to_string()
                };
                format!(
                    "Completed {} tickets this period. Key accomplishments include: {}{}",
                    done,
                    summaries.join(", "),
                    tail
                )
            }
            Persona::GroupManager => {
                let deliverables = root_summaries(issues, roots, 3, 40);
                let pct = completion_percent(done, issues.len())
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "0".to_string());
                format!(
                    "Team completed {} of {} tickets ({}% completion rate). Major deliverables: {}.",
                    done,
                    issues.len(),
                    pct,
                    deliverables
                )
            }
            Persona::Cto => {
                let outcomes = root_summaries(issues, roots, 2, 50);
                format!(
                    "Initiative delivered {} items. Primary outcomes: {}. Team velocity: {} items completed in period.",
                    done, outcomes, done
                )
            }
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn root_summaries(issues: &IssueSet, roots: &[String], count: usize, width: usize) -> String {
    roots
        .iter()
        .take(count)
        .filter_map(|key| issues.get(key))
        .map(|record| truncate_chars(&record.summary, width))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `round(done / total * 100)`, half to even. `None` when `total` is zero.
pub fn completion_percent(done: usize, total: usize) -> Option<u32> {
    if total == 0 {
        return None;
    }
    let pct = (done as f64 / total as f64 * 100.0).round_ties_even();
    Some(pct.clamp(0.0, 100.0) as u32)
}

/// Built-in prompt families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptStyle {
    /// One framing sentence followed by the digest.
    #[default]
    Concise,
    /// Multi-section briefing per persona.
    Detailed,
}

/// Summary prompt template with a single `{tickets_text}` slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaPrompt {
    template: String,
}

impl PersonaPrompt {
    /// Validate a user-supplied template.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        let slots = template.matches(TICKETS_PLACEHOLDER).count();
        if slots != 1 {
            return Err(StatusError::Input(format!(
                "Prompt template must contain {} exactly once (found {})",
                TICKETS_PLACEHOLDER, slots
            )));
        }
        Ok(Self { template })
    }

    pub fn builtin(persona: Persona, style: PromptStyle) -> Self {
        let template = match style {
            PromptStyle::Concise => concise_template(persona),
            PromptStyle::Detailed => detailed_template(persona),
        };
        Self {
            template: template.to_string(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn render(&self, tickets_text: &str) -> String {
        self.template.replacen(TICKETS_PLACEHOLDER, tickets_text, 1)
    }
}

fn concise_template(persona: Persona) -> &'static str {
    match persona {
        Persona::TeamLead => {
            "Summarize these completed Jira tickets for a team lead (technical details matter):\n{tickets_text}"
        }
        Persona::Manager => {
            "Write a concise executive paragraph summarizing these achievements for a manager (focus on outcomes, not technical details):\n{tickets_text}"
        }
        Persona::GroupManager => {
            "Write a strategic summary for a group manager highlighting business impact and team performance:\n{tickets_text}"
        }
        Persona::Cto => {
            "Write a high-level executive summary for CTO highlighting strategic value and key deliverables:\n{tickets_text}"
        }
    }
}

fn detailed_template(persona: Persona) -> &'static str {
    match persona {
        Persona::TeamLead => DETAILED_TEAM_LEAD,
        Persona::Manager => DETAILED_MANAGER,
        Persona::GroupManager => DETAILED_GROUP_MANAGER,
        Persona::Cto => DETAILED_CTO,
    }
}

const DETAILED_TEAM_LEAD: &str = "You are summarizing completed Jira tickets for a Technical Team Lead.

CONTEXT:
The team lead needs technical depth to understand implementation details, guide future work, and mentor the team.

REQUIREMENTS:
- Include specific technical achievements (APIs, databases, components, services)
- Mention key technologies and architectural decisions made
- Highlight blockers resolved and dependencies completed
- Reference critical tickets by ID when relevant for tracking

COMPLETED TICKETS:
{tickets_text}

INSTRUCTIONS:
Write a technical summary in 2-3 paragraphs focusing on:
1. What systems/components were built or modified
2. Key technical decisions or approaches used
3. Any technical debt addressed or created

OUTPUT:";

const DETAILED_MANAGER: &str = "You are summarizing achievements for an Engineering Manager.

CONTEXT:
The manager needs business outcomes, team velocity and deliverables without deep technical detail. They report progress to leadership.

REQUIREMENTS:
- Focus on WHAT was delivered, not HOW it was built
- Emphasize business value and customer impact
- Use plain language and avoid technical jargon
- Connect work to business objectives

COMPLETED TICKETS:
{tickets_text}

INSTRUCTIONS:
Write an executive summary in ONE concise paragraph answering:
- What business capabilities were delivered?
- What customer or user problems were solved?

OUTPUT:";

const DETAILED_GROUP_MANAGER: &str = "You are summarizing achievements for a Group Manager overseeing multiple teams.

CONTEXT:
The group manager needs program-level progress, team performance and portfolio health to set priorities.

REQUIREMENTS:
- Focus on strategic impact and portfolio health indicators
- Highlight cross-team dependencies or collaborations
- Identify risks, bottlenecks or resource constraints
- Use the metrics present in the ticket data

COMPLETED TICKETS:
{tickets_text}

INSTRUCTIONS:
Write a strategic summary in 2 paragraphs addressing:
1. Program-level outcomes achieved this period
2. Team velocity and portfolio health (risks, blockers, dependencies)

OUTPUT:";

const DETAILED_CTO: &str = "You are summarizing achievements for a Chief Technology Officer.

CONTEXT:
The CTO needs a high-level view of technology strategy execution and its business impact. This informs board reporting.

REQUIREMENTS:
- Focus on strategic technology initiatives and their business impact
- Highlight architectural improvements or tech debt reduction
- Use business language with strategic technical insight

COMPLETED TICKETS:
{tickets_text}

INSTRUCTIONS:
Write an executive brief in 3-4 sentences covering:
- Strategic technology capabilities delivered
- Notable architectural improvements
- Measurable business impact

OUTPUT:";

/// Prompt lookup with per-persona overrides.
#[derive(Debug, Clone, Default)]
pub struct PromptCatalog {
    style: PromptStyle,
    overrides: HashMap<Persona, PersonaPrompt>,
}

impl PromptCatalog {
    pub fn new(style: PromptStyle) -> Self {
        Self {
            style,
            overrides: HashMap::new(),
        }
    }

    /// Replace the built-in prompt for one persona.
    pub fn with_override(mut self, persona: Persona, prompt: PersonaPrompt) -> Self {
        self.overrides.insert(persona, prompt);
        self
    }

    pub fn style(&self) -> PromptStyle {
        self.style
    }

    pub fn prompt_for(&self, persona: Persona) -> PersonaPrompt {
        self.overrides
            .get(&persona)
            .cloned()
            .unwrap_or_else(|| PersonaPrompt::builtin(persona, self.style))
    }
}
