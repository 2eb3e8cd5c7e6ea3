//! Report generation and the judge regeneration loop
//!
//! ```text
//! GENERATE(0) -> VALIDATE -> ACCEPT
//!                         -> REGENERATE(n + 1) -> VALIDATE ...
//!                         -> GIVE_UP
//! ```
//!
//! Issues, the context lookup and prior progress are computed once per
//! request. Each generation pass re-renders the digest, re-runs the summary,
//! re-plans the next period and re-assembles the report.

use crate::error::Result;
use crate::hierarchy::root_set;
use crate::issue::{IssueSet, NextIssueRow};
use crate::judge::{decide, Judge, JudgeDecision};
use crate::persona::PromptCatalog;
use crate::planner::plan_next_period;
use crate::report::{
    achievements_section, context_overview, prior_progress, Metrics, ReportRequest,
    ReportResult, ReportSections, ValidationOutcome,
};
use crate::tracker::{
    context_or_unavailable, fetch_all, IssueSource, JqlBuilder, DEFAULT_MAX_RESULTS,
    DEFAULT_PAGE_SIZE,
};
use chrono::{DateTime, Utc};
use llm::{SummaryOutcome, Summarizer};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Extra generation passes the judge may trigger.
pub const MAX_REGENERATION_ATTEMPTS: u32 = 2;

/// Warning attached when the judge never passed a report.
pub const VALIDATION_FAILED_WARNING: &str =
    "Report did not pass AI validation. Review it carefully before sharing.";

/// One generation pass.
struct Draft {
    text: String,
    next_issues: Vec<NextIssueRow>,
    warnings: Vec<String>,
}

/// Inputs shared by every pass of one request.
struct Snapshot<'a> {
    request: &'a ReportRequest,
    scope: JqlBuilder,
    issues: IssueSet,
    roots: Vec<String>,
    overview: String,
    prior_progress: String,
    metrics: Metrics,
}

/// Generates reports from an issue source, a summarizer and an optional judge.
pub struct ReportService {
    source: Arc<dyn IssueSource>,
    summarizer: Summarizer,
    judge: Option<Judge>,
    prompts: PromptCatalog,
    page_size: usize,
    max_results: usize,
    clock: Option<DateTime<Utc>>,
}

impl ReportService {
    pub fn new(source: Arc<dyn IssueSource>, summarizer: Summarizer) -> Self {
        Self {
            source,
            summarizer,
            judge: None,
            prompts: PromptCatalog::default(),
            page_size: DEFAULT_PAGE_SIZE,
            max_results: DEFAULT_MAX_RESULTS,
            clock: None,
        }
    }

    pub fn with_judge(mut self, judge: Judge) -> Self {
        self.judge = Some(judge);
        self
    }

    pub fn with_prompts(mut self, prompts: PromptCatalog) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_paging(mut self, page_size: usize, max_results: usize) -> Self {
        self.page_size = page_size;
        self.max_results = max_results;
        self
    }

    /// Pin "now", for reproducible periods.
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.clock = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.unwrap_or_else(Utc::now)
    }

    /// Generate one report, validating and regenerating it when a judge is set.
    ///
    /// Only invalid input and failed issue fetches are errors. LLM problems
    /// show up in the report text and in [`ReportResult::warnings`].
    pub async fn generate(&self, request: &ReportRequest) -> Result<ReportResult> {
        request.validate()?;
        info!(
            initiative = %request.initiative,
            persona = %request.persona,
            period = %request.period,
            "Generating report"
        );

        let Some(snapshot) = self.snapshot(request).await? else {
            info!(initiative = %request.initiative, "No issues found");
            return Ok(ReportResult::no_issues(&request.initiative));
        };

        let mut attempt: u32 = 0;
        loop {
            let draft = self.generate_once(&snapshot).await?;

            let Some(judge) = &self.judge else {
                return Ok(self.finish(&snapshot, draft, ValidationOutcome::NotRequested, attempt));
            };

            let evaluation = judge
                .evaluate(request.persona, &snapshot.issues, &draft.text)
                .await;

            match decide(&evaluation, attempt, MAX_REGENERATION_ATTEMPTS) {
                JudgeDecision::Accept => {
                    info!(attempt, score = evaluation.score, "Report accepted by judge");
                    return Ok(self.finish(&snapshot, draft, ValidationOutcome::Passed(evaluation), attempt));
                }
                JudgeDecision::GiveUp => {
                    warn!(
                        attempt,
                        status = %evaluation.status,
                        judge_unavailable = evaluation.judge_unavailable,
                        "Giving up on validation, returning last report"
                    );
                    let mut draft = draft;
                    draft.warnings.push(VALIDATION_FAILED_WARNING.to_string());
                    return Ok(self.finish(&snapshot, draft, ValidationOutcome::Failed(evaluation), attempt));
                }
                JudgeDecision::Regenerate => {
                    attempt += 1;
                    warn!(
                        attempt,
                        max_attempts = MAX_REGENERATION_ATTEMPTS,
                        flags = evaluation.flag_count(),
                        "Judge rejected report, regenerating"
                    );
                }
            }
        }
    }

    async fn snapshot<'a>(&self, request: &'a ReportRequest) -> Result<Option<Snapshot<'a>>> {
        let today = self.now().date_naive();
        let scope = JqlBuilder::new(&request.projects, &request.labels);
        let jql = scope.for_achievements(&request.period, today);
        debug!(jql = %jql, "Fetching delivered work");

        let raw = fetch_all(self.source.as_ref(), &jql, self.page_size, self.max_results).await?;
        let issues = IssueSet::normalize(&raw);
        let Some(metrics) = Metrics::compute(&issues) else {
            info!(scope = %scope.scope(), period = %request.period, "No issues in scope");
            return Ok(None);
        };

        let (roots, prior) = {
            let achieved = issues.achieved();
            let boundary = request.period.end_boundary(self.now());
            (root_set(&achieved), prior_progress(&achieved, boundary))
        };
        let context = match roots.first() {
            Some(key) => Some(context_or_unavailable(self.source.as_ref(), key).await),
            None => None,
        };
        let overview = context_overview(&request.initiative, context.as_ref());

        Ok(Some(Snapshot {
            request,
            scope,
            issues,
            roots,
            overview,
            prior_progress: prior,
            metrics,
        }))
    }

    async fn generate_once(&self, snapshot: &Snapshot<'_>) -> Result<Draft> {
        let request = snapshot.request;
        let persona = request.persona;
        let achieved = snapshot.issues.achieved();
        let digest = persona.digest(&snapshot.issues, &achieved, &snapshot.roots);

        let summary = if self.summarizer.is_enabled() && !achieved.is_empty() {
            let prompt = self.prompts.prompt_for(persona).render(&digest);
            self.summarizer.summarize(&prompt).await
        } else {
            SummaryOutcome::Skipped
        };
        let mut warnings: Vec<String> = summary.warning().into_iter().collect();
        if summary.is_degraded() && warnings.is_empty() {
            warnings.push(summary.display_text());
        }

        let plan = plan_next_period(
            self.source.as_ref(),
            &snapshot.scope,
            &request.period,
            self.now().date_naive(),
            self.page_size,
            self.max_results,
        )
        .await?;

        let achievements = achievements_section(persona, &digest, &summary);
        let next_steps = plan.section();
        let text = ReportSections {
            initiative: &request.initiative,
            persona,
            period: &request.period,
            overview: &snapshot.overview,
            prior_progress: &snapshot.prior_progress,
            achievements: &achievements,
            metrics: snapshot.metrics,
            next_steps: &next_steps,
        }
        .render();

        Ok(Draft {
            text,
            next_issues: plan.rows(),
            warnings,
        })
    }

    fn finish(
        &self,
        snapshot: &Snapshot<'_>,
        draft: Draft,
        validation: ValidationOutcome,
        regenerations: u32,
    ) -> ReportResult {
        ReportResult {
            text: draft.text,
            current_issues: snapshot.issues.current_rows(),
            next_issues: draft.next_issues,
            validation,
            regenerations,
            warnings: draft.warnings,
        }
    }
}
