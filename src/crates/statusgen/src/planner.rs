//! Forward-looking planner
//!
//! Looks one period ahead (same length as the reported one) for work that is
//! due, and previews what is still open.

use crate::error::Result;
use crate::issue::{truncate_chars, IssueRecord, NextIssueRow};
use crate::period::ReportingPeriod;
use crate::tracker::{fetch_all, IssueSource, JqlBuilder};
use chrono::NaiveDate;
use tracing::debug;

/// Upcoming items listed in the report.
pub const PREVIEW_COUNT: usize = 5;

const PREVIEW_SUMMARY_CHARS: usize = 50;

/// Due-dated work in the next period.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardPlan {
    pub period: ReportingPeriod,
    pub issues: Vec<IssueRecord>,
}

impl ForwardPlan {
    /// Items still To Do or In Progress, in fetch order.
    pub fn upcoming(&self) -> impl Iterator<Item = &IssueRecord> {
        self.issues.iter().filter(|r| r.is_upcoming())
    }

    /// Rows of the next-period table (all fetched items).
    pub fn rows(&self) -> Vec<NextIssueRow> {
        self.issues.iter().map(NextIssueRow::from).collect()
    }

    /// Body of the forward-looking report section.
    pub fn section(&self) -> String {
        let upcoming: Vec<&IssueRecord> = self.upcoming().collect();
        if upcoming.is_empty() {
            return "📋 **NEXT STEPS**: No tickets scheduled.".to_string();
        }

        let lines: Vec<String> = upcoming
            .iter()
            .take(PREVIEW_COUNT)
            .map(|r| {
                format!(
                    "• {}: {}... ({})",
                    r.key,
                    truncate_chars(&r.summary, PREVIEW_SUMMARY_CHARS),
                    r.priority
                )
            })
            .collect();
        format!(
            "📋 **NEXT STEPS** ({} tickets):\n{}",
            upcoming.len(),
            lines.join("\n")
        )
    }
}

/// Fetch due-dated work for the period after `current`.
pub async fn plan_next_period(
    source: &dyn IssueSource,
    scope: &JqlBuilder,
    current: &ReportingPeriod,
    today: NaiveDate,
    page_size: usize,
    max_results: usize,
) -> Result<ForwardPlan> {
    let period = current.next(today);
    let jql = scope.for_next_steps(&period, today);
    debug!(next_period = %period, jql = %jql, "Planning next period");

    let raw = fetch_all(source, &jql, page_size, max_results).await?;
    Ok(ForwardPlan {
        period,
        issues: raw.iter().map(IssueRecord::from_raw).collect(),
    })
}
