//! Issue source abstraction and pagination
//!
//! The report pipeline depends only on [`IssueSource`]; [`JiraClient`] is the
//! production implementation and tests use in-memory fakes.

pub mod jira;
pub mod jql;

pub use jira::{JiraAuth, JiraClient, JiraSettings, ProjectSummary};
pub use jql::{DateField, JqlBuilder};

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

/// Default page size for searches.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Default cap on issues collected per query.
pub const DEFAULT_MAX_RESULTS: usize = 1000;

/// One page of raw search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssuePage {
    pub issues: Vec<Value>,
    pub total: usize,
    pub start_at: usize,
    pub max_results: usize,
}

/// Summary and description of the item that gives a report its context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueContext {
    pub summary: String,
    pub description: String,
}

impl IssueContext {
    /// Context used when the lookup itself fails.
    pub fn unavailable() -> Self {
        Self {
            summary: "Unable to fetch epic".to_string(),
            description: String::new(),
        }
    }
}

/// Paged query interface over an issue tracker.
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// One page of issues matching `jql`.
    async fn search(&self, jql: &str, start_at: usize, limit: usize) -> Result<IssuePage>;

    /// Summary and description for one issue.
    ///
    /// Missing fields come back as "No summary available" / "No description available".
    async fn issue_context(&self, key: &str) -> Result<IssueContext>;
}

/// Context lookup that never fails.
pub async fn context_or_unavailable(source: &dyn IssueSource, key: &str) -> IssueContext {
    match source.issue_context(key).await {
        Ok(context) => context,
        Err(e) => {
            warn!(key, error = %e, "Context lookup failed");
            IssueContext::unavailable()
        }
    }
}

/// Collect every page of a query, up to `max_results` issues.
///
/// Stops on an empty page, once `total` is reached, or after a short page.
/// Errors are returned as-is; nothing is retried.
pub async fn fetch_all(
    source: &dyn IssueSource,
    jql: &str,
    page_size: usize,
    max_results: usize,
) -> Result<Vec<Value>> {
    let page_size = page_size.max(1);
    let mut issues: Vec<Value> = Vec::new();
    let mut start_at = 0;

    while issues.len() < max_results {
        let page = source.search(jql, start_at, page_size).await?;
        let batch_len = page.issues.len();
        debug!(start_at, batch_len, total = page.total, "Fetched issue page");

        if batch_len == 0 {
            break;
        }
        issues.extend(page.issues);

        if issues.len() >= page.total || batch_len < page_size {
            break;
        }
        start_at += batch_len;
    }

    issues.truncate(max_results);
    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatusError;
    use serde_json::json;
    use std::sync::Mutex;

    /// Serves `total` synthetic issues, recording each request offset.
    struct Paged {
        total: usize,
        report_total: usize,
        calls: Mutex<Vec<(usize, usize)>>,
    }

    impl Paged {
        fn new(total: usize) -> Self {
            Self {
                total,
                report_total: total,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl IssueSource for Paged {
        async fn search(&self, _jql: &str, start_at: usize, limit: usize) -> Result<IssuePage> {
            self.calls.lock().unwrap().push((start_at, limit));
            let end = (start_at + limit).min(self.total);
            let issues = (start_at..end).map(|i| json!({"key": format!("A-{}", i)})).collect();
            Ok(IssuePage {
                issues,
                total: self.report_total,
                start_at,
                max_results: limit,
            })
        }

        async fn issue_context(&self, _key: &str) -> Result<IssueContext> {
            Err(StatusError::UpstreamFetch("404".into()))
        }
    }

    #[tokio::test]
    async fn test_fetch_all_walks_pages() {
        let source = Paged::new(120);
        let issues = fetch_all(&source, "project = A", 50, 1000).await.unwrap();
        assert_eq!(issues.len(), 120);
        assert_eq!(issues[119]["key"], "A-119");
        assert_eq!(
            *source.calls.lock().unwrap(),
            vec![(0, 50), (50, 50), (100, 50)]
        );
    }

    #[tokio::test]
    async fn test_fetch_all_respects_cap() {
        let source = Paged::new(5000);
        let issues = fetch_all(&source, "project = A", 50, 120).await.unwrap();
        assert_eq!(issues.len(), 120);
    }

    #[tokio::test]
    async fn test_fetch_all_stops_on_total() {
        let mut source = Paged::new(500);
        source.report_total = 100;
        let issues = fetch_all(&source, "project = A", 50, 1000).await.unwrap();
        assert_eq!(issues.len(), 100);
        assert_eq!(source.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_all_empty() {
        let source = Paged::new(0);
        assert!(fetch_all(&source, "x", 50, 1000).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_context_failure_degrades() {
        let source = Paged::new(0);
        assert_eq!(
            context_or_unavailable(&source, "EPIC-1").await,
            IssueContext::unavailable()
        );
    }
}
