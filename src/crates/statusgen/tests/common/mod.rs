//! Shared fixtures for statusgen integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use llm::{LlmError, ProviderKind, Summarizer, TextGenerator};
use serde_json::{json, Value};
use statusgen::{IssueContext, IssuePage, IssueSource, StatusError};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory issue source. Queries on `resolutiondate` serve delivered work,
/// everything else serves upcoming work.
#[derive(Default)]
pub struct FakeIssueSource {
    pub delivered: Vec<Value>,
    pub upcoming: Vec<Value>,
    pub contexts: HashMap<String, IssueContext>,
    pub fail_search: bool,
    queries: Mutex<Vec<String>>,
}

impl FakeIssueSource {
    pub fn new(delivered: Vec<Value>, upcoming: Vec<Value>) -> Self {
        Self {
            delivered,
            upcoming,
            ..Default::default()
        }
    }

    pub fn with_context(mut self, key: &str, summary: &str, description: &str) -> Self {
        self.contexts.insert(
            key.to_string(),
            IssueContext {
                summary: summary.to_string(),
                description: description.to_string(),
            },
        );
        self
    }

    pub fn failing() -> Self {
        Self {
            fail_search: true,
            ..Default::default()
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueSource for FakeIssueSource {
    async fn search(&self, jql: &str, start_at: usize, limit: usize) -> statusgen::Result<IssuePage> {
        self.queries.lock().unwrap().push(jql.to_string());
        if self.fail_search {
            return Err(StatusError::UpstreamFetch(
                "Error in the JQL Query: the field 'projekt' does not exist".to_string(),
            ));
        }

        let all = if jql.contains("resolutiondate") {
            &self.delivered
        } else {
            &self.upcoming
        };
        let page: Vec<Value> = all.iter().skip(start_at).take(limit).cloned().collect();
        Ok(IssuePage {
            issues: page,
            total: all.len(),
            start_at,
            max_results: limit,
        })
    }

    async fn issue_context(&self, key: &str) -> statusgen::Result<IssueContext> {
        self.contexts
            .get(key)
            .cloned()
            .ok_or_else(|| StatusError::UpstreamFetch(format!("Issue {} does not exist", key)))
    }
}

/// Text generator answering from a fixed script, one entry per call.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<llm::Result<String>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<llm::Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    /// Generator that always answers with the given texts, in order.
    pub fn texts(texts: &[&str]) -> Arc<Self> {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn summarizer(self: &Arc<Self>) -> Summarizer {
        Summarizer::new(self.clone() as Arc<dyn TextGenerator>)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> llm::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::ProviderError("script exhausted".to_string())))
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    fn provider(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }
}

pub const PASS_VERDICT: &str = "TRUSTWORTHINESS_SCORE: 9\nVALIDATION_STATUS: PASS\nRECOMMENDATION: APPROVE";

pub const FAIL_VERDICT: &str = "TRUSTWORTHINESS_SCORE: 3\nVALIDATION_STATUS: FAIL\nUNSUPPORTED_CLAIMS: Claims a launch that is not in the tickets\nRECOMMENDATION: REGENERATE";

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 10, 12, 0, 0).unwrap()
}

pub fn issue(key: &str, summary: &str, status: &str) -> Value {
    json!({
        "key": key,
        "fields": {
            "summary": summary,
            "status": {"name": status},
            "priority": {"name": "Medium"},
            "assignee": {"displayName": "Ana Silva"}
        }
    })
}

/// Three issues: a Done root, its Done subtask, and one in progress.
pub fn scenario_issues() -> Vec<Value> {
    vec![
        json!({
            "key": "OPS-1",
            "fields": {
                "summary": "Launch checkout redesign",
                "status": {"name": "Done"},
                "priority": {"name": "High"},
                "resolutiondate": "2025-10-06T09:00:00.000+0000",
                "subtasks": [{"key": "OPS-2"}]
            }
        }),
        json!({
            "key": "OPS-2",
            "fields": {
                "summary": "Wire payment provider API",
                "status": {"name": "Done"},
                "priority": {"name": "Medium"},
                "resolutiondate": "2025-10-05T15:30:00.000+0000",
                "parent": {"key": "OPS-1"}
            }
        }),
        json!({
            "key": "OPS-3",
            "fields": {
                "summary": "Refund flow",
                "status": {"name": "In Progress"},
                "priority": {"name": "Low"},
                "duedate": "2025-10-20"
            }
        }),
    ]
}

pub fn upcoming_issues() -> Vec<Value> {
    vec![
        issue("OPS-10", "Migrate card vault", "To Do"),
        issue("OPS-11", "Dispute handling", "In Review"),
    ]
}
