//! Jira REST client
//!
//! Cloud instances authenticate with `email:api_token` (basic), on-premise
//! instances with a personal access token (bearer).

use super::{IssueContext, IssuePage, IssueSource};
use crate::error::{Result, StatusError};
use crate::issue::flatten_description;
use crate::version;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tabled::Tabled;
use tracing::{debug, info, warn};
use utils::{AuthHelper, ClientConfig, HttpClient};

const OWN_ISSUES_JQL: &str = "assignee = currentUser() OR reporter = currentUser()";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JiraAuth {
    Basic { email: String, api_token: String },
    Bearer { token: String },
}

impl JiraAuth {
    fn header_value(&self) -> String {
        match self {
            JiraAuth::Basic { email, api_token } => AuthHelper::basic_auth(email, api_token),
            JiraAuth::Bearer { token } => AuthHelper::bearer_token(token),
        }
    }
}

/// Connection settings for [`JiraClient`].
#[derive(Debug, Clone)]
pub struct JiraSettings {
    pub base_url: String,
    pub auth: JiraAuth,
    /// REST API version, `2` or `3`.
    pub api_version: u8,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl JiraSettings {
    pub fn new(base_url: impl Into<String>, auth: JiraAuth) -> Self {
        Self {
            base_url: base_url.into(),
            auth,
            api_version: 3,
            timeout: Duration::from_secs(30),
            max_retries: 0,
        }
    }

    pub fn with_api_version(mut self, version: u8) -> Self {
        self.api_version = version;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Accessible project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct ProjectSummary {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Name")]
    #[serde(default = "unknown_name")]
    pub name: String,
}

fn unknown_name() -> String {
    "Unknown".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<Value>,
    #[serde(default)]
    total: usize,
    #[serde(default)]
    start_at: usize,
    #[serde(default)]
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct ProjectSearchResponse {
    #[serde(default)]
    values: Vec<ProjectSummary>,
}

pub struct JiraClient {
    base_url: String,
    api_version: u8,
    http: HttpClient,
}

impl JiraClient {
    pub fn new(settings: JiraSettings) -> Result<Self> {
        if settings.base_url.trim().is_empty() {
            return Err(StatusError::Config("Jira URL is not configured".to_string()));
        }
        let config = ClientConfig::new()
            .with_timeout(settings.timeout)
            .with_max_retries(settings.max_retries)
            .with_user_agent(version::user_agent())
            .with_header("Accept", "application/json")
            .with_header("Authorization", settings.auth.header_value());

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_version: settings.api_version,
            http: HttpClient::new(config)?,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/{}/{}", self.base_url, self.api_version, path)
    }

    /// Display name of the authenticated user. Doubles as a credential check.
    pub async fn myself(&self) -> Result<String> {
        let me: Value = self.http.get_json(&self.api_url("myself"), &[]).await?;
        let name = me
            .get("displayName")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string();
        info!(user = %name, "Authenticated with Jira");
        Ok(name)
    }

    /// Projects visible to the user.
    ///
    /// Falls back to the projects of the user's own issues when project
    /// search is unavailable.
    pub async fn discover_projects(&self) -> Result<Vec<ProjectSummary>> {
        let url = format!("{}/rest/api/3/project/search", self.base_url);
        match self.http.get_json::<ProjectSearchResponse>(&url, &[]).await {
            Ok(response) => Ok(response.values),
            Err(e) => {
                warn!(error = %e, "Project search failed, falling back to own issues");
                let page = self.search(OWN_ISSUES_JQL, 0, 100).await?;
                Ok(projects_of(&page.issues))
            }
        }
    }
}

fn projects_of(issues: &[Value]) -> Vec<ProjectSummary> {
    let mut projects: Vec<ProjectSummary> = Vec::new();
    for issue in issues {
        let Some(project) = issue.pointer("/fields/project") else {
            continue;
        };
        let Some(key) = project.get("key").and_then(Value::as_str) else {
            continue;
        };
        let name = project
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(unknown_name);
        match projects.iter_mut().find(|p| p.key == key) {
            Some(existing) => existing.name = name,
            None => projects.push(ProjectSummary {
                key: key.to_string(),
                name,
            }),
        }
    }
    projects
}

#[async_trait]
impl IssueSource for JiraClient {
    async fn search(&self, jql: &str, start_at: usize, limit: usize) -> Result<IssuePage> {
        debug!(jql, start_at, limit, "Searching issues");
        let response: SearchResponse = self
            .http
            .get_json(
                &self.api_url("search"),
                &[
                    ("jql", jql.to_string()),
                    ("startAt", start_at.to_string()),
                    ("maxResults", limit.to_string()),
                ],
            )
            .await
            .map_err(|e| StatusError::UpstreamFetch(e.to_string()))?;

        Ok(IssuePage {
            issues: response.issues,
            total: response.total,
            start_at: response.start_at,
            max_results: response.max_results,
        })
    }

    async fn issue_context(&self, key: &str) -> Result<IssueContext> {
        let issue: Value = self
            .http
            .get_json(
                &self.api_url(&format!("issue/{}", key)),
                &[("fields", "summary,description".to_string())],
            )
            .await
            .map_err(|e| StatusError::UpstreamFetch(e.to_string()))?;

        let summary = issue
            .pointer("/fields/summary")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or("No summary available")
            .to_string();
        let description = issue
            .pointer("/fields/description")
            .map(flatten_description)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "No description available".to_string());

        Ok(IssueContext {
            summary,
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> JiraClient {
        JiraClient::new(JiraSettings::new(
            server.uri(),
            JiraAuth::Bearer {
                token: "pat".into(),
            },
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_search_passes_paging_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .and(query_param("jql", "project = OPS"))
            .and(query_param("startAt", "50"))
            .and(query_param("maxResults", "50"))
            .and(header("Authorization", "Bearer pat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "startAt": 50,
                "maxResults": 50,
                "total": 51,
                "issues": [{"key": "OPS-51"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = client(&server).search("project = OPS", 50, 50).await.unwrap();
        assert_eq!(page.total, 51);
        assert_eq!(page.start_at, 50);
        assert_eq!(page.issues[0]["key"], "OPS-51");
    }

    #[tokio::test]
    async fn test_search_error_is_upstream_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Error in the JQL Query"))
            .mount(&server)
            .await;

        let err = client(&server).search("project = ", 0, 50).await.unwrap_err();
        assert!(matches!(err, StatusError::UpstreamFetch(_)));
        assert!(err.to_string().contains("Error in the JQL Query"));
    }

    #[tokio::test]
    async fn test_issue_context_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/EPIC-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "key": "EPIC-1",
                "fields": {"summary": "Payments revamp", "description": null}
            })))
            .mount(&server)
            .await;

        let context = client(&server).issue_context("EPIC-1").await.unwrap();
        assert_eq!(context.summary, "Payments revamp");
        assert_eq!(context.description, "No description available");
    }

    #[tokio::test]
    async fn test_myself_uses_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/2/myself"))
            .and(header(
                "Authorization",
                AuthHelper::basic_auth("me@example.com", "tok").as_str(),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"displayName": "Ana"})))
            .mount(&server)
            .await;

        let client = JiraClient::new(
            JiraSettings::new(
                format!("{}/", server.uri()),
                JiraAuth::Basic {
                    email: "me@example.com".into(),
                    api_token: "tok".into(),
                },
            )
            .with_api_version(2),
        )
        .unwrap();
        assert_eq!(client.myself().await.unwrap(), "Ana");
    }

    #[tokio::test]
    async fn test_discover_projects_falls_back_to_own_issues() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/project/search"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .and(query_param("jql", OWN_ISSUES_JQL))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 3,
                "issues": [
                    {"key": "A-1", "fields": {"project": {"key": "A", "name": "Alpha"}}},
                    {"key": "B-1", "fields": {"project": {"key": "B"}}},
                    {"key": "A-2", "fields": {"project": {"key": "A", "name": "Alpha"}}}
                ]
            })))
            .mount(&server)
            .await;

        let projects = client(&server).discover_projects().await.unwrap();
        assert_eq!(
            projects,
            vec![
                ProjectSummary {
                    key: "A".into(),
                    name: "Alpha".into()
                },
                ProjectSummary {
                    key: "B".into(),
                    name: "Unknown".into()
                },
            ]
        );
    }

    #[test]
    fn test_empty_url_is_config_error() {
        let result = JiraClient::new(JiraSettings::new(
            " ",
            JiraAuth::Bearer { token: "t".into() },
        ));
        assert!(matches!(result, Err(StatusError::Config(_))));
    }
}
