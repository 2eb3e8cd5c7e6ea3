//! JSON-over-HTTP client for REST APIs such as Jira.
//!
//! Every request carries the configured default headers (auth, accept, user
//! agent). Non-success statuses surface as [`UtilsError::StatusError`] with the
//! response body, so callers can show the server's own explanation.
//!
//! Retries are opt-in. With `max_retries > 0`, timeouts, connection failures,
//! `429 Too Many Requests` and 5xx responses are retried with doubling delays;
//! a `Retry-After` header in seconds takes precedence over the computed delay.
//!
//! # Example
//!
//! ```rust,ignore
//! use utils::client::{AuthHelper, ClientConfig, HttpClient};
//!
//! let client = HttpClient::new(
//!     ClientConfig::new()
//!         .with_max_retries(1)
//!         .with_header("Authorization", AuthHelper::basic_auth("me@example.com", "token")),
//! )?;
//! let page: serde_json::Value = client
//!     .get_json("https://example.atlassian.net/rest/api/3/search", &[("jql", "project = OPS".into())])
//!     .await?;
//! ```

use crate::error::{Result, UtilsError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound for a server-requested `Retry-After` wait.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Settings for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    /// Extra attempts after the first one; `0` disables retries.
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each following one.
    pub retry_delay: Duration,
    pub user_agent: Option<String>,
    pub default_headers: Vec<(String, String)>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 0,
            retry_delay: Duration::from_secs(1),
            user_agent: None,
            default_headers: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Header sent with every request.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((key.into(), value.into()));
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client for JSON GET endpoints.
pub struct HttpClient {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpClient {
    /// Build the client. Fails on header names or values reqwest rejects.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (key, value) in &config.default_headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| UtilsError::ClientError(format!("invalid header name {}: {}", key, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| UtilsError::ClientError(format!("invalid value for header {}: {}", key, e)))?;
            headers.insert(name, value);
        }

        let mut builder = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers);
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        Ok(Self {
            client: builder
                .build()
                .map_err(|e| UtilsError::ClientError(e.to_string()))?,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
        })
    }

    /// GET `url` with `query` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.get(url, query).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UtilsError::StatusError {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(UtilsError::from)
    }

    /// GET with retries. The last response is returned whatever its status.
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response> {
        let mut attempt = 0;
        loop {
            let mut request = self.client.get(url);
            if !query.is_empty() {
                request = request.query(query);
            }
            let retries_left = attempt < self.max_retries;

            let wait = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if !retries_left || !is_retryable(status) {
                        return Ok(response);
                    }
                    warn!(%status, attempt = attempt + 1, url, "Retryable status");
                    retry_after(&response).unwrap_or_else(|| self.backoff(attempt))
                }
                Err(e) => {
                    if !retries_left || !(e.is_timeout() || e.is_connect()) {
                        return Err(UtilsError::HttpError(e));
                    }
                    warn!(error = %e, attempt = attempt + 1, url, "Request failed");
                    self.backoff(attempt)
                }
            };

            debug!(wait_ms = wait.as_millis() as u64, "Waiting before retry");
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn retry_after(response: &Response) -> Option<Duration> {
    let secs: u64 = response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()?;
    Some(Duration::from_secs(secs).min(MAX_RETRY_AFTER))
}

/// Authorization header values.
pub struct AuthHelper;

impl AuthHelper {
    /// `Bearer <token>`, used for personal access tokens.
    pub fn bearer_token(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// `Basic base64(user:secret)`, used for email plus API token.
    pub fn basic_auth(username: &str, password: &str) -> String {
        use base64::Engine;
        let credentials = format!("{}:{}", username, password);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    fn retrying(max_retries: u32) -> HttpClient {
        HttpClient::new(
            ClientConfig::new()
                .with_max_retries(max_retries)
                .with_retry_delay(Duration::from_millis(1)),
        )
        .unwrap()
    }

    /// Answers with `first` once, then 200 `{"ok": true}`.
    struct FailOnce {
        first: ResponseTemplate,
        calls: Arc<AtomicUsize>,
    }

    impl Respond for FailOnce {
        fn respond(&self, _request: &Request) -> ResponseTemplate {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.first.clone()
            } else {
                ResponseTemplate::new(200).set_body_json(json!({"ok": true}))
            }
        }
    }

    async fn fail_once(server: &MockServer, first: ResponseTemplate) -> Arc<AtomicUsize> {
        let calls = Arc::new(AtomicUsize::new(0));
        Mock::given(method("GET"))
            .respond_with(FailOnce {
                first,
                calls: calls.clone(),
            })
            .mount(server)
            .await;
        calls
    }

    #[test]
    fn test_defaults_disable_retries() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.retry_delay, Duration::from_secs(1));
        assert!(config.user_agent.is_none());
        assert!(config.default_headers.is_empty());
    }

    #[test]
    fn test_invalid_header_is_client_error() {
        let result = HttpClient::new(ClientConfig::new().with_header("Authorization", "line\nbreak"));
        assert!(matches!(result, Err(UtilsError::ClientError(_))));
    }

    #[test]
    fn test_backoff_doubles() {
        let client = HttpClient::new(ClientConfig::new().with_retry_delay(Duration::from_millis(100)))
            .unwrap();
        assert_eq!(client.backoff(0), Duration::from_millis(100));
        assert_eq!(client.backoff(2), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_get_json_sends_headers_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/search"))
            .and(query_param("jql", "project = OPS"))
            .and(header("Authorization", "Bearer pat"))
            .and(header("User-Agent", "statusgen-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0})))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(
            ClientConfig::new()
                .with_user_agent("statusgen-test")
                .with_header("Authorization", AuthHelper::bearer_token("pat")),
        )
        .unwrap();
        let url = format!("{}/rest/api/3/search", server.uri());
        let body: Value = client
            .get_json(&url, &[("jql", "project = OPS".to_string())])
            .await
            .unwrap();
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_get_json_maps_status_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad jql"))
            .mount(&server)
            .await;

        let client = HttpClient::new(ClientConfig::new()).unwrap();
        let result: Result<Value> = client.get_json(&server.uri(), &[]).await;
        match result {
            Err(err @ UtilsError::StatusError { .. }) => {
                assert_eq!(err.status(), Some(400));
                assert!(err.to_string().contains("bad jql"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_json_rejects_non_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let client = HttpClient::new(ClientConfig::new()).unwrap();
        let result: Result<Value> = client.get_json(&server.uri(), &[]).await;
        assert!(matches!(result, Err(UtilsError::SerializationError(_))));
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let server = MockServer::start().await;
        let calls = fail_once(&server, ResponseTemplate::new(503)).await;

        let result: Result<Value> = retrying(0).get_json(&server.uri(), &[]).await;
        assert_eq!(result.unwrap_err().status(), Some(503));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_server_error() {
        let server = MockServer::start().await;
        let calls = fail_once(&server, ResponseTemplate::new(502)).await;

        let body: Value = retrying(2).get_json(&server.uri(), &[]).await.unwrap();
        assert_eq!(body["ok"], true);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retries_rate_limit_honoring_retry_after() {
        let server = MockServer::start().await;
        let calls = fail_once(
            &server,
            ResponseTemplate::new(429).insert_header("Retry-After", "0"),
        )
        .await;

        let body: Value = retrying(1).get_json(&server.uri(), &[]).await.unwrap();
        assert_eq!(body["ok"], true);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let result: Result<Value> = retrying(3).get_json(&server.uri(), &[]).await;
        assert_eq!(result.unwrap_err().status(), Some(404));
    }

    #[test]
    fn test_bearer_token_formatting() {
        assert_eq!(AuthHelper::bearer_token("abc123"), "Bearer abc123");
    }

    #[test]
    fn test_basic_auth_round_trips() {
        let header = AuthHelper::basic_auth("me@example.com", "api-token");
        let encoded = header.strip_prefix("Basic ").unwrap();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "me@example.com:api-token");
    }
}
