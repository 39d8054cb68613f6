//! Repository metadata collaborator
//!
//! Answers two questions about a hosted repository: when a path was last
//! committed to, and what the default branch is.

use async_trait::async_trait;
use repograph_core::config::GithubConfig;
use repograph_core::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Source of repository metadata
#[async_trait]
pub trait RepositoryMetadata: Send + Sync {
    /// Timestamp of the most recent commit touching `path`, if any
    async fn last_commit(&self, repo: &str, path: &str) -> Result<Option<String>>;

    /// Default branch of the repository, if it can be resolved
    async fn default_branch(&self, repo: &str) -> Result<Option<String>>;
}

/// Metadata source that knows nothing; every answer is absent
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineMetadata;

#[async_trait]
impl RepositoryMetadata for OfflineMetadata {
    async fn last_commit(&self, _repo: &str, _path: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn default_branch(&self, _repo: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// REST API client for a GitHub-compatible host.
///
/// Calls are paced by a fixed delay. A rate-limit response is retried with
/// exponential backoff up to `max_retries` attempts, after which the call
/// fails and the caller skips that unit of work.
pub struct GithubMetadataClient {
    http: reqwest::Client,
    api_url: String,
    owner: String,
    request_delay: Duration,
    max_retries: u32,
    initial_backoff: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl GithubMetadataClient {
    pub fn new(config: &GithubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("repograph/", env!("CARGO_PKG_VERSION"))),
        );
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("token {token}"))
                .map_err(|e| Error::config(format!("Invalid GitHub token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        } else {
            info!("No GitHub token configured; unauthenticated rate limits apply");
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::metadata(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            request_delay: Duration::from_millis(config.request_delay_ms),
            max_retries: config.max_retries.max(1),
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            last_call: Mutex::new(None),
        })
    }

    /// Wait until the configured delay has passed since the previous call
    async fn pace(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(previous) = *last {
            let ready = previous + self.request_delay;
            if ready > Instant::now() {
                tokio::time::sleep_until(ready).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// GET a JSON document, retrying on rate limits. `Ok(None)` for any
    /// non-success status other than a rate limit.
    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Option<Value>> {
        let mut backoff = self.initial_backoff;

        for attempt in 1..=self.max_retries {
            self.pace().await;

            let response = self
                .http
                .get(url)
                .query(query)
                .send()
                .await
                .map_err(|e| Error::metadata(format!("Request to {url} failed: {e}")))?;

            let status = response.status();
            let remaining = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            if is_rate_limited(status, remaining.as_deref()) {
                if attempt < self.max_retries {
                    warn!(
                        "Rate limited by {url} (attempt {attempt}/{}); retrying in {backoff:?}",
                        self.max_retries
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    continue;
                }
                break;
            }

            if !status.is_success() {
                debug!("{url} answered {status}");
                return Ok(None);
            }

            let body = response
                .json::<Value>()
                .await
                .map_err(|e| Error::metadata(format!("Invalid JSON from {url}: {e}")))?;
            return Ok(Some(body));
        }

        Err(Error::metadata(format!(
            "Rate limit persisted after {} attempts for {url}",
            self.max_retries
        )))
    }
}

#[async_trait]
impl RepositoryMetadata for GithubMetadataClient {
    async fn last_commit(&self, repo: &str, path: &str) -> Result<Option<String>> {
        let url = format!("{}/repos/{}/{repo}/commits", self.api_url, self.owner);
        let body = self
            .get_json(&url, &[("path", path), ("per_page", "1")])
            .await?;
        Ok(body.as_ref().and_then(commit_date))
    }

    async fn default_branch(&self, repo: &str) -> Result<Option<String>> {
        let url = format!("{}/repos/{}/{repo}", self.api_url, self.owner);
        let body = self.get_json(&url, &[]).await?;
        Ok(body.as_ref().and_then(default_branch_name))
    }
}

/// Whether a response signals a rate limit: 429, or 403 with no requests left
pub fn is_rate_limited(status: StatusCode, remaining: Option<&str>) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && remaining.is_some_and(|r| r.trim() == "0"))
}

/// Committer date of the first commit in a commit-list response
pub fn commit_date(body: &Value) -> Option<String> {
    body.get(0)?
        .pointer("/commit/committer/date")?
        .as_str()
        .map(str::to_string)
}

/// `default_branch` of a repository response, ignoring empty values
pub fn default_branch_name(body: &Value) -> Option<String> {
    body.get("default_branch")?
        .as_str()
        .filter(|b| !b.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamps::annotate_file_timestamps;
    use pretty_assertions::assert_eq;
    use repograph_core::node::Node;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_rate_limit_detection() {
        assert!(is_rate_limited(StatusCode::TOO_MANY_REQUESTS, None));
        assert!(is_rate_limited(StatusCode::FORBIDDEN, Some("0")));
        assert!(!is_rate_limited(StatusCode::FORBIDDEN, Some("12")));
        assert!(!is_rate_limited(StatusCode::FORBIDDEN, None));
        assert!(!is_rate_limited(StatusCode::OK, Some("0")));
    }

    #[test]
    fn test_commit_date_extraction() {
        let body = json!([
            {"sha": "abc", "commit": {"committer": {"date": "2024-05-01T10:00:00Z"}}},
            {"sha": "def", "commit": {"committer": {"date": "2023-01-01T00:00:00Z"}}}
        ]);
        assert_eq!(
            commit_date(&body),
            Some("2024-05-01T10:00:00Z".to_string())
        );
        assert_eq!(commit_date(&json!([])), None);
        assert_eq!(commit_date(&json!({"message": "Not Found"})), None);
    }

    #[test]
    fn test_default_branch_extraction() {
        assert_eq!(
            default_branch_name(&json!({"default_branch": "master"})),
            Some("master".to_string())
        );
        assert_eq!(default_branch_name(&json!({"default_branch": ""})), None);
        assert_eq!(default_branch_name(&json!({})), None);
    }

    #[tokio::test]
    async fn test_offline_metadata_is_always_absent() {
        let offline = OfflineMetadata;
        assert_eq!(offline.last_commit("r", "a.py").await.unwrap(), None);
        assert_eq!(offline.default_branch("r").await.unwrap(), None);
    }

    /// Serves one scripted response per connection, in order; the last
    /// response repeats once the script runs out
    async fn scripted_server(script: Vec<&'static str>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let response = script[n.min(script.len() - 1)];
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(read) => request.extend_from_slice(&buf[..read]),
                    }
                }
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        (format!("http://{addr}"), hits)
    }

    const TOO_MANY: &str =
        "HTTP/1.1 429 Too Many Requests\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";
    const EXHAUSTED: &str = "HTTP/1.1 403 Forbidden\r\nx-ratelimit-remaining: 0\r\ncontent-length: 0\r\nconnection: close\r\n\r\n";
    const BRANCH: &str = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 27\r\nconnection: close\r\n\r\n{\"default_branch\": \"trunk\"}";

    fn stub_config(api_url: String, max_retries: u32, request_delay_ms: u64) -> GithubConfig {
        GithubConfig {
            owner: "jane".to_string(),
            api_url,
            request_delay_ms,
            max_retries,
            initial_backoff_ms: 1,
            ..GithubConfig::default()
        }
    }

    #[tokio::test]
    async fn test_rate_limited_calls_are_retried_with_pacing() {
        let (url, hits) = scripted_server(vec![TOO_MANY, TOO_MANY, BRANCH]).await;
        let client = GithubMetadataClient::new(&stub_config(url, 3, 20)).unwrap();

        let started = std::time::Instant::now();
        let branch = client.default_branch("demo").await.unwrap();

        assert_eq!(branch, Some("trunk".to_string()));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        // three calls, each at least the pacing delay after the previous one
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_persistent_rate_limit_gives_up_and_is_counted() {
        let (url, hits) = scripted_server(vec![EXHAUSTED]).await;
        let client = GithubMetadataClient::new(&stub_config(url, 2, 0)).unwrap();

        assert!(client.default_branch("demo").await.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        let mut nodes = vec![Node::file("a.py"), Node::file("b.py")];
        nodes[0].path = "a.py".to_string();
        nodes[1].path = "b.py".to_string();
        let failures = annotate_file_timestamps(&mut nodes, "jane", "demo", &client).await;
        assert_eq!(failures, 2);
        assert!(nodes.iter().all(|n| n.last_modified.is_none()));
        assert_eq!(hits.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_client_builds_with_token() {
        let config = GithubConfig {
            token: Some("ghp_example".to_string()),
            ..GithubConfig::default()
        };
        assert!(GithubMetadataClient::new(&config).is_ok());
    }
}
