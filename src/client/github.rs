//! GitHub REST API client implementation

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, USER_AGENT};
use reqwest::{Client as HttpClient, Method, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::api::{ActionsApi, EnvironmentsApi, RateLimitApi, RepoApi, SecretsApi};
use super::models::{
    EnvironmentList, GitRef, Organization, PublicKey, Repository, RunStatus, SecretList,
    WorkflowRun, WorkflowRunList,
};
use super::pagination::{Listing, PaginationParams, has_next_page};
use super::rate_limit::RateLimitSnapshot;
use super::{ApiResult, sealing};
use crate::config::Credential;
use crate::error::{ApiError, ConfigError, Result};

/// Public GitHub API base URL
pub const API_BASE_URL: &str = "https://api.github.com";

/// REST API version pinned in every request
const API_VERSION: &str = "2022-11-28";

/// Client-side pacing, well under GitHub's secondary rate limits
const REQUESTS_PER_SECOND: u32 = 10;

/// Runs fetched per status when looking for the migration run
const RUNS_PER_QUERY: usize = 5;

/// GitHub API client authenticated with one token
pub struct GitHubClient {
    http: HttpClient,
    base_url: Url,
    token: Credential,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl GitHubClient {
    /// Create a client for `base_url` (GitHub Enterprise) or the public API.
    pub fn new(token: Credential, base_url: Option<&str>) -> Result<Self> {
        let base = base_url.unwrap_or(API_BASE_URL);
        let base_url = Url::parse(base)
            .map_err(|e| ConfigError::Invalid(format!("invalid API URL '{}': {}", base, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::Invalid(format!("invalid API URL '{}'", base)).into());
        }

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota =
            Quota::per_second(NonZeroU32::new(REQUESTS_PER_SECOND).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            http,
            base_url,
            token,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Build a URL from raw path segments. Each segment is percent-encoded.
    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidResponse(format!("bad base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send an authenticated request and map non-2xx statuses to errors.
    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> ApiResult<Response> {
        self.rate_limiter.until_ready().await;

        let url = self.url(segments)?;
        debug!("{} {}", method, url.path());

        let mut request = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token.expose()))
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header(USER_AGENT, concat!("gh-secrets-migrator/", env!("CARGO_PKG_VERSION")));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let message = error_message(response).await;
        Err(status_error(status, &headers, message, Utc::now()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let response = self.send(Method::GET, segments, query, None).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    /// Fetch every page of a list endpoint.
    async fn list_all<L>(&self, segments: &[&str]) -> ApiResult<Vec<L::Item>>
    where
        L: Listing + DeserializeOwned,
    {
        let mut params = PaginationParams::new();
        let mut items = Vec::new();

        loop {
            let page: L = self.get_json(segments, &params.to_query_params()).await?;
            let total = page.total_count();
            let page_items = page.into_items();
            let page_len = page_items.len();
            items.extend(page_items);

            if !has_next_page(items.len(), total, page_len, params.per_page) {
                break;
            }
            params = params.next();
        }

        Ok(items)
    }
}

/// Extract GitHub's `message` field from an error body, or the raw text.
async fn error_message(response: Response) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    let status = response.status();
    match response.text().await {
        Ok(text) => serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or(text),
        Err(_) => status.to_string(),
    }
}

/// Map a non-success status to an [`ApiError`].
fn status_error(
    status: StatusCode,
    headers: &HeaderMap,
    message: String,
    now: DateTime<Utc>,
) -> ApiError {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
    };

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
            if header("x-ratelimit-remaining") == Some(0) =>
        {
            let wait = header("x-ratelimit-reset")
                .and_then(|reset| DateTime::from_timestamp(reset, 0))
                .and_then(|reset| (reset - now).to_std().ok())
                .unwrap_or(Duration::from_secs(60));
            ApiError::RateLimit(wait)
        }
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = header("retry-after").unwrap_or(60).max(0) as u64;
            ApiError::RateLimit(Duration::from_secs(retry_after))
        }
        StatusCode::FORBIDDEN => ApiError::Forbidden(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::CONFLICT => ApiError::Conflict(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ApiError::BadRequest(message),
        status if status.is_server_error() => ApiError::ServerError(message),
        status => ApiError::InvalidResponse(format!("Unexpected status code {}: {}", status, message)),
    }
}

#[async_trait]
impl RepoApi for GitHubClient {
    async fn get_repository(&self, owner: &str, repo: &str) -> ApiResult<Repository> {
        self.get_json(&["repos", owner, repo], &[]).await
    }

    async fn get_organization(&self, org: &str) -> ApiResult<Organization> {
        self.get_json(&["orgs", org], &[]).await
    }

    async fn get_branch_sha(&self, owner: &str, repo: &str, branch: &str) -> ApiResult<String> {
        let mut segments = vec!["repos", owner, repo, "git", "ref", "heads"];
        segments.extend(branch.split('/'));
        let git_ref: GitRef = self.get_json(&segments, &[]).await?;
        Ok(git_ref.object.sha)
    }

    async fn create_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        sha: &str,
    ) -> ApiResult<()> {
        let body = json!({
            "ref": format!("refs/heads/{}", branch),
            "sha": sha,
        });
        self.send(
            Method::POST,
            &["repos", owner, repo, "git", "refs"],
            &[],
            Some(&body),
        )
        .await?;
        Ok(())
    }

    async fn delete_branch(&self, owner: &str, repo: &str, branch: &str) -> ApiResult<()> {
        let mut segments = vec!["repos", owner, repo, "git", "refs", "heads"];
        segments.extend(branch.split('/'));
        self.send(Method::DELETE, &segments, &[], None).await?;
        Ok(())
    }

    async fn create_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
        message: &str,
        content: &str,
    ) -> ApiResult<()> {
        let mut segments = vec!["repos", owner, repo, "contents"];
        segments.extend(path.split('/'));
        let body = json!({
            "message": message,
            "content": STANDARD.encode(content),
            "branch": branch,
        });
        self.send(Method::PUT, &segments, &[], Some(&body)).await?;
        Ok(())
    }
}

#[async_trait]
impl SecretsApi for GitHubClient {
    async fn list_repo_secrets(&self, owner: &str, repo: &str) -> ApiResult<Vec<String>> {
        let secrets = self
            .list_all::<SecretList>(&["repos", owner, repo, "actions", "secrets"])
            .await?;
        Ok(secrets.into_iter().map(|s| s.name).collect())
    }

    async fn list_org_secrets(&self, org: &str) -> ApiResult<Vec<String>> {
        let secrets = self
            .list_all::<SecretList>(&["orgs", org, "actions", "secrets"])
            .await?;
        Ok(secrets.into_iter().map(|s| s.name).collect())
    }

    async fn put_repo_secret(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        value: &str,
    ) -> ApiResult<()> {
        let key: PublicKey = self
            .get_json(
                &["repos", owner, repo, "actions", "secrets", "public-key"],
                &[],
            )
            .await?;
        let body = json!({
            "encrypted_value": sealing::seal(&key.key, value)?,
            "key_id": key.key_id,
        });
        self.send(
            Method::PUT,
            &["repos", owner, repo, "actions", "secrets", name],
            &[],
            Some(&body),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl EnvironmentsApi for GitHubClient {
    async fn list_environments(&self, owner: &str, repo: &str) -> ApiResult<Vec<String>> {
        let environments = self
            .list_all::<EnvironmentList>(&["repos", owner, repo, "environments"])
            .await?;
        Ok(environments.into_iter().map(|e| e.name).collect())
    }

    async fn create_environment(&self, owner: &str, repo: &str, name: &str) -> ApiResult<()> {
        self.send(
            Method::PUT,
            &["repos", owner, repo, "environments", name],
            &[],
            Some(&json!({})),
        )
        .await?;
        Ok(())
    }

    async fn list_environment_secrets(
        &self,
        owner: &str,
        repo: &str,
        environment: &str,
    ) -> ApiResult<Vec<String>> {
        let secrets = self
            .list_all::<SecretList>(&[
                "repos",
                owner,
                repo,
                "environments",
                environment,
                "secrets",
            ])
            .await?;
        Ok(secrets.into_iter().map(|s| s.name).collect())
    }
}

#[async_trait]
impl ActionsApi for GitHubClient {
    async fn list_workflow_runs(
        &self,
        owner: &str,
        repo: &str,
        workflow_file: &str,
        branch: &str,
        status: RunStatus,
    ) -> ApiResult<Vec<WorkflowRun>> {
        let query = [
            ("branch", branch.to_string()),
            ("status", status.as_str().to_string()),
            ("per_page", RUNS_PER_QUERY.to_string()),
        ];
        let runs: WorkflowRunList = self
            .get_json(
                &[
                    "repos",
                    owner,
                    repo,
                    "actions",
                    "workflows",
                    workflow_file,
                    "runs",
                ],
                &query,
            )
            .await?;
        Ok(runs.workflow_runs)
    }
}

#[async_trait]
impl RateLimitApi for GitHubClient {
    async fn rate_limit(&self) -> ApiResult<RateLimitSnapshot> {
        #[derive(Deserialize)]
        struct Core {
            limit: u32,
            remaining: u32,
            reset: i64,
        }

        #[derive(Deserialize)]
        struct Resources {
            core: Core,
        }

        #[derive(Deserialize)]
        struct RateLimitResponse {
            resources: Resources,
        }

        let response: RateLimitResponse = self.get_json(&["rate_limit"], &[]).await?;
        let core = response.resources.core;
        let reset_at = DateTime::from_timestamp(core.reset, 0).ok_or_else(|| {
            ApiError::InvalidResponse(format!("invalid rate limit reset {}", core.reset))
        })?;

        Ok(RateLimitSnapshot {
            remaining: core.remaining,
            limit: core.limit,
            reset_at,
        })
    }
}
