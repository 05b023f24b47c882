//! Mock GitHub API client for testing
//!
//! An in-memory stand-in for one authenticated GitHub token. Repositories,
//! branches, secrets and environments live in a shared table so tests can
//! observe the side effects of a migration run.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use super::ApiResult;
use super::api::{ActionsApi, EnvironmentsApi, RateLimitApi, RepoApi, SecretsApi};
use super::models::{Organization, Repository, RunStatus, WorkflowRun};
use super::rate_limit::RateLimitSnapshot;
use crate::error::ApiError;

/// Mock API client for testing.
///
/// # Example
/// ```ignore
/// let mock = MockGitHubClient::new()
///     .with_repository("acme", "app", "main")
///     .with_repo_secrets("acme", "app", &["API_KEY"]);
///
/// let names = mock.list_repo_secrets("acme", "app").await?;
/// assert_eq!(names, vec!["API_KEY"]);
/// ```
#[derive(Clone, Default)]
pub struct MockGitHubClient {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    repositories: HashMap<String, Repository>,
    organizations: Vec<String>,
    /// repo slug -> branch -> sha
    branches: HashMap<String, BTreeMap<String, String>>,
    repo_secrets: HashMap<String, Vec<String>>,
    org_secrets: HashMap<String, Vec<String>>,
    /// repo slug -> (environment, secrets)
    environments: HashMap<String, Vec<(String, Vec<String>)>>,
    /// Runs that show up once the workflow has been polled this many times
    runs: Vec<(RunStatus, WorkflowRun)>,
    runs_visible_after: usize,
    run_polls: usize,
    rate_limits: VecDeque<RateLimitSnapshot>,
    /// Operation name -> error returned on every call
    failures: HashMap<&'static str, ApiError>,
    calls: Vec<CapturedCall>,
    written_secrets: Vec<WrittenSecret>,
    created_files: Vec<CreatedFile>,
    created_environments: Vec<(String, String)>,
}

/// One recorded API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCall {
    pub operation: &'static str,
    /// Repository slug, organization or workflow the call was about
    pub target: String,
}

/// A secret written through `put_repo_secret`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenSecret {
    pub repo: String,
    pub name: String,
    pub value: String,
}

/// A file committed through `create_file`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedFile {
    pub repo: String,
    pub branch: String,
    pub path: String,
    pub message: String,
    pub content: String,
}

fn slug(owner: &str, repo: &str) -> String {
    format!("{}/{}", owner, repo)
}

impl MockGitHubClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    /// Register a repository with `default_branch` at a fixed commit.
    pub fn with_repository(self, owner: &str, repo: &str, default_branch: &str) -> Self {
        self.with_state(|state| {
            let key = slug(owner, repo);
            state.repositories.insert(
                key.clone(),
                Repository {
                    full_name: key.clone(),
                    default_branch: default_branch.to_string(),
                },
            );
            state
                .branches
                .entry(key)
                .or_default()
                .insert(default_branch.to_string(), format!("sha-{}", default_branch));
        })
    }

    pub fn with_organization(self, org: &str) -> Self {
        self.with_state(|state| state.organizations.push(org.to_string()))
    }

    /// Add an extra branch to a registered repository.
    pub fn with_branch(self, owner: &str, repo: &str, branch: &str) -> Self {
        self.with_state(|state| {
            state
                .branches
                .entry(slug(owner, repo))
                .or_default()
                .insert(branch.to_string(), format!("sha-{}", branch));
        })
    }

    pub fn with_repo_secrets(self, owner: &str, repo: &str, names: &[&str]) -> Self {
        self.with_state(|state| {
            state.repo_secrets.insert(
                slug(owner, repo),
                names.iter().map(|n| n.to_string()).collect(),
            );
        })
    }

    pub fn with_org_secrets(self, org: &str, names: &[&str]) -> Self {
        self.with_state(|state| {
            state
                .org_secrets
                .insert(org.to_string(), names.iter().map(|n| n.to_string()).collect());
        })
    }

    pub fn with_environment(self, owner: &str, repo: &str, name: &str, secrets: &[&str]) -> Self {
        self.with_state(|state| {
            state.environments.entry(slug(owner, repo)).or_default().push((
                name.to_string(),
                secrets.iter().map(|n| n.to_string()).collect(),
            ));
        })
    }

    /// Workflow run returned for `status` queries.
    pub fn with_run(self, status: RunStatus, id: u64) -> Self {
        self.with_state(|state| {
            state.runs.push((
                status,
                WorkflowRun {
                    id,
                    status: Some(status.as_str().to_string()),
                    conclusion: None,
                    html_url: format!("https://github.com/runs/{}", id),
                },
            ));
        })
    }

    /// Hide runs until `polls` run listings have been made.
    pub fn with_runs_visible_after(self, polls: usize) -> Self {
        self.with_state(|state| state.runs_visible_after = polls)
    }

    /// Quota snapshots returned in order; the last one repeats.
    pub fn with_rate_limits(self, snapshots: Vec<RateLimitSnapshot>) -> Self {
        self.with_state(|state| state.rate_limits = snapshots.into())
    }

    /// Make every call to `operation` fail with `error`.
    pub fn failing(self, operation: &'static str, error: ApiError) -> Self {
        self.with_state(|state| {
            state.failures.insert(operation, error);
        })
    }

    /// Record a call and return the configured failure, if any.
    fn record(&self, operation: &'static str, target: String) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(CapturedCall { operation, target });
        match state.failures.get(operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<CapturedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of calls made to `operation`.
    pub fn call_count(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Operation names of calls that change remote state.
    pub fn mutations(&self) -> Vec<&'static str> {
        const MUTATING: [&str; 5] = [
            "create_branch",
            "delete_branch",
            "create_file",
            "put_repo_secret",
            "create_environment",
        ];
        self.calls()
            .into_iter()
            .map(|c| c.operation)
            .filter(|op| MUTATING.contains(op))
            .collect()
    }

    pub fn written_secrets(&self) -> Vec<WrittenSecret> {
        self.state.lock().unwrap().written_secrets.clone()
    }

    pub fn created_files(&self) -> Vec<CreatedFile> {
        self.state.lock().unwrap().created_files.clone()
    }

    /// (repo slug, environment) pairs created.
    pub fn created_environments(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().created_environments.clone()
    }

    /// Branch names of a repository.
    pub fn branches(&self, owner: &str, repo: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .branches
            .get(&slug(owner, repo))
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RepoApi for MockGitHubClient {
    async fn get_repository(&self, owner: &str, repo: &str) -> ApiResult<Repository> {
        let key = slug(owner, repo);
        self.record("get_repository", key.clone())?;
        self.state
            .lock()
            .unwrap()
            .repositories
            .get(&key)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(key))
    }

    async fn get_organization(&self, org: &str) -> ApiResult<Organization> {
        self.record("get_organization", org.to_string())?;
        let state = self.state.lock().unwrap();
        if state.organizations.iter().any(|o| o == org) {
            Ok(Organization {
                login: org.to_string(),
            })
        } else {
            Err(ApiError::NotFound(org.to_string()))
        }
    }

    async fn get_branch_sha(&self, owner: &str, repo: &str, branch: &str) -> ApiResult<String> {
        let key = slug(owner, repo);
        self.record("get_branch_sha", key.clone())?;
        self.state
            .lock()
            .unwrap()
            .branches
            .get(&key)
            .and_then(|b| b.get(branch))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("{}@{}", key, branch)))
    }

    async fn create_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        sha: &str,
    ) -> ApiResult<()> {
        let key = slug(owner, repo);
        self.record("create_branch", key.clone())?;
        let mut state = self.state.lock().unwrap();
        let branches = state.branches.entry(key).or_default();
        if branches.contains_key(branch) {
            return Err(ApiError::BadRequest("Reference already exists".to_string()));
        }
        branches.insert(branch.to_string(), sha.to_string());
        Ok(())
    }

    async fn delete_branch(&self, owner: &str, repo: &str, branch: &str) -> ApiResult<()> {
        let key = slug(owner, repo);
        self.record("delete_branch", key.clone())?;
        let mut state = self.state.lock().unwrap();
        state
            .branches
            .get_mut(&key)
            .and_then(|b| b.remove(branch))
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound(format!("{}@{}", key, branch)))
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
        let key = slug(owner, repo);
        self.record("create_file", key.clone())?;
        self.state.lock().unwrap().created_files.push(CreatedFile {
            repo: key,
            branch: branch.to_string(),
            path: path.to_string(),
            message: message.to_string(),
            content: content.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl SecretsApi for MockGitHubClient {
    async fn list_repo_secrets(&self, owner: &str, repo: &str) -> ApiResult<Vec<String>> {
        let key = slug(owner, repo);
        self.record("list_repo_secrets", key.clone())?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .repo_secrets
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_org_secrets(&self, org: &str) -> ApiResult<Vec<String>> {
        self.record("list_org_secrets", org.to_string())?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .org_secrets
            .get(org)
            .cloned()
            .unwrap_or_default())
    }

    async fn put_repo_secret(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        value: &str,
    ) -> ApiResult<()> {
        let key = slug(owner, repo);
        self.record("put_repo_secret", key.clone())?;
        let mut state = self.state.lock().unwrap();
        let names = state.repo_secrets.entry(key.clone()).or_default();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        state.written_secrets.push(WrittenSecret {
            repo: key,
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl EnvironmentsApi for MockGitHubClient {
    async fn list_environments(&self, owner: &str, repo: &str) -> ApiResult<Vec<String>> {
        let key = slug(owner, repo);
        self.record("list_environments", key.clone())?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .environments
            .get(&key)
            .map(|envs| envs.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default())
    }

    async fn create_environment(&self, owner: &str, repo: &str, name: &str) -> ApiResult<()> {
        let key = slug(owner, repo);
        self.record("create_environment", format!("{}:{}", key, name))?;
        let mut state = self.state.lock().unwrap();
        let envs = state.environments.entry(key.clone()).or_default();
        if !envs.iter().any(|(env, _)| env == name) {
            envs.push((name.to_string(), Vec::new()));
        }
        state.created_environments.push((key, name.to_string()));
        Ok(())
    }

    async fn list_environment_secrets(
        &self,
        owner: &str,
        repo: &str,
        environment: &str,
    ) -> ApiResult<Vec<String>> {
        let key = slug(owner, repo);
        self.record("list_environment_secrets", format!("{}:{}", key, environment))?;
        self.state
            .lock()
            .unwrap()
            .environments
            .get(&key)
            .and_then(|envs| envs.iter().find(|(name, _)| name == environment))
            .map(|(_, secrets)| secrets.clone())
            .ok_or_else(|| ApiError::NotFound(format!("{}:{}", key, environment)))
    }
}

#[async_trait]
impl ActionsApi for MockGitHubClient {
    async fn list_workflow_runs(
        &self,
        owner: &str,
        repo: &str,
        workflow_file: &str,
        _branch: &str,
        status: RunStatus,
    ) -> ApiResult<Vec<WorkflowRun>> {
        self.record(
            "list_workflow_runs",
            format!("{}:{}", slug(owner, repo), workflow_file),
        )?;
        let mut state = self.state.lock().unwrap();
        state.run_polls += 1;
        if state.run_polls <= state.runs_visible_after {
            return Ok(Vec::new());
        }
        Ok(state
            .runs
            .iter()
            .filter(|(s, _)| *s == status)
            .map(|(_, run)| run.clone())
            .collect())
    }
}

#[async_trait]
impl RateLimitApi for MockGitHubClient {
    async fn rate_limit(&self) -> ApiResult<RateLimitSnapshot> {
        self.record("rate_limit", String::new())?;
        let mut state = self.state.lock().unwrap();
        let snapshot = if state.rate_limits.len() > 1 {
            state.rate_limits.pop_front()
        } else {
            state.rate_limits.front().copied()
        };
        Ok(snapshot.unwrap_or_else(|| RateLimitSnapshot {
            remaining: 5000,
            limit: 5000,
            reset_at: Utc::now() + chrono::Duration::hours(1),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_branch_table() {
        let mock = MockGitHubClient::new().with_repository("acme", "app", "main");

        let sha = mock.get_branch_sha("acme", "app", "main").await.unwrap();
        mock.create_branch("acme", "app", "feature", &sha)
            .await
            .unwrap();

        let err = mock
            .create_branch("acme", "app", "feature", &sha)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        mock.delete_branch("acme", "app", "feature").await.unwrap();
        assert!(
            mock.delete_branch("acme", "app", "feature")
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert_eq!(mock.branches("acme", "app"), vec!["main"]);
    }

    #[tokio::test]
    async fn test_mock_failure_is_persistent_and_recorded() {
        let mock = MockGitHubClient::new().failing("list_org_secrets", ApiError::Unauthorized);

        assert!(mock.list_org_secrets("acme").await.is_err());
        assert!(mock.list_org_secrets("acme").await.is_err());
        assert_eq!(mock.call_count("list_org_secrets"), 2);
    }

    #[tokio::test]
    async fn test_mock_rate_limits_repeat_last() {
        let first = RateLimitSnapshot {
            remaining: 1,
            limit: 5000,
            reset_at: Utc::now(),
        };
        let second = RateLimitSnapshot {
            remaining: 4000,
            ..first
        };
        let mock = MockGitHubClient::new().with_rate_limits(vec![first, second]);

        assert_eq!(mock.rate_limit().await.unwrap().remaining, 1);
        assert_eq!(mock.rate_limit().await.unwrap().remaining, 4000);
        assert_eq!(mock.rate_limit().await.unwrap().remaining, 4000);
    }
}
