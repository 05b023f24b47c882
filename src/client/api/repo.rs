//! Repository, branch and file operations

use async_trait::async_trait;

use crate::client::ApiResult;
use crate::client::models::{Organization, Repository};

#[async_trait]
pub trait RepoApi: Send + Sync {
    /// Fetch repository metadata, including its default branch.
    async fn get_repository(&self, owner: &str, repo: &str) -> ApiResult<Repository>;

    /// Fetch organization metadata.
    async fn get_organization(&self, org: &str) -> ApiResult<Organization>;

    /// Commit SHA at the tip of `branch`.
    async fn get_branch_sha(&self, owner: &str, repo: &str, branch: &str) -> ApiResult<String>;

    /// Create `branch` pointing at `sha`.
    async fn create_branch(&self, owner: &str, repo: &str, branch: &str, sha: &str)
    -> ApiResult<()>;

    /// Delete `branch`. Fails with `NotFound` when it does not exist.
    async fn delete_branch(&self, owner: &str, repo: &str, branch: &str) -> ApiResult<()>;

    /// Commit a new file to `branch`.
    async fn create_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
        message: &str,
        content: &str,
    ) -> ApiResult<()>;
}
