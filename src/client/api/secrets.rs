//! Actions secret operations

use async_trait::async_trait;

use crate::client::ApiResult;

#[async_trait]
pub trait SecretsApi: Send + Sync {
    /// Names of all repository secrets.
    async fn list_repo_secrets(&self, owner: &str, repo: &str) -> ApiResult<Vec<String>>;

    /// Names of all organization secrets.
    async fn list_org_secrets(&self, org: &str) -> ApiResult<Vec<String>>;

    /// Create or overwrite a repository secret. The value is sealed client-side.
    async fn put_repo_secret(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
        value: &str,
    ) -> ApiResult<()>;
}
