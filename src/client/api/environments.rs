//! Deployment environment operations

use async_trait::async_trait;

use crate::client::ApiResult;

#[async_trait]
pub trait EnvironmentsApi: Send + Sync {
    /// Names of all environments of a repository.
    async fn list_environments(&self, owner: &str, repo: &str) -> ApiResult<Vec<String>>;

    /// Create an environment, or leave an existing one untouched.
    async fn create_environment(&self, owner: &str, repo: &str, name: &str) -> ApiResult<()>;

    /// Names of the secrets scoped to one environment.
    async fn list_environment_secrets(
        &self,
        owner: &str,
        repo: &str,
        environment: &str,
    ) -> ApiResult<Vec<String>>;
}
