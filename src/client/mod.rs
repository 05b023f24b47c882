//! GitHub API client

pub mod api;
pub mod github;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod pagination;
pub mod rate_limit;
pub mod sealing;

pub use api::{ActionsApi, EnvironmentsApi, RateLimitApi, RepoApi, SecretsApi};
pub use github::GitHubClient;
#[cfg(test)]
pub use mock::MockGitHubClient;

use crate::error::ApiError;

/// Result of a single GitHub API operation
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Every GitHub operation the migrator performs.
///
/// Implemented automatically for anything that implements the sub-traits.
pub trait GitHubApi: RepoApi + SecretsApi + EnvironmentsApi + ActionsApi + RateLimitApi {}

impl<T> GitHubApi for T where T: RepoApi + SecretsApi + EnvironmentsApi + ActionsApi + RateLimitApi {}
