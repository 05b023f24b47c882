//! GitHub API traits
//!
//! Operations are split by resource so test doubles and callers only name what
//! they use. [`GitHubApi`](super::GitHubApi) bundles them all.

mod actions;
mod environments;
mod quota;
mod repo;
mod secrets;

pub use actions::ActionsApi;
pub use environments::EnvironmentsApi;
pub use quota::RateLimitApi;
pub use repo::RepoApi;
pub use secrets::SecretsApi;
