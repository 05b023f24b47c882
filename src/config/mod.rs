//! Migration configuration
//!
//! A [`MigrationConfig`] is built exactly once per run, after credentials have
//! been resolved, and is never mutated afterwards.

use std::fmt;

use serde::Serialize;

use crate::error::{ConfigError, Result};

/// Which end of the migration a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => f.write_str("source"),
            Side::Target => f.write_str("target"),
        }
    }
}

/// What gets migrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MigrationMode {
    /// Repository secrets plus environments and their secrets
    RepoToRepo,
    /// Organization secrets only
    OrgToOrg,
}

impl MigrationMode {
    /// Name of the disposable branch the workflow is pushed to.
    pub fn branch_name(&self) -> &'static str {
        match self {
            MigrationMode::RepoToRepo => "migrate-secrets",
            MigrationMode::OrgToOrg => "migrate-org-secrets",
        }
    }

    /// File name of the generated workflow under `.github/workflows/`.
    pub fn workflow_file(&self) -> &'static str {
        match self {
            MigrationMode::RepoToRepo => "migrate-secrets.yml",
            MigrationMode::OrgToOrg => "migrate-org-secrets.yml",
        }
    }

    /// Repository path of the generated workflow.
    pub fn workflow_path(&self) -> String {
        format!(".github/workflows/{}", self.workflow_file())
    }
}

impl fmt::Display for MigrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationMode::RepoToRepo => f.write_str("Repository-to-Repository"),
            MigrationMode::OrgToOrg => f.write_str("Organization-to-Organization"),
        }
    }
}

/// An organization, optionally narrowed to one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scope {
    pub organization: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

impl Scope {
    /// Scope for a single repository.
    pub fn repo(organization: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            repository: Some(repository.into()),
        }
    }

    /// Scope for a whole organization.
    pub fn org(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            repository: None,
        }
    }

    /// `owner/repo`, or just `owner` for an organization scope.
    pub fn slug(&self) -> String {
        match &self.repository {
            Some(repo) => format!("{}/{}", self.organization, repo),
            None => self.organization.clone(),
        }
    }

    /// Repository name, or an empty string for an organization scope.
    pub fn repository_name(&self) -> &str {
        self.repository.as_deref().unwrap_or_default()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.slug())
    }
}

/// A personal access token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for request headers and the injected workflow secrets only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Resolve the token for one side: an explicit value wins, the shared token fills in.
pub fn resolve_credential(
    side: Side,
    explicit: Option<&str>,
    shared: Option<&str>,
) -> Result<Credential> {
    explicit
        .filter(|token| !token.trim().is_empty())
        .or(shared.filter(|token| !token.trim().is_empty()))
        .map(Credential::new)
        .ok_or_else(|| ConfigError::MissingCredential { side }.into())
}

/// Immutable parameters of one migration run.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub source: Scope,
    pub target: Scope,
    pub source_credential: Credential,
    pub target_credential: Credential,
    pub mode: MigrationMode,
    pub skip_environments: bool,
}

impl MigrationConfig {
    /// Validate and assemble a configuration.
    ///
    /// Both modes need a source repository: organization secrets are migrated by
    /// a workflow that runs inside a repository of the source organization.
    pub fn new(
        source: Scope,
        target: Scope,
        source_credential: Credential,
        target_credential: Credential,
        mode: MigrationMode,
        skip_environments: bool,
    ) -> Result<Self> {
        for (side, scope) in [(Side::Source, &source), (Side::Target, &target)] {
            if scope.organization.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{side} organization is empty")).into());
            }
        }

        let has_repo = |scope: &Scope| {
            scope
                .repository
                .as_deref()
                .is_some_and(|repo| !repo.trim().is_empty())
        };

        match mode {
            MigrationMode::RepoToRepo => {
                if !has_repo(&source) {
                    return Err(ConfigError::MissingRepository { side: Side::Source }.into());
                }
                if !has_repo(&target) {
                    return Err(ConfigError::MissingRepository { side: Side::Target }.into());
                }
            }
            MigrationMode::OrgToOrg => {
                if !has_repo(&source) {
                    return Err(ConfigError::MissingHostRepository.into());
                }
            }
        }

        let target = match mode {
            MigrationMode::RepoToRepo => target,
            MigrationMode::OrgToOrg => Scope::org(target.organization),
        };

        Ok(Self {
            source,
            target,
            source_credential,
            target_credential,
            mode,
            skip_environments,
        })
    }

    /// Branch used for this run.
    pub fn branch_name(&self) -> &'static str {
        self.mode.branch_name()
    }

    /// Whether target environments are created before migrating.
    ///
    /// Environment secrets are migrated in repository mode either way.
    pub fn recreates_environments(&self) -> bool {
        self.mode == MigrationMode::RepoToRepo && !self.skip_environments
    }
}
