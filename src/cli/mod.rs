//! CLI definition and handlers

use clap::{Parser, ValueEnum};
use log::warn;

use crate::client::github::API_BASE_URL;
use crate::config::{MigrationConfig, MigrationMode, Scope, Side, resolve_credential};
use crate::error::Result;

pub mod migrate;

/// Output format for the final report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored summary with an inventory table
    #[default]
    Pretty,
    /// Machine-readable JSON
    Json,
}

/// Migrate GitHub Actions secrets and environments between repositories or organizations
#[derive(Parser, Debug)]
#[command(name = "gh-secrets-migrator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Organization that owns the secrets
    #[arg(long)]
    pub source_org: String,

    /// Repository that owns the secrets (hosts the workflow in --org-to-org mode)
    #[arg(long)]
    pub source_repo: Option<String>,

    /// Organization receiving the secrets
    #[arg(long)]
    pub target_org: String,

    /// Repository receiving the secrets (ignored with --org-to-org)
    #[arg(long)]
    pub target_repo: Option<String>,

    /// Token for the source side (scopes: repo, workflow; admin:org for organizations)
    #[arg(long, env = "GH_SOURCE_PAT", hide_env_values = true)]
    pub source_pat: Option<String>,

    /// Token for the target side (scopes: repo; admin:org for organizations)
    #[arg(long, env = "GH_TARGET_PAT", hide_env_values = true)]
    pub target_pat: Option<String>,

    /// Shared token used for any side without its own
    #[arg(long, env = "GITHUB_TOKEN", hide = true, hide_env_values = true)]
    pub github_token: Option<String>,

    /// Migrate organization secrets instead of repository secrets
    #[arg(long)]
    pub org_to_org: bool,

    /// Do not create environments in the target (their secrets are still migrated)
    #[arg(long)]
    pub skip_envs: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Report format (pretty, json)
    #[arg(
        long,
        env = "GH_SECRETS_MIGRATOR_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// GitHub API base URL
    #[arg(
        long,
        env = "GH_SECRETS_MIGRATOR_API_URL",
        default_value = API_BASE_URL,
        hide = true
    )]
    pub api_url: String,
}

impl Cli {
    pub fn mode(&self) -> MigrationMode {
        if self.org_to_org {
            MigrationMode::OrgToOrg
        } else {
            MigrationMode::RepoToRepo
        }
    }

    /// Resolve credentials and validate the flags into a [`MigrationConfig`].
    pub fn into_config(&self) -> Result<MigrationConfig> {
        let mode = self.mode();

        let source = match &self.source_repo {
            Some(repo) => Scope::repo(&self.source_org, repo),
            None => Scope::org(&self.source_org),
        };
        let target = match (mode, &self.target_repo) {
            (MigrationMode::OrgToOrg, Some(repo)) => {
                warn!("--target-repo '{}' is ignored with --org-to-org", repo);
                Scope::org(&self.target_org)
            }
            (MigrationMode::OrgToOrg, None) => Scope::org(&self.target_org),
            (MigrationMode::RepoToRepo, Some(repo)) => Scope::repo(&self.target_org, repo),
            (MigrationMode::RepoToRepo, None) => Scope::org(&self.target_org),
        };

        let shared = self.github_token.as_deref();
        let source_credential = resolve_credential(Side::Source, self.source_pat.as_deref(), shared)?;
        let target_credential = resolve_credential(Side::Target, self.target_pat.as_deref(), shared)?;

        MigrationConfig::new(
            source,
            target,
            source_credential,
            target_credential,
            mode,
            self.skip_envs,
        )
    }
}
