//! Migration state machine
//!
//! A run moves through [`Phase`]s in a fixed order. Validation, branch and
//! credential failures abort the run; environment and enumeration problems
//! become warnings; a run that cannot be observed falls back to a link.
//!
//! Deleting the temporary credentials and the branch after publication is the
//! generated workflow's job, not this process's.

mod branch;
mod confirm;
mod discover;
mod report;
mod validate;

use std::fmt;
use std::sync::Arc;

use log::{debug, info};

use crate::client::GitHubApi;
use crate::client::rate_limit::{CRITICAL_THRESHOLD, RateLimitMonitor};
use crate::clock::Clock;
use crate::config::{MigrationConfig, MigrationMode};
use crate::error::Result;
use crate::inventory::MigrationInventory;

pub use confirm::PollPolicy;
pub use report::{Confirmation, MigrationOutcome, MigrationReport};

/// Steps of a migration run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    ValidatePermissions,
    RecreateEnvironments,
    DiscoverInventory,
    PrepareBranch,
    InjectCredentials,
    Publish,
    AwaitConfirmation,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::ValidatePermissions => "Validate permissions",
            Phase::RecreateEnvironments => "Recreate environments",
            Phase::DiscoverInventory => "Discover inventory",
            Phase::PrepareBranch => "Prepare branch",
            Phase::InjectCredentials => "Inject credentials",
            Phase::Publish => "Publish workflow",
            Phase::AwaitConfirmation => "Await confirmation",
            Phase::Done => "Done",
        };
        f.write_str(name)
    }
}

/// Drives one migration from validation to confirmation.
pub struct Migrator<S: ?Sized, C: ?Sized> {
    config: MigrationConfig,
    source: Arc<S>,
    target: Arc<S>,
    clock: Arc<C>,
    monitor: RateLimitMonitor<S, C>,
    poll: PollPolicy,
}

impl<S, C> Migrator<S, C>
where
    S: GitHubApi + ?Sized,
    C: Clock + ?Sized,
{
    /// `source` and `target` are clients authenticated with the matching tokens.
    pub fn new(config: MigrationConfig, source: Arc<S>, target: Arc<S>, clock: Arc<C>) -> Self {
        let monitor = RateLimitMonitor::new(source.clone(), target.clone(), clock.clone());
        Self {
            config,
            source,
            target,
            clock,
            monitor,
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Owner and name of the source repository, which hosts the workflow.
    fn host(&self) -> (&str, &str) {
        (
            &self.config.source.organization,
            self.config.source.repository_name(),
        )
    }

    fn enter(&self, phase: Phase) {
        debug!("Phase: {}", phase);
    }

    /// Run the whole migration.
    pub async fn run(&self) -> Result<MigrationReport> {
        let mut report = MigrationReport::new(&self.config);
        info!(
            "{} migration: {} -> {}",
            self.config.mode, self.config.source, self.config.target
        );

        self.enter(Phase::ValidatePermissions);
        let host = self.validate_permissions().await?;
        self.monitor.log_status().await;

        self.monitor.wait_if_critical(CRITICAL_THRESHOLD).await;

        let environments = match self.config.mode {
            MigrationMode::OrgToOrg => Vec::new(),
            MigrationMode::RepoToRepo if self.config.recreates_environments() => {
                self.enter(Phase::RecreateEnvironments);
                let environments = self.recreate_environments(&mut report).await?;
                self.monitor.checkpoint("Recreate environments").await;
                environments
            }
            MigrationMode::RepoToRepo => self.source_environments(&mut report).await,
        };

        self.enter(Phase::DiscoverInventory);
        let inventory = self.discover_inventory(&environments, &mut report).await?;
        self.monitor.checkpoint("Discover inventory").await;

        if inventory.secrets().is_empty() {
            info!("No secrets to migrate in {}", self.config.source);
            report.inventory = Some(inventory);
            self.enter(Phase::Done);
            return Ok(report);
        }
        log_inventory(&inventory);

        self.enter(Phase::PrepareBranch);
        self.prepare_branch(&host).await?;
        self.monitor.checkpoint("Prepare branch").await;

        self.enter(Phase::InjectCredentials);
        self.inject_credentials().await?;

        self.monitor.wait_if_critical(CRITICAL_THRESHOLD).await;

        self.enter(Phase::Publish);
        let workflow_path = self.publish(&inventory).await?;

        self.enter(Phase::AwaitConfirmation);
        let confirmation = self.await_confirmation().await;
        info!("Monitor the migration at {}", confirmation.url());

        self.monitor.checkpoint("Done").await;
        self.enter(Phase::Done);

        report.inventory = Some(inventory);
        report.outcome = MigrationOutcome::Published {
            workflow_path,
            confirmation,
        };
        Ok(report)
    }
}

fn log_inventory(inventory: &MigrationInventory) {
    info!("Secrets to migrate ({}):", inventory.secrets().len());
    for name in inventory.secrets() {
        info!("  {}", name);
    }
    if let Some(environments) = inventory.environments() {
        for environment in environments.iter().filter(|env| !env.secrets.is_empty()) {
            info!(
                "Environment {} ({} secrets):",
                environment.name,
                environment.secrets.len()
            );
            for name in &environment.secrets {
                info!("  {}", name);
            }
        }
    }
}
