//! Environment recreation and inventory discovery

use log::{debug, info};

use super::{MigrationReport, Migrator};
use crate::client::GitHubApi;
use crate::clock::Clock;
use crate::config::MigrationMode;
use crate::error::{Error, Result};
use crate::inventory::{Degraded, EnvironmentInventory, MigrationInventory, migratable};

impl<S, C> Migrator<S, C>
where
    S: GitHubApi + ?Sized,
    C: Clock + ?Sized,
{
    /// Create every source environment in the target repository.
    ///
    /// Returns the source environment names. Failing to list them is fatal;
    /// failing to create one is a warning.
    pub(super) async fn recreate_environments(
        &self,
        report: &mut MigrationReport,
    ) -> Result<Vec<String>> {
        let (owner, repo) = self.host();
        let environments = self
            .source
            .list_environments(owner, repo)
            .await
            .map_err(|e| Error::step("List source environments", e))?;

        if environments.is_empty() {
            info!("No environments to recreate");
            return Ok(environments);
        }
        info!("Recreating {} environment(s) in {}", environments.len(), self.config.target);

        let target = &self.config.target;
        for name in &environments {
            match self
                .target
                .create_environment(&target.organization, target.repository_name(), name)
                .await
            {
                Ok(()) => {
                    debug!("Created environment {}", name);
                    report.environments_created.push(name.clone());
                }
                Err(e) => report.warn(format!("Could not create environment '{}': {}", name, e)),
            }
        }

        Ok(environments)
    }

    /// List what has to move. Reserved names never make it into the result.
    ///
    /// Environment secrets are only enumerated when there are repository
    /// secrets to migrate.
    /// Source environment names when environments are not recreated.
    ///
    /// Their secrets are still migrated into environments that already exist
    /// in the target, so a listing failure only drops them with a warning.
    pub(super) async fn source_environments(&self, report: &mut MigrationReport) -> Vec<String> {
        let (owner, repo) = self.host();
        info!("Skipping environment recreation");
        match self.source.list_environments(owner, repo).await {
            Ok(environments) => environments,
            Err(e) => {
                report.warn(format!(
                    "Environment secrets will not be migrated: listing source environments failed: {}",
                    e
                ));
                Vec::new()
            }
        }
    }

    pub(super) async fn discover_inventory(
        &self,
        environments: &[String],
        report: &mut MigrationReport,
    ) -> Result<MigrationInventory> {
        match self.config.mode {
            MigrationMode::OrgToOrg => {
                let org = &self.config.source.organization;
                let names = self
                    .source
                    .list_org_secrets(org)
                    .await
                    .map_err(|e| Error::step("List organization secrets", e))?;
                Ok(MigrationInventory::Organization {
                    secrets: migratable(names),
                })
            }
            MigrationMode::RepoToRepo => {
                let (owner, repo) = self.host();
                let names = self
                    .source
                    .list_repo_secrets(owner, repo)
                    .await
                    .map_err(|e| Error::step("List repository secrets", e))?;
                let secrets = migratable(names);

                let environments = if secrets.is_empty() || environments.is_empty() {
                    EnvironmentInventory::new()
                } else {
                    self.environment_secrets(environments)
                        .await
                        .unwrap_or_else(|degraded| {
                            report.warn(format!(
                                "Environment secrets will not be migrated: {}",
                                degraded
                            ));
                            EnvironmentInventory::new()
                        })
                };

                Ok(MigrationInventory::Repository {
                    secrets,
                    environments,
                })
            }
        }
    }

    /// Secrets of each source environment, in environment order.
    pub(super) async fn environment_secrets(
        &self,
        environments: &[String],
    ) -> std::result::Result<EnvironmentInventory, Degraded> {
        let (owner, repo) = self.host();
        let mut inventory = EnvironmentInventory::new();

        for environment in environments {
            let names = self
                .source
                .list_environment_secrets(owner, repo, environment)
                .await
                .map_err(|e| {
                    Degraded::new(format!(
                        "listing secrets of environment '{}' failed: {}",
                        environment, e
                    ))
                })?;
            inventory.insert(environment.as_str(), names);
        }

        Ok(inventory)
    }
}
