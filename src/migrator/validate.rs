//! Permission checks run before anything is changed

use log::{debug, info};

use super::Migrator;
use crate::client::GitHubApi;
use crate::client::models::Repository;
use crate::clock::Clock;
use crate::config::{MigrationMode, Scope, Side};
use crate::error::{ApiError, PermissionError, Result};

fn check<T>(side: Side, scope: &Scope, result: std::result::Result<T, ApiError>) -> Result<T> {
    result.map_err(|e| PermissionError::classify(side, &scope.slug(), e).into())
}

impl<S, C> Migrator<S, C>
where
    S: GitHubApi + ?Sized,
    C: Clock + ?Sized,
{
    /// Confirm each token can read its scope and enumerate secrets there.
    ///
    /// Returns the source repository, which hosts the migration workflow.
    pub(super) async fn validate_permissions(&self) -> Result<Repository> {
        let source = &self.config.source;
        let target = &self.config.target;
        let (owner, repo) = self.host();

        let host = check(
            Side::Source,
            source,
            self.source.get_repository(owner, repo).await,
        )?;
        debug!("Source repository {} is accessible", host.full_name);

        match self.config.mode {
            MigrationMode::RepoToRepo => {
                check(
                    Side::Source,
                    source,
                    self.source.list_repo_secrets(owner, repo).await,
                )?;

                let (target_owner, target_repo) =
                    (&target.organization, target.repository_name());
                check(
                    Side::Target,
                    target,
                    self.target.get_repository(target_owner, target_repo).await,
                )?;
                check(
                    Side::Target,
                    target,
                    self.target.list_repo_secrets(target_owner, target_repo).await,
                )?;
            }
            MigrationMode::OrgToOrg => {
                let source_org = Scope::org(&source.organization);
                check(
                    Side::Source,
                    &source_org,
                    self.source.get_organization(&source.organization).await,
                )?;
                check(
                    Side::Source,
                    &source_org,
                    self.source.list_org_secrets(&source.organization).await,
                )?;

                check(
                    Side::Target,
                    target,
                    self.target.get_organization(&target.organization).await,
                )?;
                check(
                    Side::Target,
                    target,
                    self.target.list_org_secrets(&target.organization).await,
                )?;
            }
        }

        info!("Permissions validated for source and target");
        Ok(host)
    }
}
