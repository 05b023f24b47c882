//! Migration branch, temporary credentials and workflow publication

use log::{debug, info, warn};

use super::Migrator;
use crate::client::GitHubApi;
use crate::client::models::Repository;
use crate::clock::Clock;
use crate::config::MigrationMode;
use crate::error::{Error, Result};
use crate::inventory::{MigrationInventory, SOURCE_PAT_SECRET, TARGET_PAT_SECRET};
use crate::workflow;

impl<S, C> Migrator<S, C>
where
    S: GitHubApi + ?Sized,
    C: Clock + ?Sized,
{
    /// Recreate the migration branch at the tip of the default branch.
    ///
    /// A leftover branch from an earlier run is deleted first, so running
    /// this twice leaves exactly one branch.
    pub(super) async fn prepare_branch(&self, host: &Repository) -> Result<()> {
        let (owner, repo) = self.host();
        let branch = self.config.branch_name();

        let default_branch = match self.config.mode {
            MigrationMode::RepoToRepo => {
                self.source
                    .get_repository(owner, repo)
                    .await
                    .map_err(|e| Error::step("Look up default branch", e))?
                    .default_branch
            }
            MigrationMode::OrgToOrg => host.default_branch.clone(),
        };

        let sha = self
            .source
            .get_branch_sha(owner, repo, &default_branch)
            .await
            .map_err(|e| Error::step("Resolve default branch commit", e))?;
        debug!("{} is at {}", default_branch, sha);

        match self.source.delete_branch(owner, repo, branch).await {
            Ok(()) => info!("Deleted existing branch {}", branch),
            Err(e) if e.is_not_found() => debug!("No existing branch {}", branch),
            Err(e) => warn!("Could not delete existing branch {}: {}", branch, e),
        }

        self.source
            .create_branch(owner, repo, branch, &sha)
            .await
            .map_err(|e| Error::step("Create migration branch", e))?;
        info!("Created branch {} from {}", branch, default_branch);

        Ok(())
    }

    /// Store both tokens as secrets of the source repository for the workflow.
    pub(super) async fn inject_credentials(&self) -> Result<()> {
        let (owner, repo) = self.host();
        let credentials = [
            (TARGET_PAT_SECRET, &self.config.target_credential),
            (SOURCE_PAT_SECRET, &self.config.source_credential),
        ];

        for (name, credential) in credentials {
            self.source
                .put_repo_secret(owner, repo, name, credential.expose())
                .await
                .map_err(|e| Error::step("Store temporary credential", e))?;
            debug!("Stored {} in {}/{}", name, owner, repo);
        }

        Ok(())
    }

    /// Generate the workflow and commit it to the migration branch.
    ///
    /// The push starts the workflow. Returns the file path.
    pub(super) async fn publish(&self, inventory: &MigrationInventory) -> Result<String> {
        let (owner, repo) = self.host();
        let branch = self.config.branch_name();
        let path = self.config.mode.workflow_path();

        let content = workflow::generate(
            &self.config.source,
            &self.config.target,
            branch,
            inventory,
        )
        .render()?;

        let message = format!("Add {}", self.config.mode.workflow_file());
        self.source
            .create_file(owner, repo, branch, &path, &message, &content)
            .await
            .map_err(|e| Error::step("Publish workflow", e))?;
        info!("Pushed {} to {}", path, branch);

        Ok(path)
    }
}
