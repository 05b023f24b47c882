//! Polling for the workflow run started by the push

use std::time::Duration;

use log::{debug, info, warn};

use super::{Confirmation, Migrator};
use crate::client::GitHubApi;
use crate::client::models::RunStatus;
use crate::clock::Clock;

/// How long to look for the workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub first_wait: Duration,
    pub retry_wait: Duration,
    pub attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            first_wait: Duration::from_secs(2),
            retry_wait: Duration::from_secs(3),
            attempts: 6,
        }
    }
}

impl PollPolicy {
    /// Wait before attempt `attempt` (0-based).
    pub fn wait_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            self.first_wait
        } else {
            self.retry_wait
        }
    }
}

/// Actions page listing the runs of `branch`.
pub fn fallback_url(owner: &str, repo: &str, branch: &str) -> String {
    format!(
        "https://github.com/{}/{}/actions?query=branch%3A{}",
        owner, repo, branch
    )
}

impl<S, C> Migrator<S, C>
where
    S: GitHubApi + ?Sized,
    C: Clock + ?Sized,
{
    /// Look for a run of the published workflow.
    ///
    /// Never fails: when no run shows up the Actions page link is returned.
    pub(super) async fn await_confirmation(&self) -> Confirmation {
        let (owner, repo) = self.host();
        let branch = self.config.branch_name();
        let workflow_file = self.config.mode.workflow_file();

        for attempt in 0..self.poll.attempts {
            self.clock.sleep(self.poll.wait_before(attempt)).await;

            for status in RunStatus::CONFIRMATION_ORDER {
                let runs = match self
                    .source
                    .list_workflow_runs(owner, repo, workflow_file, branch, status)
                    .await
                {
                    Ok(runs) => runs,
                    Err(e) => {
                        debug!("Listing {} runs failed: {}", status, e);
                        continue;
                    }
                };

                if let Some(run) = runs.into_iter().next() {
                    let status = run.status.unwrap_or_else(|| status.to_string());
                    info!("Workflow run {} is {}", run.id, status);
                    return Confirmation::Run {
                        id: run.id,
                        status,
                        url: run.html_url,
                    };
                }
            }

            debug!(
                "No workflow run yet (attempt {}/{})",
                attempt + 1,
                self.poll.attempts
            );
        }

        warn!("Could not confirm the workflow started; check the Actions page");
        Confirmation::Fallback {
            url: fallback_url(owner, repo, branch),
        }
    }
}
