//! Workflow run lookups

use async_trait::async_trait;

use crate::client::ApiResult;
use crate::client::models::{RunStatus, WorkflowRun};

#[async_trait]
pub trait ActionsApi: Send + Sync {
    /// Most recent runs of `workflow_file` on `branch` with the given status.
    async fn list_workflow_runs(
        &self,
        owner: &str,
        repo: &str,
        workflow_file: &str,
        branch: &str,
        status: RunStatus,
    ) -> ApiResult<Vec<WorkflowRun>>;
}
