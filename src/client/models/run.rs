//! Workflow run models

use std::fmt;

use serde::{Deserialize, Serialize};

/// Run status filter used when looking for the migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    InProgress,
    Queued,
    Completed,
    Failure,
}

impl RunStatus {
    /// Order in which statuses are queried on each confirmation attempt.
    pub const CONFIRMATION_ORDER: [RunStatus; 4] = [
        RunStatus::InProgress,
        RunStatus::Queued,
        RunStatus::Completed,
        RunStatus::Failure,
    ];

    /// Query parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::InProgress => "in_progress",
            RunStatus::Queued => "queued",
            RunStatus::Completed => "completed",
            RunStatus::Failure => "failure",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A GitHub Actions workflow run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
    pub html_url: String,
}

/// One page of a workflow run listing
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRunList {
    #[serde(default)]
    pub workflow_runs: Vec<WorkflowRun>,
}
