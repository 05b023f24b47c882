//! What a migration run did

use serde::Serialize;

use crate::config::{MigrationConfig, MigrationMode, Scope};
use crate::inventory::MigrationInventory;

/// Evidence that the published workflow was picked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Confirmation {
    /// A run of the workflow was found
    Run { id: u64, status: String, url: String },
    /// No run was observed; link to the branch's Actions page instead
    Fallback { url: String },
}

impl Confirmation {
    pub fn url(&self) -> &str {
        match self {
            Confirmation::Run { url, .. } | Confirmation::Fallback { url } => url,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Confirmation::Run { .. })
    }
}

/// How the run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// No secrets besides the reserved ones; nothing was changed
    NothingToMigrate,
    /// The workflow was pushed to the migration branch
    Published {
        workflow_path: String,
        confirmation: Confirmation,
    },
}

/// Summary of one run, printed at the end.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub mode: MigrationMode,
    pub source: Scope,
    pub target: Scope,
    pub branch: String,
    pub inventory: Option<MigrationInventory>,
    pub environments_created: Vec<String>,
    /// Non-fatal problems, in the order they happened
    pub warnings: Vec<String>,
    pub outcome: MigrationOutcome,
}

impl MigrationReport {
    pub(crate) fn new(config: &MigrationConfig) -> Self {
        Self {
            mode: config.mode,
            source: config.source.clone(),
            target: config.target.clone(),
            branch: config.branch_name().to_string(),
            inventory: None,
            environments_created: Vec::new(),
            warnings: Vec::new(),
            outcome: MigrationOutcome::NothingToMigrate,
        }
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.warnings.push(message);
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        match &self.outcome {
            MigrationOutcome::Published { confirmation, .. } => Some(confirmation),
            MigrationOutcome::NothingToMigrate => None,
        }
    }
}
