//! The generated migration workflow
//!
//! [`generate`] builds a typed [`Workflow`] from the discovered inventory and
//! [`Workflow::render`] serializes it to GitHub Actions YAML. Structure is
//! inspected on the typed value; rendering is a single `serde_yaml` pass.

mod generate;
mod scripts;

use std::collections::BTreeMap;

use serde::Serialize;
use serde::ser::Serializer;

use crate::error::Result;
use crate::inventory::SecretName;

pub use generate::generate;

/// A GitHub Actions workflow document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workflow {
    pub name: String,
    #[serde(rename = "on")]
    pub trigger: Trigger,
    pub permissions: BTreeMap<String, String>,
    /// Jobs, rendered as a mapping in this order
    #[serde(serialize_with = "serialize_jobs")]
    pub jobs: Vec<Job>,
}

/// `on:` clause. Only pushes to the listed branches start the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trigger {
    pub push: PushTrigger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushTrigger {
    pub branches: Vec<String>,
}

/// One job. `id` becomes the mapping key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    #[serde(rename = "runs-on")]
    pub runs_on: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,
    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub steps: Vec<Step>,
}

/// One step of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    #[serde(skip)]
    pub kind: StepKind,
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    pub shell: String,
    pub run: String,
}

/// What a step does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    /// Copy every visible repository secret, recording failures
    BulkRepoSecrets,
    /// Copy one organization secret, failing fast
    OrgSecret { name: SecretName },
    /// Copy one environment secret, failing fast
    EnvironmentSecret {
        environment: String,
        name: SecretName,
    },
    /// Delete the temporary credentials and the migration branch
    Cleanup,
}

fn serialize_jobs<S: Serializer>(jobs: &[Job], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(jobs.iter().map(|job| (&job.id, job)))
}

impl Workflow {
    /// Every step of every job, in document order.
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.jobs.iter().flat_map(|job| job.steps.iter())
    }

    /// Number of steps matching `predicate`.
    pub fn count_steps(&self, predicate: impl Fn(&StepKind) -> bool) -> usize {
        self.steps().filter(|step| predicate(&step.kind)).count()
    }

    /// Secret names migrated by dedicated (non-bulk) steps.
    pub fn named_secrets(&self) -> Vec<&SecretName> {
        self.steps()
            .filter_map(|step| match &step.kind {
                StepKind::OrgSecret { name } | StepKind::EnvironmentSecret { name, .. } => {
                    Some(name)
                }
                StepKind::BulkRepoSecrets | StepKind::Cleanup => None,
            })
            .collect()
    }

    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }

    /// Serialize to YAML.
    pub fn render(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
