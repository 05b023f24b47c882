use std::collections::BTreeMap;

use super::{Job, PushTrigger, Step, StepKind, Trigger, Workflow, scripts};
use crate::config::Scope;
use crate::inventory::{
    EnvironmentSecrets, MigrationInventory, RESERVED_SECRET_NAMES, SOURCE_PAT_SECRET, SecretName,
    TARGET_PAT_SECRET,
};

/// `name:` of every generated workflow.
pub const WORKFLOW_NAME: &str = "move-secrets";

const RUNNER: &str = "ubuntu-latest";
const SHELL: &str = "bash";

const BULK_JOB_ID: &str = "migrate-secrets";
const ORG_JOB_ID: &str = "migrate-org-secrets";
const CLEANUP_JOB_ID: &str = "cleanup";

fn secret_ref(name: &str) -> String {
    format!("${{{{ secrets['{}'] }}}}", name)
}

fn env<const N: usize>(pairs: [(&str, String); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Build the workflow for `inventory`.
///
/// Reserved secret names are dropped again here whatever the caller passed.
/// The cleanup job is always present and runs after every other job,
/// whether they succeeded or not.
pub fn generate(
    source: &Scope,
    target: &Scope,
    branch: &str,
    inventory: &MigrationInventory,
) -> Workflow {
    let mut jobs = Vec::new();

    match inventory {
        MigrationInventory::Repository {
            secrets,
            environments,
        } => {
            if secrets.iter().any(|name| !name.is_reserved()) {
                jobs.push(bulk_job(source, target));
            }

            let with_secrets = environments
                .iter()
                .filter(|env| env.secrets.iter().any(|name| !name.is_reserved()));
            for (index, environment) in with_secrets.enumerate() {
                jobs.push(environment_job(index + 1, environment, target));
            }
        }
        MigrationInventory::Organization { secrets } => {
            let steps: Vec<Step> = secrets
                .iter()
                .filter(|name| !name.is_reserved())
                .map(|name| org_secret_step(name, target))
                .collect();
            if !steps.is_empty() {
                jobs.push(Job {
                    id: ORG_JOB_ID.to_string(),
                    name: format!(
                        "Migrate organization secrets from {} to {}",
                        source.organization, target.organization
                    ),
                    runs_on: RUNNER.to_string(),
                    environment: None,
                    needs: Vec::new(),
                    condition: None,
                    steps,
                });
            }
        }
    }

    let needs = jobs.iter().map(|job| job.id.clone()).collect();
    jobs.push(cleanup_job(branch, needs));

    Workflow {
        name: WORKFLOW_NAME.to_string(),
        trigger: Trigger {
            push: PushTrigger {
                branches: vec![branch.to_string()],
            },
        },
        permissions: BTreeMap::from([("contents".to_string(), "write".to_string())]),
        jobs,
    }
}

fn bulk_job(source: &Scope, target: &Scope) -> Job {
    let step = Step {
        kind: StepKind::BulkRepoSecrets,
        name: format!("Migrate repository secrets from {} to {}", source, target),
        env: env([
            ("GH_TOKEN", secret_ref(TARGET_PAT_SECRET)),
            ("RESERVED_SECRETS", RESERVED_SECRET_NAMES.join(" ")),
            ("SECRETS_CONTEXT", "${{ toJSON(secrets) }}".to_string()),
            ("TARGET_REPO", target.slug()),
        ]),
        shell: SHELL.to_string(),
        run: scripts::BULK_REPO_SECRETS.to_string(),
    };

    Job {
        id: BULK_JOB_ID.to_string(),
        name: "Migrate repository secrets".to_string(),
        runs_on: RUNNER.to_string(),
        environment: None,
        needs: Vec::new(),
        condition: None,
        steps: vec![step],
    }
}

fn org_secret_step(name: &SecretName, target: &Scope) -> Step {
    Step {
        kind: StepKind::OrgSecret { name: name.clone() },
        name: format!("Migrate organization secret {}", name),
        env: env([
            ("GH_TOKEN", secret_ref(TARGET_PAT_SECRET)),
            ("SECRET_NAME", name.to_string()),
            ("SECRET_VALUE", secret_ref(name.as_str())),
            ("TARGET_ORG", target.organization.clone()),
        ]),
        shell: SHELL.to_string(),
        run: scripts::ORG_SECRET.to_string(),
    }
}

fn environment_job(index: usize, environment: &EnvironmentSecrets, target: &Scope) -> Job {
    let steps = environment
        .secrets
        .iter()
        .filter(|name| !name.is_reserved())
        .map(|name| Step {
            kind: StepKind::EnvironmentSecret {
                environment: environment.name.clone(),
                name: name.clone(),
            },
            name: format!("Migrate {} to environment {}", name, environment.name),
            env: env([
                ("ENVIRONMENT_NAME", environment.name.clone()),
                ("GH_TOKEN", secret_ref(TARGET_PAT_SECRET)),
                ("SECRET_NAME", name.to_string()),
                ("SECRET_VALUE", secret_ref(name.as_str())),
                ("TARGET_REPO", target.slug()),
            ]),
            shell: SHELL.to_string(),
            run: scripts::ENVIRONMENT_SECRET.to_string(),
        })
        .collect();

    Job {
        id: format!("migrate-env-{}", index),
        name: format!("Migrate environment {}", environment.name),
        runs_on: RUNNER.to_string(),
        environment: Some(environment.name.clone()),
        needs: Vec::new(),
        condition: None,
        steps,
    }
}

fn cleanup_job(branch: &str, needs: Vec<String>) -> Job {
    let step = Step {
        kind: StepKind::Cleanup,
        name: "Delete temporary credentials and migration branch".to_string(),
        env: env([
            ("GH_TOKEN", secret_ref(SOURCE_PAT_SECRET)),
            ("MIGRATION_BRANCH", branch.to_string()),
            (
                "TEMPORARY_SECRETS",
                format!("{} {}", TARGET_PAT_SECRET, SOURCE_PAT_SECRET),
            ),
        ]),
        shell: SHELL.to_string(),
        run: scripts::CLEANUP.to_string(),
    };

    Job {
        id: CLEANUP_JOB_ID.to_string(),
        name: "Cleanup".to_string(),
        runs_on: RUNNER.to_string(),
        environment: None,
        needs,
        condition: Some("always()".to_string()),
        steps: vec![step],
    }
}
