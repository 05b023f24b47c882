//! GitHub REST API data models
//!
//! Only the fields the migrator reads are modelled. Models are organized by
//! resource type.

mod environment;
mod org;
mod repo;
mod run;
mod secret;

pub use environment::{Environment, EnvironmentList};
pub use org::Organization;
pub use repo::{GitRef, Repository};
pub use run::{RunStatus, WorkflowRun, WorkflowRunList};
pub use secret::{PublicKey, Secret, SecretList};
