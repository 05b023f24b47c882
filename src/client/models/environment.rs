//! Deployment environment models

use serde::{Deserialize, Serialize};

/// Deployment environment of a repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
}

/// One page of an environments listing
#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentList {
    #[serde(default)]
    pub total_count: usize,
    #[serde(default)]
    pub environments: Vec<Environment>,
}
