//! Repository and git reference models

use serde::{Deserialize, Serialize};

/// Repository metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// `owner/name`
    pub full_name: String,

    /// Branch new branches are cut from
    #[serde(default = "default_branch")]
    pub default_branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

/// A git reference as returned by `git/ref/heads/{branch}`
#[derive(Debug, Clone, Deserialize)]
pub struct GitRef {
    pub object: GitObject,
}

/// Object a reference points at
#[derive(Debug, Clone, Deserialize)]
pub struct GitObject {
    pub sha: String,
}
