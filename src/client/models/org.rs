//! Organization models

use serde::{Deserialize, Serialize};

/// Organization metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Organization login
    pub login: String,
}
