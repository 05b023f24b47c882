//! Secret and environment inventory discovered in the source scope

use std::fmt;

use serde::Serialize;

/// Secrets that belong to the migration machinery itself and are never migrated.
pub const RESERVED_SECRET_NAMES: [&str; 4] = [
    "github_token",
    "SECRETS_MIGRATOR_PAT",
    "SECRETS_MIGRATOR_TARGET_PAT",
    "SECRETS_MIGRATOR_SOURCE_PAT",
];

/// Injected secret holding the target token.
pub const TARGET_PAT_SECRET: &str = "SECRETS_MIGRATOR_TARGET_PAT";

/// Injected secret holding the source token.
pub const SOURCE_PAT_SECRET: &str = "SECRETS_MIGRATOR_SOURCE_PAT";

/// Name of a secret. Case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SecretName(String);

impl SecretName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this name is in the reserved set.
    pub fn is_reserved(&self) -> bool {
        RESERVED_SECRET_NAMES.contains(&self.0.as_str())
    }
}

impl fmt::Display for SecretName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SecretName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SecretName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Keep the order of `names`, dropping reserved ones.
pub fn migratable<I, N>(names: I) -> Vec<SecretName>
where
    I: IntoIterator<Item = N>,
    N: Into<SecretName>,
{
    names
        .into_iter()
        .map(Into::into)
        .filter(|name: &SecretName| !name.is_reserved())
        .collect()
}

/// Environment name to the secrets scoped to it, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EnvironmentInventory {
    environments: Vec<EnvironmentSecrets>,
}

/// One environment and its secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentSecrets {
    pub name: String,
    pub secrets: Vec<SecretName>,
}

impl EnvironmentInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an environment. Reserved secret names are dropped.
    pub fn insert<I, N>(&mut self, environment: impl Into<String>, secrets: I)
    where
        I: IntoIterator<Item = N>,
        N: Into<SecretName>,
    {
        self.environments.push(EnvironmentSecrets {
            name: environment.into(),
            secrets: migratable(secrets),
        });
    }

    /// Builder-style [`insert`](Self::insert).
    #[cfg(test)]
    pub fn with<I, N>(mut self, environment: impl Into<String>, secrets: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<SecretName>,
    {
        self.insert(environment, secrets);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnvironmentSecrets> {
        self.environments.iter()
    }

    /// Number of environments, including those without secrets.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.environments.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }

    /// Total number of (environment, secret) pairs.
    #[cfg(test)]
    pub fn secret_count(&self) -> usize {
        self.environments.iter().map(|env| env.secrets.len()).sum()
    }
}

/// Everything a run migrates, as discovered in the source scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MigrationInventory {
    /// Repository secrets plus per-environment secrets
    Repository {
        secrets: Vec<SecretName>,
        environments: EnvironmentInventory,
    },
    /// Organization secrets
    Organization { secrets: Vec<SecretName> },
}

impl MigrationInventory {
    /// Repository or organization level secrets, excluding environments.
    pub fn secrets(&self) -> &[SecretName] {
        match self {
            MigrationInventory::Repository { secrets, .. } => secrets,
            MigrationInventory::Organization { secrets } => secrets,
        }
    }

    /// Environment secrets; always empty for organizations.
    pub fn environments(&self) -> Option<&EnvironmentInventory> {
        match self {
            MigrationInventory::Repository { environments, .. } => Some(environments),
            MigrationInventory::Organization { .. } => None,
        }
    }

    /// Number of secrets that will be written to the target.
    #[cfg(test)]
    pub fn secret_count(&self) -> usize {
        self.secrets().len() + self.environments().map_or(0, EnvironmentInventory::secret_count)
    }
}

/// An enumeration that could not be completed and was treated as empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Degraded {
    pub reason: String,
}

impl Degraded {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Degraded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}
