//! Error types for the secrets migrator

use std::time::Duration;
use thiserror::Error;

use crate::config::Side;

/// Result type alias for migrator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Permission(#[from] PermissionError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render workflow: {0}")]
    Render(String),

    #[error("{step} failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: ApiError,
    },
}

impl Error {
    /// Wrap an API failure with the migration step that hit it.
    pub fn step(step: &'static str, source: ApiError) -> Self {
        Error::Step { step, source }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Render(err.to_string())
    }
}

/// GitHub API errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Authentication failed. The token is invalid, expired or revoked.")]
    Unauthorized,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Failed to encrypt secret: {0}")]
    Encryption(String),
}

impl ApiError {
    /// Whether the error means the requested resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to GitHub API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Input validation errors, raised before any remote call is made
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "--{side}-repo is required for repository-to-repository migration (or pass --org-to-org)"
    )]
    MissingRepository { side: Side },

    #[error(
        "--source-repo is required in --org-to-org mode: the migration workflow runs in a repository of the source organization"
    )]
    MissingHostRepository,

    #[error("No {side} token. Pass --{side}-pat or set GITHUB_TOKEN.")]
    MissingCredential { side: Side },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Credential and access failures found while validating permissions
#[derive(Debug, Error)]
pub enum PermissionError {
    #[error(
        "{side} scope '{scope}' not found.\nPlease verify:\n  - the organization and repository names are correct\n  - the {side} token has access to it"
    )]
    NotFound { side: Side, scope: String },

    #[error(
        "Authentication failed for {side} scope '{scope}'.\nThe {side} token may be invalid, expired, or revoked."
    )]
    Unauthorized { side: Side, scope: String },

    #[error(
        "The {side} token cannot manage secrets in '{scope}'.\nEnsure it has these scopes:\n  - 'repo' (full control of private repositories)\n  - 'workflow' (update GitHub Action workflows)\n  - 'admin:org' (organization secrets, org-to-org only)"
    )]
    Forbidden { side: Side, scope: String },

    #[error("Cannot access {side} scope '{scope}': {message}")]
    Unexpected {
        side: Side,
        scope: String,
        message: String,
    },
}

impl PermissionError {
    /// Classify an API failure seen while checking access to `scope`.
    pub fn classify(side: Side, scope: &str, err: ApiError) -> Self {
        let scope = scope.to_string();
        match err {
            ApiError::NotFound(_) => PermissionError::NotFound { side, scope },
            ApiError::Unauthorized => PermissionError::Unauthorized { side, scope },
            ApiError::Forbidden(_) => PermissionError::Forbidden { side, scope },
            other => PermissionError::Unexpected {
                side,
                scope,
                message: other.to_string(),
            },
        }
    }
}
