//! Error types for the policy engine.

use std::path::PathBuf;

use supergiant_model::{SchemaError, Violations};
use thiserror::Error;

/// Result type for prepare calls.
pub type PrepareResult<T> = Result<T, PrepareError>;

/// Why an entity could not be prepared for persistence.
#[derive(Debug, Error)]
pub enum PrepareError {
    /// The entity type's declarations are inconsistent. Fatal.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The entity was refused; every violation found is listed.
    #[error("entity rejected: {0}")]
    Rejected(Violations),

    /// The entity is tagged with another type's name.
    #[error("expected a {expected} entity, got {found}")]
    EntityTypeMismatch { expected: String, found: String },
}

impl PrepareError {
    /// The violations of a rejected entity, if that is what this is.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            Self::Rejected(violations) => Some(violations),
            _ => None,
        }
    }
}

/// Errors reading an engine config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
