//! Error types for Kube records.

use supergiant_codec::CodecError;
use supergiant_model::{SchemaError, Violations};
use supergiant_policy::PrepareError;
use thiserror::Error;

/// Result type for Kube operations.
pub type KubeResult<T> = Result<T, KubeError>;

/// Errors from Kube record handling.
#[derive(Debug, Error)]
pub enum KubeError {
    /// The Kube declarations are inconsistent.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The engine refused the record.
    #[error(transparent)]
    Prepare(#[from] PrepareError),

    /// A provider config could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Conversion between the typed record and its field map failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("kube {name} not found")]
    NotFound { name: String },

    #[error("kube {name} already exists")]
    AlreadyExists { name: String },

    /// A stored record has fields that no longer decode.
    #[error("kube {name} is unreadable: {violations}")]
    Unreadable { name: String, violations: Violations },

    /// A record reached the store without a name.
    #[error("kube record has no name")]
    MissingName,
}

impl KubeError {
    /// Field violations behind a rejected write, if any.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            Self::Prepare(err) => err.violations(),
            Self::Unreadable { violations, .. } => Some(violations),
            _ => None,
        }
    }
}
