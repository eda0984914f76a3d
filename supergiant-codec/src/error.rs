//! Error types for the blob codec.

use supergiant_model::Violations;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur encoding or decoding a stored blob.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The blob is not valid JSON.
    #[error("malformed blob: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A config blob must hold a JSON object.
    #[error("config blob is not a JSON object")]
    NotAnObject,

    /// The blob exceeds the configured size limit.
    #[error("blob of {size} bytes exceeds limit of {limit}")]
    TooLarge { size: usize, limit: usize },

    /// The discriminator names a variant the group does not declare.
    #[error("unknown variant {variant} for config group {group}")]
    UnknownVariant { group: String, variant: String },

    /// A discriminator is set but its variant's blob is missing.
    #[error("no blob stored for selected variant {variant}")]
    MissingBlob { variant: String },

    /// The decoded variant fails its own schema.
    #[error("invalid {variant} config: {violations}")]
    InvalidVariant {
        variant: String,
        violations: Violations,
    },

    /// More than one variant of a group is populated.
    #[error("config group {group} has more than one variant selected: {}", variants.join(", "))]
    ConflictingVariants { group: String, variants: Vec<String> },
}
