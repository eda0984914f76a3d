//! Error types for schema registration.

use thiserror::Error;

use crate::violation::ValidationReason;

/// Result type for schema registration.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Invalid or conflicting field declarations.
///
/// These are programming errors in a model definition and are expected to
/// surface once, at startup, when the type is first described.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// A field declared both immutable and readonly.
    #[error("{entity_type}.{field}: declared both immutable and readonly")]
    ConflictingMutability { entity_type: String, field: String },

    /// A readonly field can never be supplied, so it cannot be required.
    #[error("{entity_type}.{field}: readonly fields cannot be required")]
    RequiredReadonly { entity_type: String, field: String },

    /// The same field name declared twice.
    #[error("{entity_type}.{field}: declared more than once")]
    DuplicateField { entity_type: String, field: String },

    /// Two fields store into the same mirror.
    #[error("{entity_type}: fields {first} and {second} both store into {mirror}")]
    DuplicateMirror {
        entity_type: String,
        mirror: String,
        first: String,
        second: String,
    },

    /// A `store_as_json_in` target that is not a declared JSON mirror.
    #[error("{entity_type}.{field}: {mirror} is not a declared json mirror field")]
    UnknownMirror {
        entity_type: String,
        field: String,
        mirror: String,
    },

    /// A pattern that does not compile.
    #[error("{entity_type}.{field}: invalid pattern: {source}")]
    InvalidPattern {
        entity_type: String,
        field: String,
        source: regex::Error,
    },

    /// A default value that its own field's rules reject.
    #[error("{entity_type}.{field}: default {value} is invalid: {reason}")]
    InvalidDefault {
        entity_type: String,
        field: String,
        value: String,
        reason: ValidationReason,
    },

    /// Members of one config group declared with different policies.
    #[error("{entity_type}: config group {group} mixes mutability policies")]
    InconsistentGroup { entity_type: String, group: String },

    /// Config variants are always persisted as blobs.
    #[error("{entity_type}.{field}: config fields must declare store_as_json_in")]
    UnmirroredConfig { entity_type: String, field: String },

    /// Two members of one config group claim the same variant.
    #[error("{entity_type}: config group {group} declares variant {variant} twice")]
    DuplicateVariant {
        entity_type: String,
        group: String,
        variant: String,
    },
}
