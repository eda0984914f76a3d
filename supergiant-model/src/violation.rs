//! Field-level failures reported by the engine.
//!
//! Unlike [`SchemaError`](crate::SchemaError), these are recoverable: they are
//! collected across every field of a call and handed back together so the
//! caller can present a complete correction list.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a write was refused by mutation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum PolicyReason {
    #[error("field is readonly")]
    Readonly,
    #[error("field is immutable")]
    Immutable,
    #[error("more than one config variant selected")]
    ConflictingVariants,
    #[error("field is not declared by the entity type")]
    UnknownField,
}

/// Why a value failed a required or format check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationReason {
    #[error("value is required")]
    Required,
    #[error("value must not be empty")]
    Empty,
    #[error("value does not match {pattern}")]
    PatternMismatch { pattern: String },
    #[error("length {actual} is below minimum {min}")]
    TooShort { min: usize, actual: usize },
    #[error("length {actual} exceeds maximum {max}")]
    TooLong { max: usize, actual: usize },
    #[error("{actual} items, at least {min} required")]
    TooFewItems { min: usize, actual: usize },
    #[error("{actual} is below minimum {min}")]
    BelowMinimum { min: f64, actual: f64 },
    #[error("{actual} exceeds maximum {max}")]
    AboveMaximum { max: f64, actual: f64 },
    #[error("expected a {expected}")]
    WrongType { expected: String },
}

/// One field-level failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("policy violation on {field}: {reason}")]
    Policy { field: String, reason: PolicyReason },

    #[error("validation error on {field}: {reason}")]
    Validation {
        field: String,
        reason: ValidationReason,
    },

    #[error("codec error on {field}: {message}")]
    Codec { field: String, message: String },
}

impl Violation {
    pub fn policy(field: impl Into<String>, reason: PolicyReason) -> Self {
        Self::Policy {
            field: field.into(),
            reason,
        }
    }

    pub fn validation(field: impl Into<String>, reason: ValidationReason) -> Self {
        Self::Validation {
            field: field.into(),
            reason,
        }
    }

    pub fn codec(field: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Codec {
            field: field.into(),
            message: message.to_string(),
        }
    }

    /// Dotted path of the offending field.
    pub fn field(&self) -> &str {
        match self {
            Self::Policy { field, .. } | Self::Validation { field, .. } | Self::Codec { field, .. } => {
                field
            }
        }
    }

    pub fn is_policy(&self) -> bool {
        matches!(self, Self::Policy { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_codec(&self) -> bool {
        matches!(self, Self::Codec { .. })
    }
}

/// Every violation found by one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Violations(pub Vec<Violation>);

impl Violations {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.0.iter()
    }

    /// Violations reported against `field`.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.0.iter().filter(move |v| v.field() == field)
    }

    pub fn into_vec(self) -> Vec<Violation> {
        self.0
    }
}

impl From<Vec<Violation>> for Violations {
    fn from(violations: Vec<Violation>) -> Self {
        Self(violations)
    }
}

impl IntoIterator for Violations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violation(s)", self.0.len())?;
        for (i, v) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{v}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

/// Joins a nested field name onto its parent's path.
pub fn field_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}
