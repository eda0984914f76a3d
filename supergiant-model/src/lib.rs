//! Entity model for Supergiant records.
//!
//! Defines the types every other Supergiant crate builds on:
//! - [`Entity`]: a record as a map of field name to JSON value
//! - [`Model`] / [`FieldDecl`]: how an entity type declares its fields and
//!   their policies (immutable, readonly, defaults, format rules, JSON
//!   mirrors, config variants)
//! - [`SchemaRegistry`]: checks declarations once per type and caches the
//!   resulting [`EntitySchema`]
//! - [`validate`]: structural validation of field values
//! - [`Violation`]: the recoverable, field-level failure taxonomy

mod entity;
mod error;
mod registry;
mod schema;
mod validate;
mod violation;

pub use entity::{Entity, is_absent, is_blank};
pub use error::{SchemaError, SchemaResult};
pub use registry::SchemaRegistry;
pub use schema::{
    ConfigGroup, ConfigVariant, EntitySchema, FieldDecl, FieldDescriptor, FieldKind,
    Model, Mutability, Pattern, Rule,
};
pub use validate::{
    check_rule, missing_required, validate, validate_object, validate_required,
};
pub use violation::{PolicyReason, ValidationReason, Violation, Violations, field_path};
