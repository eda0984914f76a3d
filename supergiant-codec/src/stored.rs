//! The persisted form of an entity: plain columns, JSON blobs for mirrored
//! fields, and one discriminator per config group.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use supergiant_model::{
    ConfigGroup, Entity, EntitySchema, FieldDescriptor, FieldKind, PolicyReason, Violation,
    Violations,
};
use tracing::warn;

use crate::codec::ConfigCodec;
use crate::discriminator::{Selection, select};
use crate::error::CodecError;

/// An entity as the persistence layer stores it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredEntity {
    pub entity_type: String,
    /// Scalar fields, keyed by field name.
    pub columns: Map<String, Value>,
    /// Encoded blobs, keyed by mirror field name.
    #[serde(default)]
    pub blobs: BTreeMap<String, Vec<u8>>,
    /// Selected variant, keyed by config group name.
    #[serde(default)]
    pub discriminators: BTreeMap<String, String>,
}

impl StoredEntity {
    pub fn discriminator(&self, group: &str) -> Option<&str> {
        self.discriminators.get(group).map(String::as_str)
    }

    pub fn blob(&self, mirror: &str) -> Option<&[u8]> {
        self.blobs.get(mirror).map(Vec::as_slice)
    }
}

/// An entity read back from storage, with any fields that failed to decode.
///
/// A field that fails to decode is left absent; every other field is
/// returned as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub entity: Entity,
    pub errors: Vec<Violation>,
}

impl Loaded {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl ConfigCodec {
    /// Splits an entity into its persisted form.
    ///
    /// Association fields are left to the persistence layer. Only the
    /// selected variant of each config group is written.
    pub fn to_stored(
        &self,
        schema: &EntitySchema,
        entity: &Entity,
    ) -> Result<StoredEntity, Violations> {
        let mut stored = StoredEntity {
            entity_type: schema.entity_type.clone(),
            ..StoredEntity::default()
        };
        let mut errors = Vec::new();

        for group in schema.config_groups() {
            match select(&group, &entity.data) {
                Selection::Empty => {}
                Selection::One(member) => {
                    if let Some(v) = &member.variant {
                        stored
                            .discriminators
                            .insert(v.group.clone(), v.variant.clone());
                    }
                }
                Selection::Conflict(_) => {
                    errors.push(Violation::policy(group.name, PolicyReason::ConflictingVariants));
                }
            }
        }

        for field in &schema.fields {
            if field.kind.is_association() || field.kind == FieldKind::JsonMirror {
                continue;
            }
            let Some(value) = entity.data.get(&field.name).filter(|v| !v.is_null()) else {
                continue;
            };
            if field.kind == FieldKind::Config && !is_selected(field, &stored) {
                continue;
            }

            match &field.mirror {
                Some(mirror) => {
                    let encoded = if field.kind == FieldKind::Config {
                        self.encode_variant(value)
                    } else {
                        self.encode(value)
                    };
                    match encoded {
                        Ok(blob) => {
                            stored.blobs.insert(mirror.clone(), blob);
                        }
                        Err(err) => errors.push(Violation::codec(&field.name, err)),
                    }
                }
                None => {
                    stored.columns.insert(field.name.clone(), value.clone());
                }
            }
        }

        if errors.is_empty() {
            Ok(stored)
        } else {
            Err(Violations::from(errors))
        }
    }

    /// Rebuilds an entity from its persisted form.
    ///
    /// Each mirrored field is decoded on its own, so one corrupted blob
    /// never hides its siblings. For config groups only the discriminated
    /// variant is decoded; blobs of unselected variants are ignored.
    pub fn from_stored(&self, schema: &EntitySchema, stored: &StoredEntity) -> Loaded {
        let mut entity = Entity::new(schema.entity_type.clone());
        let mut errors = Vec::new();

        for field in &schema.fields {
            if matches!(
                field.kind,
                FieldKind::Reference
                    | FieldKind::Collection
                    | FieldKind::JsonMirror
                    | FieldKind::Config
            ) {
                continue;
            }
            match &field.mirror {
                None => {
                    if let Some(value) = stored.columns.get(&field.name) {
                        entity.data.insert(field.name.clone(), value.clone());
                    }
                }
                Some(mirror) => {
                    let Some(blob) = stored.blob(mirror) else {
                        continue;
                    };
                    match self.decode(blob) {
                        Ok(value) => {
                            entity.data.insert(field.name.clone(), value);
                        }
                        Err(err) => {
                            warn!(
                                entity_type = %schema.entity_type,
                                field = %field.name,
                                error = %err,
                                "Failed to decode stored field"
                            );
                            errors.push(Violation::codec(&field.name, err));
                        }
                    }
                }
            }
        }

        for group in schema.config_groups() {
            let Some(variant) = stored.discriminator(group.name) else {
                continue;
            };
            match self.load_variant(&group, variant, stored) {
                Ok((member, data)) => {
                    entity.data.insert(member.name.clone(), Value::Object(data));
                }
                Err((field, err)) => {
                    warn!(
                        entity_type = %schema.entity_type,
                        group = group.name,
                        variant,
                        error = %err,
                        "Failed to decode config variant"
                    );
                    errors.push(Violation::codec(field, err));
                }
            }
        }

        Loaded { entity, errors }
    }

    fn load_variant<'a>(
        &self,
        group: &ConfigGroup<'a>,
        variant: &str,
        stored: &StoredEntity,
    ) -> Result<(&'a FieldDescriptor, Map<String, Value>), (String, CodecError)> {
        let member = group.member(variant).ok_or_else(|| {
            let err = CodecError::UnknownVariant {
                group: group.name.into(),
                variant: variant.into(),
            };
            (group.name.to_string(), err)
        })?;
        let fail = |err| (member.name.clone(), err);

        let (Some(mirror), Some(config)) = (&member.mirror, &member.variant) else {
            return Err(fail(CodecError::MissingBlob {
                variant: variant.into(),
            }));
        };
        let blob = stored.blob(mirror).ok_or_else(|| {
            fail(CodecError::MissingBlob {
                variant: variant.into(),
            })
        })?;
        let data = self.decode_variant(blob, config).map_err(fail)?;
        Ok((member, data))
    }
}

fn is_selected(field: &FieldDescriptor, stored: &StoredEntity) -> bool {
    field
        .variant
        .as_ref()
        .is_some_and(|v| stored.discriminator(&v.group) == Some(v.variant.as_str()))
}
