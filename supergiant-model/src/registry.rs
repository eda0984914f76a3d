//! Process-wide cache of checked entity schemas.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use crate::error::{SchemaError, SchemaResult};
use crate::schema::{
    ConfigVariant, EntitySchema, FieldDecl, FieldDescriptor, FieldKind, Model, Mutability,
    Pattern, Rule,
};
use crate::validate::check_rule;

/// Describes entity types and memoizes the result per type.
///
/// Construct one at startup and share it (usually behind an `Arc`). Schemas
/// are computed on first use and never invalidated. Concurrent first
/// describers may each build the schema, but only one copy is published and
/// every caller gets that copy.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<TypeId, Arc<EntitySchema>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the checked schema for `T`, building it on first call.
    ///
    /// Config variant types referenced by `T` are described as well. On
    /// error nothing is cached for `T`.
    pub fn describe<T: Model>(&self) -> SchemaResult<Arc<EntitySchema>> {
        let key = TypeId::of::<T>();
        if let Some(schema) = self.read().get(&key) {
            return Ok(Arc::clone(schema));
        }

        debug!(entity_type = T::ENTITY_TYPE, "Building entity schema");
        let built = Arc::new(build_schema(T::ENTITY_TYPE, T::fields(), self)?);

        let mut schemas = self.write();
        let published = schemas.entry(key).or_insert_with(|| {
            info!(
                entity_type = T::ENTITY_TYPE,
                fields = built.fields.len(),
                "Registered entity schema"
            );
            built
        });
        Ok(Arc::clone(published))
    }

    /// Looks up an already described schema by entity type name.
    pub fn get(&self, entity_type: &str) -> Option<Arc<EntitySchema>> {
        self.read()
            .values()
            .find(|s| s.entity_type == entity_type)
            .cloned()
    }

    pub fn contains<T: Model>(&self) -> bool {
        self.read().contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<TypeId, Arc<EntitySchema>>> {
        self.schemas.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<TypeId, Arc<EntitySchema>>> {
        self.schemas.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn build_schema(
    entity_type: &str,
    decls: Vec<FieldDecl>,
    registry: &SchemaRegistry,
) -> SchemaResult<EntitySchema> {
    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(decls.len());

    for decl in decls {
        let field = decl.name.clone();
        if !seen.insert(field.clone()) {
            return Err(SchemaError::DuplicateField {
                entity_type: entity_type.into(),
                field,
            });
        }
        fields.push(describe_field(entity_type, decl, registry)?);
    }

    check_mirrors(entity_type, &fields)?;
    let schema = EntitySchema {
        entity_type: entity_type.into(),
        fields,
    };
    check_groups(&schema)?;
    Ok(schema)
}

fn describe_field(
    entity_type: &str,
    decl: FieldDecl,
    registry: &SchemaRegistry,
) -> SchemaResult<FieldDescriptor> {
    // Mirrors are internal storage, never written by clients.
    let readonly = decl.readonly || decl.kind == FieldKind::JsonMirror;
    let mutability = match (decl.immutable, readonly) {
        (true, true) => {
            return Err(SchemaError::ConflictingMutability {
                entity_type: entity_type.into(),
                field: decl.name,
            });
        }
        (true, false) => Mutability::Immutable,
        (false, true) => Mutability::ReadOnly,
        (false, false) => Mutability::Mutable,
    };
    if readonly && decl.required {
        return Err(SchemaError::RequiredReadonly {
            entity_type: entity_type.into(),
            field: decl.name,
        });
    }

    let mut rules = decl.rules;
    for source in &decl.patterns {
        let pattern = Pattern::new(source).map_err(|source| SchemaError::InvalidPattern {
            entity_type: entity_type.into(),
            field: decl.name.clone(),
            source,
        })?;
        rules.push(Rule::Pattern(pattern));
    }

    if let Some(default) = &decl.default {
        for rule in &rules {
            if let Err(reason) = check_rule(rule, default) {
                return Err(SchemaError::InvalidDefault {
                    entity_type: entity_type.into(),
                    field: decl.name,
                    value: default.to_string(),
                    reason,
                });
            }
        }
    }

    if decl.kind == FieldKind::Config && decl.mirror.is_none() {
        return Err(SchemaError::UnmirroredConfig {
            entity_type: entity_type.into(),
            field: decl.name,
        });
    }

    let variant = match decl.variant {
        Some(v) => Some(ConfigVariant {
            schema: (v.describe)(registry)?,
            group: v.group,
            variant: v.variant,
        }),
        None => None,
    };

    Ok(FieldDescriptor {
        name: decl.name,
        kind: decl.kind,
        mutability,
        required: decl.required,
        default: decl.default,
        rules,
        mirror: decl.mirror,
        variant,
    })
}

fn check_mirrors(entity_type: &str, fields: &[FieldDescriptor]) -> SchemaResult<()> {
    let mut targets: HashMap<&str, &str> = HashMap::new();
    for field in fields {
        let Some(mirror) = field.mirror.as_deref() else {
            continue;
        };
        let is_mirror = fields
            .iter()
            .any(|f| f.name == mirror && f.kind == FieldKind::JsonMirror);
        if !is_mirror {
            return Err(SchemaError::UnknownMirror {
                entity_type: entity_type.into(),
                field: field.name.clone(),
                mirror: mirror.into(),
            });
        }
        if let Some(first) = targets.insert(mirror, field.name.as_str()) {
            return Err(SchemaError::DuplicateMirror {
                entity_type: entity_type.into(),
                mirror: mirror.into(),
                first: first.into(),
                second: field.name.clone(),
            });
        }
    }
    Ok(())
}

fn check_groups(schema: &EntitySchema) -> SchemaResult<()> {
    for group in schema.config_groups() {
        let policy = group.mutability();
        if group.members.iter().any(|m| m.mutability != policy) {
            return Err(SchemaError::InconsistentGroup {
                entity_type: schema.entity_type.clone(),
                group: group.name.into(),
            });
        }
        let mut variants = HashSet::new();
        for member in &group.members {
            if let Some(v) = &member.variant {
                if !variants.insert(v.variant.as_str()) {
                    return Err(SchemaError::DuplicateVariant {
                        entity_type: schema.entity_type.clone(),
                        group: group.name.into(),
                        variant: v.variant.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}
