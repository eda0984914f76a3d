//! The prepare facade: describe, apply policy, validate, split for storage.

use std::collections::HashSet;
use std::sync::Arc;

use supergiant_codec::{ConfigCodec, Loaded, StoredEntity};
use supergiant_model::{
    Entity, EntitySchema, Model, SchemaRegistry, SchemaResult, Violations, validate,
    validate_required,
};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{PrepareError, PrepareResult};
use crate::evaluator::{Evaluation, Evaluator};

/// An entity that passed policy and validation, with its persisted form.
///
/// Only the engine constructs these, so anything holding a `Prepared`
/// has been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    pub entity: Entity,
    pub stored: StoredEntity,
}

/// Entry point for preparing entities for persistence.
#[derive(Debug)]
pub struct Engine {
    registry: Arc<SchemaRegistry>,
    codec: ConfigCodec,
    config: EngineConfig,
}

impl Engine {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    pub fn with_config(registry: Arc<SchemaRegistry>, config: EngineConfig) -> Self {
        Self {
            registry,
            codec: ConfigCodec::new(config.codec.clone()),
            config,
        }
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn codec(&self) -> &ConfigCodec {
        &self.codec
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Describes `T` up front, so declaration errors surface at startup.
    pub fn register<T: Model>(&self) -> SchemaResult<Arc<EntitySchema>> {
        self.registry.describe::<T>()
    }

    pub fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.codec, self.config.engine.unknown_fields)
    }

    /// Checks a new entity of type `T`.
    pub fn prepare_for_create<T: Model>(&self, input: &Entity) -> PrepareResult<Prepared> {
        let schema = self.registry.describe::<T>()?;
        check_type(&schema, &input.entity_type)?;
        let evaluation = self.evaluator().create(&schema, input);
        self.finish(&schema, evaluation, "create")
    }

    /// Checks `candidate` as a change to the stored snapshot `old`.
    pub fn prepare_for_update<T: Model>(
        &self,
        old: &Entity,
        candidate: &Entity,
    ) -> PrepareResult<Prepared> {
        let schema = self.registry.describe::<T>()?;
        check_type(&schema, &old.entity_type)?;
        check_type(&schema, &candidate.entity_type)?;
        let evaluation = self.evaluator().update(&schema, old, candidate);
        self.finish(&schema, evaluation, "update")
    }

    /// Rebuilds an entity of type `T` from storage.
    ///
    /// Fields that fail to decode are reported in [`Loaded::errors`]
    /// rather than failing the whole read.
    pub fn prepare_for_read<T: Model>(&self, stored: &StoredEntity) -> PrepareResult<Loaded> {
        let schema = self.registry.describe::<T>()?;
        check_type(&schema, &stored.entity_type)?;
        let loaded = self.codec.from_stored(&schema, stored);
        debug!(
            entity_type = %schema.entity_type,
            operation = "read",
            violations = loaded.errors.len(),
            "Prepared entity"
        );
        Ok(loaded)
    }

    fn finish(
        &self,
        schema: &EntitySchema,
        evaluation: Evaluation,
        operation: &'static str,
    ) -> PrepareResult<Prepared> {
        let has_policy_violations = evaluation.has_policy_violations();
        let Evaluation {
            entity,
            mut violations,
        } = evaluation;

        // Required and format rules only matter for an entity policy would
        // accept. On update this is the only required check of the merged
        // entity.
        if !has_policy_violations {
            let mut reported: HashSet<String> =
                violations.iter().map(|v| v.field().to_string()).collect();
            for violation in validate_required(schema, &entity) {
                if reported.insert(violation.field().to_string()) {
                    violations.push(violation);
                }
            }
            violations.extend(
                validate(schema, &entity)
                    .into_iter()
                    .filter(|v| !reported.contains(v.field())),
            );
        }

        let stored = if violations.is_empty() {
            match self.codec.to_stored(schema, &entity) {
                Ok(stored) => Some(stored),
                Err(errors) => {
                    violations.extend(errors);
                    None
                }
            }
        } else {
            None
        };

        debug!(
            entity_type = %schema.entity_type,
            operation,
            violations = violations.len(),
            "Prepared entity"
        );

        match stored {
            Some(stored) => Ok(Prepared { entity, stored }),
            None => Err(PrepareError::Rejected(Violations::from(violations))),
        }
    }
}

fn check_type(schema: &EntitySchema, found: &str) -> PrepareResult<()> {
    if found.is_empty() || found == schema.entity_type {
        return Ok(());
    }
    Err(PrepareError::EntityTypeMismatch {
        expected: schema.entity_type.clone(),
        found: found.to_string(),
    })
}

