//! Mutation policy for create and update.
//!
//! The evaluator decides which parts of a candidate entity may be written:
//! it drops or refuses readonly and immutable changes, fills in defaults,
//! reports required fields that are still blank, and resolves config
//! groups to at most one selected variant. Format rules are left to the
//! validator.

use serde_json::{Map, Value};
use supergiant_codec::{CodecError, ConfigCodec, Selection, select};
use supergiant_model::{
    ConfigGroup, Entity, EntitySchema, FieldDescriptor, Mutability, PolicyReason,
    ValidationReason, Violation, field_path, is_blank,
};
use tracing::debug;

use crate::config::UnknownFields;

/// The entity as it may be written, plus everything refused on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub entity: Entity,
    pub violations: Vec<Violation>,
}

impl Evaluation {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn has_policy_violations(&self) -> bool {
        self.violations.iter().any(Violation::is_policy)
    }
}

/// Applies a schema's mutation policy to candidate entities.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    codec: &'a ConfigCodec,
    unknown_fields: UnknownFields,
}

type Fields = Map<String, Value>;

impl<'a> Evaluator<'a> {
    pub fn new(codec: &'a ConfigCodec, unknown_fields: UnknownFields) -> Self {
        Self {
            codec,
            unknown_fields,
        }
    }

    /// Policy for a new entity.
    ///
    /// Readonly values are refused, blank fields with a default get the
    /// default, and required fields still blank afterwards are reported.
    pub fn create(&self, schema: &EntitySchema, input: &Entity) -> Evaluation {
        let mut violations = Vec::new();
        let data = self.create_object(schema, &input.data, "", &mut violations);
        Evaluation {
            entity: Entity {
                entity_type: schema.entity_type.clone(),
                data,
            },
            violations,
        }
    }

    /// Policy for a change to `old`.
    ///
    /// Fields absent from the candidate keep their old value. A changed
    /// readonly or immutable field is reported and keeps its old value.
    /// Defaults are never reapplied.
    pub fn update(&self, schema: &EntitySchema, old: &Entity, candidate: &Entity) -> Evaluation {
        let mut violations = Vec::new();
        let data = self.update_object(schema, &old.data, &candidate.data, "", &mut violations);
        Evaluation {
            entity: Entity {
                entity_type: schema.entity_type.clone(),
                data,
            },
            violations,
        }
    }

    fn create_object(
        &self,
        schema: &EntitySchema,
        input: &Fields,
        prefix: &str,
        out: &mut Vec<Violation>,
    ) -> Fields {
        self.check_unknown(schema, input, prefix, out);
        let mut data = Fields::new();

        for field in schema.fields.iter().filter(|f| f.variant.is_none()) {
            let path = field_path(prefix, &field.name);
            let supplied = input.get(&field.name).filter(|v| !v.is_null());

            if field.is_readonly() {
                if supplied.is_some_and(|v| !is_blank(v)) {
                    out.push(Violation::policy(path, PolicyReason::Readonly));
                }
                continue;
            }

            let mut value = supplied.cloned();
            if value.as_ref().is_none_or(is_blank)
                && let Some(default) = &field.default
            {
                value = Some(default.clone());
            }
            if field.required && value.as_ref().is_none_or(is_blank) {
                out.push(Violation::validation(path, ValidationReason::Required));
            }
            if let Some(value) = value {
                data.insert(field.name.clone(), value);
            }
        }

        for group in schema.config_groups() {
            let member = match select(&group, input) {
                Selection::Empty => continue,
                Selection::Conflict(_) => {
                    out.push(Violation::policy(
                        field_path(prefix, group.name),
                        PolicyReason::ConflictingVariants,
                    ));
                    continue;
                }
                Selection::One(member) => member,
            };
            let path = field_path(prefix, &member.name);
            if group.mutability() == Mutability::ReadOnly {
                out.push(Violation::policy(path, PolicyReason::Readonly));
                continue;
            }
            let Some(value) = input.get(&member.name) else {
                continue;
            };
            if let Some(value) = self.create_variant(member, value, &path, out) {
                data.insert(member.name.clone(), value);
            }
        }

        data
    }

    fn update_object(
        &self,
        schema: &EntitySchema,
        old: &Fields,
        candidate: &Fields,
        prefix: &str,
        out: &mut Vec<Violation>,
    ) -> Fields {
        self.check_unknown(schema, candidate, prefix, out);
        let mut data = Fields::new();

        for field in schema.fields.iter().filter(|f| f.variant.is_none()) {
            let previous = old.get(&field.name).filter(|v| !v.is_null());
            let next = match candidate.get(&field.name).filter(|v| !v.is_null()) {
                None => previous,
                Some(value) if unchanged(previous, value) => previous,
                Some(value) => match field.mutability {
                    Mutability::Mutable => Some(value),
                    Mutability::Immutable => {
                        out.push(Violation::policy(
                            field_path(prefix, &field.name),
                            PolicyReason::Immutable,
                        ));
                        previous
                    }
                    Mutability::ReadOnly => {
                        out.push(Violation::policy(
                            field_path(prefix, &field.name),
                            PolicyReason::Readonly,
                        ));
                        previous
                    }
                },
            };
            if let Some(value) = next {
                data.insert(field.name.clone(), value.clone());
            }
        }

        for group in schema.config_groups() {
            if let Some((name, value)) = self.update_group(&group, old, candidate, prefix, out) {
                data.insert(name, value);
            }
        }

        data
    }

    /// Resolves one config group on update to the member that will be
    /// written, if any.
    fn update_group(
        &self,
        group: &ConfigGroup<'_>,
        old: &Fields,
        candidate: &Fields,
        prefix: &str,
        out: &mut Vec<Violation>,
    ) -> Option<(String, Value)> {
        let previous = select(group, old)
            .member()
            .and_then(|m| old.get(&m.name).map(|v| (m, v)));
        let kept = || previous.map(|(m, v)| (m.name.clone(), v.clone()));

        let member = match select(group, candidate) {
            Selection::Empty => return kept(),
            Selection::Conflict(_) => {
                out.push(Violation::policy(
                    field_path(prefix, group.name),
                    PolicyReason::ConflictingVariants,
                ));
                return kept();
            }
            Selection::One(member) => member,
        };
        let Some(value) = candidate.get(&member.name) else {
            return kept();
        };
        let path = field_path(prefix, &member.name);

        let same_variant = previous.filter(|(m, _)| m.name == member.name);
        let next = match (same_variant, &member.variant) {
            (Some((_, old_value)), Some(variant)) => {
                let (Value::Object(old_fields), Value::Object(fields)) = (old_value, value) else {
                    out.push(Violation::codec(&path, CodecError::NotAnObject));
                    return kept();
                };
                let baseline = self.update_object(
                    &variant.schema,
                    old_fields,
                    &Fields::new(),
                    &path,
                    &mut Vec::new(),
                );
                let merged = self.update_object(&variant.schema, old_fields, fields, &path, out);
                if merged == baseline {
                    return kept();
                }
                Value::Object(merged)
            }
            _ => value.clone(),
        };

        match group.mutability() {
            Mutability::Mutable => {}
            Mutability::Immutable => {
                out.push(Violation::policy(path, PolicyReason::Immutable));
                return kept();
            }
            Mutability::ReadOnly => {
                out.push(Violation::policy(path, PolicyReason::Readonly));
                return kept();
            }
        }

        let written = if same_variant.is_some() {
            self.round_trip(next, &path, out)
        } else {
            // A newly selected variant is evaluated as a fresh value.
            self.create_variant(member, &next, &path, out)
        };
        written.map(|v| (member.name.clone(), v)).or_else(kept)
    }

    fn create_variant(
        &self,
        member: &FieldDescriptor,
        value: &Value,
        path: &str,
        out: &mut Vec<Violation>,
    ) -> Option<Value> {
        let variant = member.variant.as_ref()?;
        let Value::Object(fields) = value else {
            out.push(Violation::codec(path, CodecError::NotAnObject));
            return None;
        };
        let data = self.create_object(&variant.schema, fields, path, out);
        self.round_trip(Value::Object(data), path, out)
    }

    /// Passes a variant through the codec so values it cannot store are
    /// reported now rather than at persistence time.
    fn round_trip(&self, value: Value, path: &str, out: &mut Vec<Violation>) -> Option<Value> {
        let decoded = self
            .codec
            .encode_variant(&value)
            .and_then(|blob| self.codec.decode(&blob));
        match decoded {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                out.push(Violation::codec(path, err));
                None
            }
        }
    }

    fn check_unknown(
        &self,
        schema: &EntitySchema,
        input: &Fields,
        prefix: &str,
        out: &mut Vec<Violation>,
    ) {
        let undeclared = input
            .iter()
            .filter(|(key, value)| !value.is_null() && !schema.declares(key));
        for (key, _) in undeclared {
            let path = field_path(prefix, key);
            match self.unknown_fields {
                UnknownFields::Reject => {
                    out.push(Violation::policy(path, PolicyReason::UnknownField));
                }
                UnknownFields::Ignore => {
                    debug!(entity_type = %schema.entity_type, field = %path, "Ignoring undeclared field");
                }
            }
        }
    }
}

/// Equal values, or two blank ones, count as no change.
fn unchanged(previous: Option<&Value>, value: &Value) -> bool {
    previous == Some(value) || (is_blank(value) && previous.is_none_or(is_blank))
}
