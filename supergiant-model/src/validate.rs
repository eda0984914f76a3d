//! Structural validation of field values.
//!
//! Pure and total: every field is inspected and every failure reported.
//! Mutation policy is the evaluator's job.

use serde_json::{Map, Value};

use crate::entity::{Entity, is_absent, is_blank};
use crate::schema::{EntitySchema, Rule};
use crate::violation::{ValidationReason, Violation, field_path};

/// Checks every field's format rules, recursing into config variants.
pub fn validate(schema: &EntitySchema, entity: &Entity) -> Vec<Violation> {
    validate_object(schema, &entity.data, "")
}

/// Format rules for a raw JSON object, with field paths under `prefix`.
pub fn validate_object(
    schema: &EntitySchema,
    data: &Map<String, Value>,
    prefix: &str,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    collect(schema, data, prefix, &mut violations);
    violations
}

/// Required fields of `schema` that are blank in `data`.
pub fn missing_required(
    schema: &EntitySchema,
    data: &Map<String, Value>,
    prefix: &str,
) -> Vec<Violation> {
    schema
        .fields
        .iter()
        .filter(|f| f.required && data.get(&f.name).is_none_or(is_blank))
        .map(|f| Violation::validation(field_path(prefix, &f.name), ValidationReason::Required))
        .collect()
}

/// Required fields that are blank anywhere in `entity`, including inside
/// populated config variants.
pub fn validate_required(schema: &EntitySchema, entity: &Entity) -> Vec<Violation> {
    let mut violations = Vec::new();
    collect_required(schema, &entity.data, "", &mut violations);
    violations
}

fn collect_required(
    schema: &EntitySchema,
    data: &Map<String, Value>,
    prefix: &str,
    out: &mut Vec<Violation>,
) {
    out.extend(missing_required(schema, data, prefix));
    for field in &schema.fields {
        if let (Some(variant), Some(Value::Object(inner))) = (&field.variant, data.get(&field.name))
        {
            collect_required(&variant.schema, inner, &field_path(prefix, &field.name), out);
        }
    }
}

fn collect(
    schema: &EntitySchema,
    data: &Map<String, Value>,
    prefix: &str,
    out: &mut Vec<Violation>,
) {
    for field in &schema.fields {
        let path = field_path(prefix, &field.name);
        let value = data.get(&field.name);

        for rule in &field.rules {
            let checked = match value {
                Some(v) if !v.is_null() => check_rule(rule, v),
                _ if matches!(rule, Rule::MinItems(_)) => check_rule(rule, &Value::Null),
                _ => Ok(()),
            };
            if let Err(reason) = checked {
                out.push(Violation::validation(path.clone(), reason));
            }
        }

        if let (Some(variant), Some(Value::Object(inner))) = (&field.variant, value) {
            collect(&variant.schema, inner, &path, out);
        }
    }
}

/// Checks one rule against one value. `null` counts as an empty collection.
pub fn check_rule(rule: &Rule, value: &Value) -> Result<(), ValidationReason> {
    match rule {
        Rule::NonEmpty => {
            if is_blank(value) {
                return Err(ValidationReason::Empty);
            }
        }
        Rule::Pattern(pattern) => {
            let s = expect_str(value)?;
            if !pattern.is_match(s) {
                return Err(ValidationReason::PatternMismatch {
                    pattern: pattern.as_str().to_string(),
                });
            }
        }
        Rule::MinLen(min) => {
            let actual = expect_str(value)?.chars().count();
            if actual < *min {
                return Err(ValidationReason::TooShort { min: *min, actual });
            }
        }
        Rule::MaxLen(max) => {
            let actual = expect_str(value)?.chars().count();
            if actual > *max {
                return Err(ValidationReason::TooLong { max: *max, actual });
            }
        }
        Rule::MinItems(min) => {
            let actual = match value {
                v if is_absent(Some(v)) => 0,
                Value::Array(items) => items.len(),
                _ => return Err(wrong_type("array")),
            };
            if actual < *min {
                return Err(ValidationReason::TooFewItems { min: *min, actual });
            }
        }
        Rule::Min(min) => {
            let actual = value.as_f64().ok_or_else(|| wrong_type("number"))?;
            if actual < *min {
                return Err(ValidationReason::BelowMinimum { min: *min, actual });
            }
        }
        Rule::Max(max) => {
            let actual = value.as_f64().ok_or_else(|| wrong_type("number"))?;
            if actual > *max {
                return Err(ValidationReason::AboveMaximum { max: *max, actual });
            }
        }
    }
    Ok(())
}

fn expect_str(value: &Value) -> Result<&str, ValidationReason> {
    value.as_str().ok_or_else(|| wrong_type("string"))
}

fn wrong_type(expected: &str) -> ValidationReason {
    ValidationReason::WrongType {
        expected: expected.into(),
    }
}
