//! Property-based tests for mutation policy.
//!
//! - Create never carries readonly values into the prepared entity
//! - Blank or missing defaulted fields always end up with the default
//! - An empty update is the identity on any accepted entity
//! - A changed immutable field is always refused and keeps its old value

mod common;

use common::{Machine, engine, machine};
use proptest::prelude::*;
use serde_json::json;
use supergiant_model::{Entity, PolicyReason, Violation};

fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9]{0,9}").unwrap()
}

fn size_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["small", "medium", "large"]).prop_map(String::from)
}

fn replicas_strategy() -> impl Strategy<Value = Option<u8>> {
    prop::option::of(1u8..=10)
}

proptest! {
    #[test]
    fn create_never_keeps_readonly_values(
        name in name_strategy(),
        status in "[a-z]{0,8}",
        id in "[a-z0-9-]{0,8}",
    ) {
        let engine = engine();
        let schema = engine.register::<Machine>().unwrap();
        let input = machine(json!({"name": name, "size": "s", "status": status, "id": id}));
        let evaluation = engine.evaluator().create(&schema, &input);

        prop_assert!(evaluation.entity.get("status").is_none());
        prop_assert!(evaluation.entity.get("id").is_none());
        prop_assert_eq!(evaluation.has_policy_violations(), !status.is_empty() || !id.is_empty());
    }

    #[test]
    fn defaults_fill_blank_fields(name in name_strategy(), replicas in prop::option::of(0u8..=1)) {
        let mut input = machine(json!({"name": name, "size": "s"}));
        if let Some(replicas) = replicas {
            input.set("replicas", replicas);
        }
        let prepared = engine().prepare_for_create::<Machine>(&input).unwrap();
        prop_assert_eq!(prepared.entity.get_number("replicas"), Some(1.0));
        prop_assert_eq!(prepared.entity.get_str("image"), Some("ubuntu"));
    }

    #[test]
    fn empty_update_is_identity(
        name in name_strategy(),
        size in size_strategy(),
        replicas in replicas_strategy(),
    ) {
        let engine = engine();
        let mut input = machine(json!({"name": name, "size": size}));
        if let Some(replicas) = replicas {
            input.set("replicas", replicas);
        }
        let created = engine.prepare_for_create::<Machine>(&input).unwrap();
        let updated = engine
            .prepare_for_update::<Machine>(&created.entity, &Entity::new("machine"))
            .unwrap();
        prop_assert_eq!(updated.entity, created.entity);
        prop_assert_eq!(updated.stored, created.stored);
    }

    #[test]
    fn changed_immutable_field_is_always_refused(old in name_strategy(), new in name_strategy()) {
        prop_assume!(old != new);
        let engine = engine();
        let schema = engine.register::<Machine>().unwrap();
        let before = machine(json!({"name": old, "size": "s", "image": "ubuntu"}));
        let evaluation = engine
            .evaluator()
            .update(&schema, &before, &machine(json!({"name": new})));

        prop_assert_eq!(
            evaluation.violations,
            vec![Violation::policy("name", PolicyReason::Immutable)]
        );
        prop_assert_eq!(evaluation.entity.get_str("name"), Some(old.as_str()));
    }
}
