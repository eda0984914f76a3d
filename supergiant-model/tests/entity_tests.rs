use supergiant_model::{Entity, is_absent, is_blank};
use serde_json::json;

fn make_entity(data: serde_json::Value) -> Entity {
    Entity::from_value("kube", data).unwrap()
}

// ── Construction & fields ────────────────────────────────────────

#[test]
fn new_entity_is_empty() {
    let e = Entity::new("kube");
    assert_eq!(e.entity_type, "kube");
    assert!(e.data.is_empty());
}

#[test]
fn from_value_rejects_non_objects() {
    assert!(Entity::from_value("kube", json!([1, 2])).is_none());
    assert!(Entity::from_value("kube", json!("name")).is_none());
    assert!(Entity::from_value("kube", json!(null)).is_none());
}

#[test]
fn with_sets_fields_in_order() {
    let e = Entity::new("kube").with("name", "prod1").with("ready", true);
    assert_eq!(e.get_str("name"), Some("prod1"));
    assert_eq!(e.get_bool("ready"), Some(true));
}

#[test]
fn set_overwrites_and_remove_returns_value() {
    let mut e = make_entity(json!({"name": "a"}));
    e.set("name", "b");
    assert_eq!(e.get_str("name"), Some("b"));
    assert_eq!(e.remove("name"), Some(json!("b")));
    assert!(e.get("name").is_none());
}

// ── Typed getters ────────────────────────────────────────────────

#[test]
fn get_str_returns_none_for_non_string() {
    let e = make_entity(json!({"count": 5}));
    assert_eq!(e.get_str("count"), None);
}

#[test]
fn get_number_returns_numeric_field() {
    let e = make_entity(json!({"size": 100, "ratio": 0.5}));
    assert_eq!(e.get_number("size"), Some(100.0));
    assert_eq!(e.get_number("ratio"), Some(0.5));
}

#[test]
fn getters_return_none_for_missing_field() {
    let e = make_entity(json!({}));
    assert_eq!(e.get_str("missing"), None);
    assert_eq!(e.get_bool("missing"), None);
    assert_eq!(e.get_number("missing"), None);
}

// ── Presence ─────────────────────────────────────────────────────

#[test]
fn absent_means_missing_or_null() {
    let e = make_entity(json!({"a": null, "b": "", "c": 0}));
    assert!(e.is_absent("a"));
    assert!(e.is_absent("missing"));
    assert!(!e.is_absent("b"));
    assert!(!e.is_absent("c"));
    assert!(is_absent(None));
    assert!(!is_absent(Some(&json!(false))));
}

#[test]
fn blank_covers_zero_values() {
    for v in [json!(null), json!(""), json!(0), json!(0.0), json!(false), json!([]), json!({})] {
        assert!(is_blank(&v), "{v} should be blank");
    }
    for v in [json!("x"), json!(1), json!(-2.5), json!(true), json!(["a"]), json!({"k": 1})] {
        assert!(!is_blank(&v), "{v} should not be blank");
    }
}

#[test]
fn entity_is_blank_for_missing_field() {
    let e = make_entity(json!({"name": "prod1"}));
    assert!(e.is_blank("master_node_size"));
    assert!(!e.is_blank("name"));
}

// ── Serialization ────────────────────────────────────────────────

#[test]
fn serde_roundtrip() {
    let original = make_entity(json!({
        "name": "prod1",
        "node_sizes": ["m4.large"],
        "aws_config": {"region": "us-east-1"}
    }));

    let json_str = serde_json::to_string(&original).unwrap();
    let parsed: Entity = serde_json::from_str(&json_str).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn into_value_yields_object() {
    let e = make_entity(json!({"name": "prod1"}));
    assert_eq!(e.into_value(), json!({"name": "prod1"}));
}
