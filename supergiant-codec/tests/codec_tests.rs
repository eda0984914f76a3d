mod common;

use common::{server_schema, variant};
use pretty_assertions::assert_eq;
use serde_json::json;
use supergiant_codec::{CodecConfig, CodecError, ConfigCodec, Selection, select, variant_names};
use supergiant_model::{ValidationReason, Violation};

// ── Plain blobs ──────────────────────────────────────────────────

#[test]
fn encode_decode_roundtrip() {
    let codec = ConfigCodec::default();
    let value = json!(["m4.large", "m4.xlarge"]);
    let blob = codec.encode(&value).unwrap();
    assert_eq!(codec.decode(&blob).unwrap(), value);
}

#[test]
fn decode_rejects_malformed_json() {
    let codec = ConfigCodec::default();
    let err = codec.decode(b"{\"region\": ").unwrap_err();
    assert!(matches!(err, CodecError::Malformed(_)));
    assert!(err.to_string().starts_with("malformed blob"));
}

#[test]
fn size_limit_applies_both_ways() {
    let codec = ConfigCodec::new(CodecConfig { max_blob_bytes: 8 });
    let err = codec.encode(&json!("0123456789")).unwrap_err();
    assert!(matches!(err, CodecError::TooLarge { size: 12, limit: 8 }));

    let err = codec.decode(b"\"0123456789\"").unwrap_err();
    assert!(matches!(err, CodecError::TooLarge { .. }));
}

#[test]
fn default_config_limit() {
    let codec = ConfigCodec::default();
    assert_eq!(codec.config().max_blob_bytes, 64 * 1024);
}

// ── Config variants ──────────────────────────────────────────────

#[test]
fn encode_variant_requires_object() {
    let codec = ConfigCodec::default();
    let err = codec.encode_variant(&json!(["us-1"])).unwrap_err();
    assert!(matches!(err, CodecError::NotAnObject));
}

#[test]
fn decode_variant_returns_fields() {
    let schema = server_schema();
    let alpha = variant(&schema, "alpha_config");
    let codec = ConfigCodec::default();

    let blob = codec
        .encode_variant(&json!({"region": "us-1", "zone": "b"}))
        .unwrap();
    let data = codec.decode_variant(&blob, &alpha).unwrap();
    assert_eq!(data.get("region"), Some(&json!("us-1")));
    assert_eq!(data.get("zone"), Some(&json!("b")));
}

#[test]
fn decode_variant_rejects_non_object() {
    let schema = server_schema();
    let alpha = variant(&schema, "alpha_config");
    let err = ConfigCodec::default().decode_variant(b"[1,2]", &alpha).unwrap_err();
    assert!(matches!(err, CodecError::NotAnObject));
}

#[test]
fn decode_variant_checks_required_and_rules() {
    let schema = server_schema();
    let alpha = variant(&schema, "alpha_config");
    let beta = variant(&schema, "beta_config");
    let codec = ConfigCodec::default();

    let err = codec.decode_variant(br#"{"zone": "b"}"#, &alpha).unwrap_err();
    match err {
        CodecError::InvalidVariant { variant, violations } => {
            assert_eq!(variant, "alpha");
            assert_eq!(
                violations.into_vec(),
                vec![Violation::validation("region", ValidationReason::Required)]
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = codec.decode_variant(br#"{"region": "nowhere"}"#, &alpha).unwrap_err();
    assert!(matches!(err, CodecError::InvalidVariant { .. }));

    // An alpha blob decoded as beta lacks beta's required token.
    let err = codec.decode_variant(br#"{"region": "us-1"}"#, &beta).unwrap_err();
    assert!(err.to_string().contains("invalid beta config"));
}

// ── Selection ────────────────────────────────────────────────────

#[test]
fn select_finds_the_populated_variant() {
    let schema = server_schema();
    let groups = schema.config_groups();
    let backend = &groups[0];

    let data = json!({"alpha_config": {"region": "us-1"}});
    let selection = select(backend, data.as_object().unwrap());
    assert_eq!(selection.variant(), Some("alpha"));
    assert_eq!(selection.member().unwrap().name, "alpha_config");
}

#[test]
fn select_ignores_blank_variants() {
    let schema = server_schema();
    let groups = schema.config_groups();

    let data = json!({"alpha_config": {}, "beta_config": null});
    let selection = select(&groups[0], data.as_object().unwrap());
    assert_eq!(selection, Selection::Empty);
    assert_eq!(selection.variant(), None);
}

#[test]
fn select_reports_conflicts() {
    let schema = server_schema();
    let groups = schema.config_groups();

    let data = json!({"alpha_config": {"region": "us-1"}, "beta_config": {"token": "t"}});
    match select(&groups[0], data.as_object().unwrap()) {
        Selection::Conflict(members) => {
            assert_eq!(variant_names(&members), vec!["alpha", "beta"]);
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn conflicting_variants_display() {
    let err = CodecError::ConflictingVariants {
        group: "provider".into(),
        variants: vec!["aws".into(), "digitalocean".into()],
    };
    assert_eq!(
        err.to_string(),
        "config group provider has more than one variant selected: aws, digitalocean"
    );
}
