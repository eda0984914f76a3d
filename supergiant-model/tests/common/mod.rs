//! Shared model fixtures for schema and validation tests.

#![allow(dead_code)]

use supergiant_model::{FieldDecl, Model};

/// A small entity exercising every kind of declaration.
pub struct Widget;

impl Model for Widget {
    const ENTITY_TYPE: &'static str = "widget";

    fn fields() -> Vec<FieldDecl> {
        vec![
            FieldDecl::scalar("name")
                .required()
                .immutable()
                .max_len(8)
                .pattern("[a-z]+"),
            FieldDecl::scalar("size").default_value(10).min(1.0).max(100.0),
            FieldDecl::scalar("status").readonly(),
            FieldDecl::scalar("tags")
                .min_items(1)
                .store_as_json_in("tags_json"),
            FieldDecl::json_mirror("tags_json"),
            FieldDecl::reference("owner"),
            FieldDecl::collection("parts"),
            FieldDecl::config::<AlphaConfig>("alpha_config", "backend", "alpha")
                .immutable()
                .store_as_json_in("alpha_config_json"),
            FieldDecl::json_mirror("alpha_config_json"),
            FieldDecl::config::<BetaConfig>("beta_config", "backend", "beta")
                .immutable()
                .store_as_json_in("beta_config_json"),
            FieldDecl::json_mirror("beta_config_json"),
        ]
    }
}

pub struct AlphaConfig;

impl Model for AlphaConfig {
    const ENTITY_TYPE: &'static str = "alpha_config";

    fn fields() -> Vec<FieldDecl> {
        vec![
            FieldDecl::scalar("region").required().pattern("[a-z]{2}-[0-9]"),
            FieldDecl::scalar("zone").default_value("a"),
            FieldDecl::scalar("endpoint").readonly(),
        ]
    }
}

pub struct BetaConfig;

impl Model for BetaConfig {
    const ENTITY_TYPE: &'static str = "beta_config";

    fn fields() -> Vec<FieldDecl> {
        vec![
            FieldDecl::scalar("token").required().non_empty(),
            FieldDecl::scalar("label").min_len(2),
        ]
    }
}
