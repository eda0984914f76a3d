//! Shared fixtures for codec tests.

#![allow(dead_code)]

use std::sync::Arc;

use supergiant_model::{ConfigVariant, EntitySchema, FieldDecl, Model, SchemaRegistry};

/// A server record with one mirrored list and an exclusive `backend` group.
pub struct Server;

impl Model for Server {
    const ENTITY_TYPE: &'static str = "server";

    fn fields() -> Vec<FieldDecl> {
        vec![
            FieldDecl::scalar("name").required().immutable(),
            FieldDecl::scalar("ready").readonly(),
            FieldDecl::reference("owner"),
            FieldDecl::collection("disks"),
            FieldDecl::scalar("tags").store_as_json_in("tags_json"),
            FieldDecl::json_mirror("tags_json"),
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
            FieldDecl::scalar("zone"),
        ]
    }
}

pub struct BetaConfig;

impl Model for BetaConfig {
    const ENTITY_TYPE: &'static str = "beta_config";

    fn fields() -> Vec<FieldDecl> {
        vec![FieldDecl::scalar("token").required()]
    }
}

pub fn server_schema() -> Arc<EntitySchema> {
    SchemaRegistry::new().describe::<Server>().unwrap()
}

pub fn variant(schema: &EntitySchema, field: &str) -> ConfigVariant {
    schema.field(field).unwrap().variant.clone().unwrap()
}
