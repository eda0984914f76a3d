//! Shared fixtures for policy tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::Value;
use supergiant_model::{Entity, FieldDecl, Model, SchemaRegistry};
use supergiant_policy::{Engine, EngineConfig};

/// A machine record with an immutable, exclusive `backend` group.
pub struct Machine;

impl Model for Machine {
    const ENTITY_TYPE: &'static str = "machine";

    fn fields() -> Vec<FieldDecl> {
        vec![
            FieldDecl::scalar("id").readonly(),
            FieldDecl::scalar("name")
                .required()
                .immutable()
                .max_len(10)
                .pattern("[a-z][a-z0-9]*"),
            FieldDecl::scalar("size").required(),
            FieldDecl::scalar("image")
                .required()
                .immutable()
                .default_value("ubuntu"),
            FieldDecl::scalar("replicas")
                .default_value(1)
                .min(1.0)
                .max(10.0),
            FieldDecl::scalar("status").readonly(),
            FieldDecl::scalar("labels").store_as_json_in("labels_json"),
            FieldDecl::json_mirror("labels_json"),
            FieldDecl::reference("owner"),
            FieldDecl::collection("volumes"),
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
        vec![FieldDecl::scalar("token").required()]
    }
}

/// A pipeline whose `sink` group may be switched after creation.
pub struct Pipeline;

impl Model for Pipeline {
    const ENTITY_TYPE: &'static str = "pipeline";

    fn fields() -> Vec<FieldDecl> {
        vec![
            FieldDecl::scalar("name").required().immutable(),
            FieldDecl::config::<FileSink>("file_sink", "sink", "file")
                .store_as_json_in("file_sink_json"),
            FieldDecl::json_mirror("file_sink_json"),
            FieldDecl::config::<HttpSink>("http_sink", "sink", "http")
                .store_as_json_in("http_sink_json"),
            FieldDecl::json_mirror("http_sink_json"),
        ]
    }
}

pub struct FileSink;

impl Model for FileSink {
    const ENTITY_TYPE: &'static str = "file_sink";

    fn fields() -> Vec<FieldDecl> {
        vec![FieldDecl::scalar("path").required()]
    }
}

pub struct HttpSink;

impl Model for HttpSink {
    const ENTITY_TYPE: &'static str = "http_sink";

    fn fields() -> Vec<FieldDecl> {
        vec![
            FieldDecl::scalar("url").required(),
            FieldDecl::scalar("timeout").default_value(30),
            FieldDecl::scalar("secret_ref").readonly(),
        ]
    }
}

/// A type whose declarations the registry refuses.
pub struct Broken;

impl Model for Broken {
    const ENTITY_TYPE: &'static str = "broken";

    fn fields() -> Vec<FieldDecl> {
        vec![FieldDecl::scalar("name").immutable().readonly()]
    }
}

pub fn engine() -> Engine {
    Engine::new(Arc::new(SchemaRegistry::new()))
}

pub fn engine_with(config: EngineConfig) -> Engine {
    Engine::with_config(Arc::new(SchemaRegistry::new()), config)
}

pub fn machine(data: Value) -> Entity {
    Entity::from_value("machine", data).expect("fixture must be an object")
}

pub fn pipeline(data: Value) -> Entity {
    Entity::from_value("pipeline", data).expect("fixture must be an object")
}
