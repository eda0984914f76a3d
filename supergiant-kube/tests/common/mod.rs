//! Shared fixtures for Kube tests.

#![allow(dead_code)]

use std::sync::Arc;

use supergiant_kube::{AwsKubeConfig, Kube, KubeConfig, KubeService, MemoryKubeStore};
use supergiant_model::SchemaRegistry;
use supergiant_policy::Engine;

pub fn engine() -> Arc<Engine> {
    Arc::new(Engine::new(Arc::new(SchemaRegistry::new())))
}

pub fn service() -> KubeService<MemoryKubeStore> {
    KubeService::new(engine(), MemoryKubeStore::new()).expect("kube schema must register")
}

pub fn aws_config() -> AwsKubeConfig {
    AwsKubeConfig {
        region: "us-east-1".into(),
        ssh_pub_key: "ssh-rsa AAAA".into(),
        ..AwsKubeConfig::default()
    }
}

/// A complete, valid AWS Kube as a client would submit it.
pub fn prod1() -> Kube {
    Kube {
        cloud_account_name: "acct".into(),
        name: "prod1".into(),
        master_node_size: "m4.large".into(),
        node_sizes: vec!["m4.large".into(), "m4.xlarge".into()],
        username: "admin".into(),
        password: "secret".into(),
        config: Some(KubeConfig::Aws(aws_config())),
        ..Kube::default()
    }
}
