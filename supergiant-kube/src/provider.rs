//! Cloud provider configs for a Kube.
//!
//! A Kube carries exactly one of these. Each is its own entity type with
//! its own defaults, required fields and provisioner outputs, and is stored
//! as a JSON blob next to a `provider` discriminator.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use supergiant_codec::CodecError;
use supergiant_model::{
    ConfigVariant, EntitySchema, FieldDecl, Model, SchemaRegistry, SchemaResult,
};
use supergiant_policy::Engine;

use crate::error::KubeResult;

/// Name of the config group the provider variants belong to.
pub const PROVIDER_GROUP: &str = "provider";

pub(crate) fn is_false(b: &bool) -> bool {
    !*b
}

pub(crate) fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// AWS cluster settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsKubeConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub region: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub availability_zone: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub vpc_ip_range: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub public_subnet_ip_range: Vec<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "is_zero")]
    pub kube_master_count: i64,
    #[serde(skip_serializing_if = "is_false")]
    pub multi_az: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ssh_pub_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bucket_name: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub node_volume_size: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub master_volume_size: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kubernetes_version: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub master_private_ip: String,
    /// With multi-AZ, the zone the last node was built in.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_selected_az: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub etcd_discovery_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub private_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub vpc_id: String,
    #[serde(skip_serializing_if = "is_false")]
    pub vpc_managed: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub internet_gateway_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub route_table_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub route_table_subnet_association_id: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub elb_security_group_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub node_security_group_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub master_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub master_nodes: Vec<String>,
}

impl Model for AwsKubeConfig {
    const ENTITY_TYPE: &'static str = "aws_kube_config";

    fn fields() -> Vec<FieldDecl> {
        vec![
            FieldDecl::scalar("region")
                .required()
                .pattern("[a-z]{2}-[a-z]+-[0-9]"),
            FieldDecl::scalar("availability_zone"),
            FieldDecl::scalar("vpc_ip_range")
                .required()
                .default_value("172.20.0.0/16"),
            FieldDecl::scalar("public_subnet_ip_range"),
            FieldDecl::scalar("kube_master_count"),
            FieldDecl::scalar("multi_az"),
            FieldDecl::scalar("ssh_pub_key"),
            FieldDecl::scalar("bucket_name").readonly(),
            FieldDecl::scalar("node_volume_size").default_value(100),
            FieldDecl::scalar("master_volume_size").default_value(100),
            FieldDecl::scalar("kubernetes_version")
                .required()
                .default_value("1.5.1"),
            FieldDecl::scalar("master_private_ip").readonly(),
            FieldDecl::scalar("last_selected_az").readonly(),
            FieldDecl::scalar("etcd_discovery_url").readonly(),
            FieldDecl::scalar("private_key").readonly(),
            FieldDecl::scalar("vpc_id"),
            FieldDecl::scalar("vpc_managed"),
            FieldDecl::scalar("internet_gateway_id").readonly(),
            FieldDecl::scalar("route_table_id").readonly(),
            FieldDecl::scalar("route_table_subnet_association_id").readonly(),
            FieldDecl::scalar("elb_security_group_id").readonly(),
            FieldDecl::scalar("node_security_group_id").readonly(),
            FieldDecl::scalar("master_id").readonly(),
            FieldDecl::scalar("master_nodes").readonly(),
        ]
    }
}

/// DigitalOcean cluster settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoKubeConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub region: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ssh_key_fingerprint: String,

    #[serde(skip_serializing_if = "is_zero")]
    pub master_id: i64,
}

impl Model for DoKubeConfig {
    const ENTITY_TYPE: &'static str = "do_kube_config";

    fn fields() -> Vec<FieldDecl> {
        vec![
            FieldDecl::scalar("region").required(),
            FieldDecl::scalar("ssh_key_fingerprint").required(),
            FieldDecl::scalar("master_id").readonly(),
        ]
    }
}

/// OpenStack cluster settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsKubeConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub region: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ssh_pub_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub private_subnet_ip_range: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub public_gateway_id: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub master_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub master_private_ip: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub network_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subnet_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub router_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub floating_ip_id: String,
}

impl Model for OsKubeConfig {
    const ENTITY_TYPE: &'static str = "os_kube_config";

    fn fields() -> Vec<FieldDecl> {
        vec![
            FieldDecl::scalar("region").required(),
            FieldDecl::scalar("ssh_pub_key").required(),
            FieldDecl::scalar("private_subnet_ip_range")
                .required()
                .default_value("172.20.0.0/24"),
            FieldDecl::scalar("public_gateway_id")
                .required()
                .default_value("disabled"),
            FieldDecl::scalar("master_id").readonly(),
            FieldDecl::scalar("master_private_ip").readonly(),
            FieldDecl::scalar("network_id").readonly(),
            FieldDecl::scalar("subnet_id").readonly(),
            FieldDecl::scalar("router_id").readonly(),
            FieldDecl::scalar("floating_ip_id").readonly(),
        ]
    }
}

/// Google Compute Engine cluster settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GceKubeConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub zone: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub master_instance_group: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub minion_instance_group: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub master_nodes: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub master_name: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub kube_master_count: i64,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub ssh_pub_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kubernetes_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub etcd_discovery_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub master_private_ip: String,
}

impl Model for GceKubeConfig {
    const ENTITY_TYPE: &'static str = "gce_kube_config";

    fn fields() -> Vec<FieldDecl> {
        vec![
            FieldDecl::scalar("zone").required(),
            FieldDecl::scalar("master_instance_group").readonly(),
            FieldDecl::scalar("minion_instance_group").readonly(),
            FieldDecl::scalar("master_nodes").readonly(),
            FieldDecl::scalar("master_name").readonly(),
            FieldDecl::scalar("kube_master_count"),
            FieldDecl::scalar("ssh_pub_key").required(),
            FieldDecl::scalar("kubernetes_version")
                .required()
                .default_value("1.5.1"),
            FieldDecl::scalar("etcd_discovery_url").readonly(),
            FieldDecl::scalar("master_private_ip").readonly(),
        ]
    }
}

/// Which provider a Kube runs on; the stored discriminator value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aws,
    DigitalOcean,
    OpenStack,
    Gce,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::Aws,
        Provider::DigitalOcean,
        Provider::OpenStack,
        Provider::Gce,
    ];

    /// Discriminator value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::DigitalOcean => "digitalocean",
            Self::OpenStack => "openstack",
            Self::Gce => "gce",
        }
    }

    /// Kube field holding this provider's config.
    pub fn field(self) -> &'static str {
        match self {
            Self::Aws => "aws_config",
            Self::DigitalOcean => "digitalocean_config",
            Self::OpenStack => "openstack_config",
            Self::Gce => "gce_config",
        }
    }

    /// Blob column the config is stored in.
    pub fn mirror(self) -> &'static str {
        match self {
            Self::Aws => "aws_config_json",
            Self::DigitalOcean => "digitalocean_config_json",
            Self::OpenStack => "openstack_config_json",
            Self::Gce => "gce_config_json",
        }
    }

    /// The config variant this provider stands for, with its schema.
    pub fn variant(self, registry: &SchemaRegistry) -> SchemaResult<ConfigVariant> {
        Ok(ConfigVariant {
            group: PROVIDER_GROUP.into(),
            variant: self.as_str().into(),
            schema: self.schema(registry)?,
        })
    }

    fn schema(self, registry: &SchemaRegistry) -> SchemaResult<Arc<EntitySchema>> {
        match self {
            Self::Aws => registry.describe::<AwsKubeConfig>(),
            Self::DigitalOcean => registry.describe::<DoKubeConfig>(),
            Self::OpenStack => registry.describe::<OsKubeConfig>(),
            Self::Gce => registry.describe::<GceKubeConfig>(),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CodecError::UnknownVariant {
                group: PROVIDER_GROUP.into(),
                variant: s.into(),
            })
    }
}

/// The provider config of a Kube, one variant per provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KubeConfig {
    Aws(AwsKubeConfig),
    DigitalOcean(DoKubeConfig),
    OpenStack(OsKubeConfig),
    Gce(GceKubeConfig),
}

impl KubeConfig {
    pub fn provider(&self) -> Provider {
        match self {
            Self::Aws(_) => Provider::Aws,
            Self::DigitalOcean(_) => Provider::DigitalOcean,
            Self::OpenStack(_) => Provider::OpenStack,
            Self::Gce(_) => Provider::Gce,
        }
    }

    /// The config as a JSON object, without its provider tag.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        match self {
            Self::Aws(c) => serde_json::to_value(c),
            Self::DigitalOcean(c) => serde_json::to_value(c),
            Self::OpenStack(c) => serde_json::to_value(c),
            Self::Gce(c) => serde_json::to_value(c),
        }
    }

    /// Reads an untagged config object as `provider`'s config.
    pub fn from_value(provider: Provider, value: Value) -> serde_json::Result<Self> {
        Ok(match provider {
            Provider::Aws => Self::Aws(serde_json::from_value(value)?),
            Provider::DigitalOcean => Self::DigitalOcean(serde_json::from_value(value)?),
            Provider::OpenStack => Self::OpenStack(serde_json::from_value(value)?),
            Provider::Gce => Self::Gce(serde_json::from_value(value)?),
        })
    }

    /// A config with every field unset. The engine treats it as no
    /// selection.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Aws(c) => *c == AwsKubeConfig::default(),
            Self::DigitalOcean(c) => *c == DoKubeConfig::default(),
            Self::OpenStack(c) => *c == OsKubeConfig::default(),
            Self::Gce(c) => *c == GceKubeConfig::default(),
        }
    }

    /// Encodes the config into a blob plus the discriminator needed to
    /// read it back.
    pub fn encode(&self, engine: &Engine) -> KubeResult<(Provider, Vec<u8>)> {
        let value = self.to_value().map_err(CodecError::from)?;
        let blob = engine.codec().encode_variant(&value)?;
        Ok((self.provider(), blob))
    }

    /// Decodes a blob stored for `provider`, checking it against that
    /// provider's schema.
    pub fn decode(provider: Provider, blob: &[u8], engine: &Engine) -> KubeResult<Self> {
        let variant = provider.variant(engine.registry())?;
        let data = engine.codec().decode_variant(blob, &variant)?;
        let config = Self::from_value(provider, Value::Object(data)).map_err(CodecError::from)?;
        Ok(config)
    }
}

/// Config field declarations for the Kube's provider group.
pub(crate) fn provider_fields() -> Vec<FieldDecl> {
    let mut fields = Vec::new();
    for provider in Provider::ALL {
        let decl = match provider {
            Provider::Aws => FieldDecl::config::<AwsKubeConfig>,
            Provider::DigitalOcean => FieldDecl::config::<DoKubeConfig>,
            Provider::OpenStack => FieldDecl::config::<OsKubeConfig>,
            Provider::Gce => FieldDecl::config::<GceKubeConfig>,
        };
        fields.push(
            decl(provider.field(), PROVIDER_GROUP, provider.as_str())
                .immutable()
                .store_as_json_in(provider.mirror()),
        );
        fields.push(FieldDecl::json_mirror(provider.mirror()));
    }
    fields
}
