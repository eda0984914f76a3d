//! The Kube record: one managed Kubernetes cluster.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use supergiant_codec::CodecError;
use supergiant_model::{Entity, FieldDecl, Model, Violation};
use tracing::warn;

use crate::error::KubeResult;
use crate::provider::{
    AwsKubeConfig, DoKubeConfig, GceKubeConfig, KubeConfig, OsKubeConfig, PROVIDER_GROUP,
    is_false, provider_fields,
};

/// A managed Kubernetes cluster.
///
/// Associations (`cloud_account`, `nodes`, ...) are carried as raw JSON;
/// loading them is up to the persistence layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "KubeRecord", into = "KubeRecord")]
pub struct Kube {
    pub id: Option<i64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,

    pub cloud_account: Option<Value>,
    pub cloud_account_name: String,
    pub nodes: Vec<Value>,
    pub load_balancers: Vec<Value>,
    pub kube_resources: Vec<Value>,
    pub helm_releases: Vec<Value>,

    pub name: String,
    pub master_node_size: String,
    pub node_sizes: Vec<String>,
    pub username: String,
    pub password: String,
    pub heapster_version: String,
    pub heapster_metric_resolution: String,

    pub config: Option<KubeConfig>,

    pub master_public_ip: String,
    pub ready: bool,
}

impl Model for Kube {
    const ENTITY_TYPE: &'static str = "kube";

    fn fields() -> Vec<FieldDecl> {
        let mut fields = vec![
            FieldDecl::scalar("id").readonly(),
            FieldDecl::scalar("created_at").readonly(),
            FieldDecl::scalar("updated_at").readonly(),
            FieldDecl::reference("cloud_account"),
            FieldDecl::scalar("cloud_account_name")
                .required()
                .immutable(),
            FieldDecl::collection("nodes"),
            FieldDecl::collection("load_balancers"),
            FieldDecl::collection("kube_resources"),
            FieldDecl::collection("helm_releases"),
            FieldDecl::scalar("name")
                .required()
                .immutable()
                .max_len(12)
                .pattern("[a-z]([-a-z0-9]*[a-z0-9])?"),
            FieldDecl::scalar("master_node_size")
                .required()
                .immutable(),
            FieldDecl::scalar("node_sizes")
                .min_items(1)
                .store_as_json_in("node_sizes_json"),
            FieldDecl::json_mirror("node_sizes_json"),
            FieldDecl::scalar("username").required().immutable(),
            FieldDecl::scalar("password").required().immutable(),
            FieldDecl::scalar("heapster_version")
                .required()
                .immutable()
                .default_value("v1.1.0"),
            FieldDecl::scalar("heapster_metric_resolution")
                .immutable()
                .default_value("20s")
                .pattern("([0-9]+[smhd])+"),
        ];
        fields.extend(provider_fields());
        fields.push(FieldDecl::scalar("master_public_ip").readonly());
        fields.push(FieldDecl::scalar("ready").readonly());
        fields
    }
}

impl Kube {
    /// The field map the engine works on.
    pub fn to_entity(&self) -> KubeResult<Entity> {
        let value = serde_json::to_value(self)?;
        Ok(Entity::from_value(Self::ENTITY_TYPE, value)
            .unwrap_or_else(|| Entity::new(Self::ENTITY_TYPE)))
    }

    /// Reads a Kube back from a field map. Fails if more than one
    /// provider config is populated.
    pub fn from_entity(entity: Entity) -> KubeResult<Self> {
        Ok(serde_json::from_value(entity.into_value())?)
    }

    /// Reads a Kube back from a loaded field map, leaving out fields whose
    /// values do not fit their typed counterpart. Each one left out is
    /// reported as a codec violation.
    pub fn from_entity_lenient(entity: Entity) -> KubeResult<(Self, Vec<Violation>)> {
        let mut data = entity.data;
        if let Ok(record) = serde_json::from_value::<KubeRecord>(Value::Object(data.clone())) {
            return Ok((Self::try_from(record)?, Vec::new()));
        }

        let mut errors = Vec::new();
        let names: Vec<String> = data.keys().cloned().collect();
        for name in names {
            let Some(value) = data.remove(&name) else {
                continue;
            };
            let single = Map::from_iter([(name.clone(), value)]);
            match serde_json::from_value::<KubeRecord>(Value::Object(single.clone())) {
                Ok(_) => data.extend(single),
                Err(err) => {
                    warn!(field = %name, error = %err, "Dropping undecodable kube field");
                    errors.push(Violation::codec(name, err));
                }
            }
        }

        let record: KubeRecord = serde_json::from_value(Value::Object(data))?;
        Ok((Self::try_from(record)?, errors))
    }
}

/// The JSON shape of a Kube: one optional key per provider config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct KubeRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    cloud_account: Option<Value>,
    #[serde(skip_serializing_if = "String::is_empty")]
    cloud_account_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    nodes: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    load_balancers: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    kube_resources: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    helm_releases: Vec<Value>,

    #[serde(skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    master_node_size: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    node_sizes: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    password: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    heapster_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    heapster_metric_resolution: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    aws_config: Option<AwsKubeConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    digitalocean_config: Option<DoKubeConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    openstack_config: Option<OsKubeConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gce_config: Option<GceKubeConfig>,

    #[serde(skip_serializing_if = "String::is_empty")]
    master_public_ip: String,
    #[serde(skip_serializing_if = "is_false")]
    ready: bool,
}

impl TryFrom<KubeRecord> for Kube {
    type Error = CodecError;

    fn try_from(record: KubeRecord) -> Result<Self, Self::Error> {
        let mut configs: Vec<KubeConfig> = [
            record.aws_config.map(KubeConfig::Aws),
            record.digitalocean_config.map(KubeConfig::DigitalOcean),
            record.openstack_config.map(KubeConfig::OpenStack),
            record.gce_config.map(KubeConfig::Gce),
        ]
        .into_iter()
        .flatten()
        .filter(|c| !c.is_blank())
        .collect();

        if configs.len() > 1 {
            return Err(CodecError::ConflictingVariants {
                group: PROVIDER_GROUP.into(),
                variants: configs
                    .iter()
                    .map(|c| c.provider().as_str().to_string())
                    .collect(),
            });
        }

        Ok(Self {
            id: record.id,
            created_at: record.created_at,
            updated_at: record.updated_at,
            cloud_account: record.cloud_account,
            cloud_account_name: record.cloud_account_name,
            nodes: record.nodes,
            load_balancers: record.load_balancers,
            kube_resources: record.kube_resources,
            helm_releases: record.helm_releases,
            name: record.name,
            master_node_size: record.master_node_size,
            node_sizes: record.node_sizes,
            username: record.username,
            password: record.password,
            heapster_version: record.heapster_version,
            heapster_metric_resolution: record.heapster_metric_resolution,
            config: configs.pop(),
            master_public_ip: record.master_public_ip,
            ready: record.ready,
        })
    }
}

impl From<Kube> for KubeRecord {
    fn from(kube: Kube) -> Self {
        let mut record = Self {
            id: kube.id,
            created_at: kube.created_at,
            updated_at: kube.updated_at,
            cloud_account: kube.cloud_account,
            cloud_account_name: kube.cloud_account_name,
            nodes: kube.nodes,
            load_balancers: kube.load_balancers,
            kube_resources: kube.kube_resources,
            helm_releases: kube.helm_releases,
            name: kube.name,
            master_node_size: kube.master_node_size,
            node_sizes: kube.node_sizes,
            username: kube.username,
            password: kube.password,
            heapster_version: kube.heapster_version,
            heapster_metric_resolution: kube.heapster_metric_resolution,
            master_public_ip: kube.master_public_ip,
            ready: kube.ready,
            ..Self::default()
        };
        match kube.config {
            Some(KubeConfig::Aws(c)) => record.aws_config = Some(c),
            Some(KubeConfig::DigitalOcean(c)) => record.digitalocean_config = Some(c),
            Some(KubeConfig::OpenStack(c)) => record.openstack_config = Some(c),
            Some(KubeConfig::Gce(c)) => record.gce_config = Some(c),
            None => {}
        }
        record
    }
}
