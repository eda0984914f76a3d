//! Kube cluster records for Supergiant.
//!
//! - [`Kube`]: the cluster record and its field policies
//! - [`KubeConfig`]: the provider config, one of AWS, DigitalOcean,
//!   OpenStack or GCE, with [`Provider`] as its stored discriminator
//! - [`KubeService`]: create, update, get and list through the policy engine
//! - [`KubeStore`]: the persistence seam, with an in-memory implementation

mod error;
mod kube;
mod list;
mod provider;
mod service;
mod store;

pub use error::{KubeError, KubeResult};
pub use kube::Kube;
pub use list::KubeList;
pub use provider::{
    AwsKubeConfig, DoKubeConfig, GceKubeConfig, KubeConfig, OsKubeConfig, PROVIDER_GROUP,
    Provider,
};
pub use service::{KubeService, LoadedKube};
pub use store::{KubeStore, MemoryKubeStore, Page};
