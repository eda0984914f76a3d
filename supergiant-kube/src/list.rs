use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use supergiant_model::Violation;

use crate::kube::Kube;

/// One page of Kubes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KubeList {
    pub offset: usize,
    pub limit: usize,
    /// Number of Kubes in the store, not on this page.
    pub total: usize,
    pub items: Vec<Kube>,
    /// Fields that failed to decode, keyed by Kube name. Affected items
    /// are still listed, without those fields.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, Vec<Violation>>,
}

impl KubeList {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
