//! Persistence seam for Kube records.
//!
//! The service depends on a [`KubeStore`] and never on a concrete backend.
//! [`MemoryKubeStore`] keeps records in a map and is what tests use.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{PoisonError, RwLock};

use serde_json::Value;
use supergiant_codec::StoredEntity;

use crate::error::{KubeError, KubeResult};

/// One page of stored records plus the overall count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<StoredEntity>,
    pub total: usize,
}

/// Storage for prepared Kube records, keyed by name.
pub trait KubeStore: Send + Sync {
    /// Adds a new record and returns it as stored, with its id assigned.
    fn insert(&self, record: StoredEntity) -> KubeResult<StoredEntity>;

    /// Replaces an existing record with the same name.
    fn replace(&self, record: StoredEntity) -> KubeResult<StoredEntity>;

    fn get(&self, name: &str) -> KubeResult<Option<StoredEntity>>;

    /// Records ordered by name. A `limit` of zero means no limit.
    fn page(&self, offset: usize, limit: usize) -> KubeResult<Page>;
}

/// In-memory [`KubeStore`].
#[derive(Debug, Default)]
pub struct MemoryKubeStore {
    records: RwLock<BTreeMap<String, StoredEntity>>,
    last_id: AtomicI64,
}

impl MemoryKubeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps the raw record under `name`, bypassing the engine. For
    /// simulating damaged rows.
    pub fn overwrite(&self, name: &str, record: StoredEntity) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), record);
    }
}

fn record_name(record: &StoredEntity) -> KubeResult<String> {
    record
        .columns
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(KubeError::MissingName)
}

impl KubeStore for MemoryKubeStore {
    fn insert(&self, mut record: StoredEntity) -> KubeResult<StoredEntity> {
        let name = record_name(&record)?;
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(&name) {
            return Err(KubeError::AlreadyExists { name });
        }
        let id = self.last_id.fetch_add(1, Ordering::Relaxed) + 1;
        record.columns.insert("id".into(), Value::from(id));
        records.insert(name, record.clone());
        Ok(record)
    }

    fn replace(&self, record: StoredEntity) -> KubeResult<StoredEntity> {
        let name = record_name(&record)?;
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        match records.get_mut(&name) {
            Some(existing) => {
                *existing = record.clone();
                Ok(record)
            }
            None => Err(KubeError::NotFound { name }),
        }
    }

    fn get(&self, name: &str) -> KubeResult<Option<StoredEntity>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(name).cloned())
    }

    fn page(&self, offset: usize, limit: usize) -> KubeResult<Page> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let take = if limit == 0 { usize::MAX } else { limit };
        Ok(Page {
            items: records.values().skip(offset).take(take).cloned().collect(),
            total: records.len(),
        })
    }
}
