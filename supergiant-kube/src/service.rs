//! Create, update and read Kubes through the policy engine.

use std::sync::Arc;

use supergiant_codec::StoredEntity;
use supergiant_model::{Violation, Violations};
use supergiant_policy::Engine;
use tracing::{debug, info};

use crate::error::{KubeError, KubeResult};
use crate::kube::Kube;
use crate::list::KubeList;
use crate::store::KubeStore;

/// A Kube read from storage, with any fields that failed to decode.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedKube {
    pub kube: Kube,
    pub errors: Vec<Violation>,
}

impl LoadedKube {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// The Kube, or an error if any field failed to decode.
    pub fn into_clean(self) -> KubeResult<Kube> {
        if self.errors.is_empty() {
            return Ok(self.kube);
        }
        Err(KubeError::Unreadable {
            name: self.kube.name,
            violations: Violations::from(self.errors),
        })
    }
}

/// Kube operations on top of a [`KubeStore`].
pub struct KubeService<S> {
    engine: Arc<Engine>,
    store: S,
}

impl<S: KubeStore> KubeService<S> {
    /// Registers the Kube schema with the engine, so declaration errors
    /// surface here rather than on the first request.
    pub fn new(engine: Arc<Engine>, store: S) -> KubeResult<Self> {
        engine.register::<Kube>()?;
        Ok(Self { engine, store })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn create(&self, kube: &Kube) -> KubeResult<Kube> {
        let prepared = self.engine.prepare_for_create::<Kube>(&kube.to_entity()?)?;
        let stored = self.store.insert(prepared.stored)?;
        info!(name = %kube.name, "Created kube");
        self.load(&stored)?.into_clean()
    }

    /// Applies `candidate` to the stored Kube `name`. Unset fields of the
    /// candidate keep their stored values.
    pub fn update(&self, name: &str, candidate: &Kube) -> KubeResult<Kube> {
        let current = self.stored(name)?;
        let old = self.engine.prepare_for_read::<Kube>(&current)?;
        if !old.is_clean() {
            return Err(KubeError::Unreadable {
                name: name.to_string(),
                violations: Violations::from(old.errors),
            });
        }

        let prepared = self
            .engine
            .prepare_for_update::<Kube>(&old.entity, &candidate.to_entity()?)?;
        let stored = self.store.replace(prepared.stored)?;
        info!(name, "Updated kube");
        self.load(&stored)?.into_clean()
    }

    /// Reads one Kube. Undecodable fields are reported, not fatal.
    pub fn get(&self, name: &str) -> KubeResult<LoadedKube> {
        let stored = self.stored(name)?;
        self.load(&stored)
    }

    pub fn list(&self, offset: usize, limit: usize) -> KubeResult<KubeList> {
        let page = self.store.page(offset, limit)?;
        let mut list = KubeList {
            offset,
            limit,
            total: page.total,
            ..KubeList::default()
        };
        for record in &page.items {
            let loaded = self.load(record)?;
            if !loaded.is_clean() {
                debug!(
                    name = %loaded.kube.name,
                    errors = loaded.errors.len(),
                    "Listed kube with undecodable fields"
                );
                list.errors.insert(loaded.kube.name.clone(), loaded.errors);
            }
            list.items.push(loaded.kube);
        }
        Ok(list)
    }

    fn stored(&self, name: &str) -> KubeResult<StoredEntity> {
        self.store.get(name)?.ok_or_else(|| KubeError::NotFound {
            name: name.to_string(),
        })
    }

    fn load(&self, stored: &StoredEntity) -> KubeResult<LoadedKube> {
        let loaded = self.engine.prepare_for_read::<Kube>(stored)?;
        let (kube, dropped) = Kube::from_entity_lenient(loaded.entity)?;
        let mut errors = loaded.errors;
        errors.extend(dropped);
        Ok(LoadedKube { kube, errors })
    }
}
