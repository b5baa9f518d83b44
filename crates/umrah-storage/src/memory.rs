use crate::backend::{BackendKind, StorageBackend, StorageMap};
use crate::{Result, StorageArea};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// In-memory backend, one map per area
///
/// Handy for tests and for running without any host storage. Absent keys
/// are simply left out of `get` results.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    areas: Mutex<HashMap<StorageArea, StorageMap>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_area<R>(&self, area: StorageArea, f: impl FnOnce(&mut StorageMap) -> R) -> R {
        let mut areas = self.areas.lock().unwrap_or_else(PoisonError::into_inner);
        f(areas.entry(area).or_default())
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn get(&self, area: StorageArea, keys: &[String]) -> Result<StorageMap> {
        Ok(self.with_area(area, |items| {
            keys.iter()
                .filter_map(|key| items.get(key).map(|value| (key.clone(), value.clone())))
                .collect()
        }))
    }

    async fn get_all(&self, area: StorageArea) -> Result<StorageMap> {
        Ok(self.with_area(area, |items| items.clone()))
    }

    async fn set(&self, area: StorageArea, new_items: StorageMap) -> Result<()> {
        self.with_area(area, |items| items.extend(new_items));
        Ok(())
    }

    async fn remove(&self, area: StorageArea, keys: &[String]) -> Result<()> {
        self.with_area(area, |items| {
            for key in keys {
                items.remove(key);
            }
        });
        Ok(())
    }

    async fn clear(&self, area: StorageArea) -> Result<()> {
        self.with_area(area, |items| items.clear());
        Ok(())
    }
}
