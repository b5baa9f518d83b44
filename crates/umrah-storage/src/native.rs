// Promise-style host storage, used as-is
use crate::backend::{BackendKind, StorageBackend, StorageMap};
use crate::{Result, StorageArea};
use async_trait::async_trait;
use std::sync::Arc;

/// Host storage API that is already asynchronous
///
/// This is what a host exposing `browser.storage`-like promises plugs in.
/// `get` may leave absent keys out of the returned map.
#[async_trait]
pub trait NativeStorageApi: Send + Sync {
    async fn get(&self, area: StorageArea, keys: Option<Vec<String>>) -> Result<StorageMap>;
    async fn set(&self, area: StorageArea, items: StorageMap) -> Result<()>;
    async fn remove(&self, area: StorageArea, keys: Vec<String>) -> Result<()>;
    async fn clear(&self, area: StorageArea) -> Result<()>;
}

/// Backend that forwards straight to a [`NativeStorageApi`]
pub struct NativeBackend {
    api: Arc<dyn NativeStorageApi>,
}

impl NativeBackend {
    pub fn new(api: Arc<dyn NativeStorageApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl StorageBackend for NativeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    async fn get(&self, area: StorageArea, keys: &[String]) -> Result<StorageMap> {
        self.api.get(area, Some(keys.to_vec())).await
    }

    async fn get_all(&self, area: StorageArea) -> Result<StorageMap> {
        self.api.get(area, None).await
    }

    async fn set(&self, area: StorageArea, items: StorageMap) -> Result<()> {
        self.api.set(area, items).await
    }

    async fn remove(&self, area: StorageArea, keys: &[String]) -> Result<()> {
        self.api.remove(area, keys.to_vec()).await
    }

    async fn clear(&self, area: StorageArea) -> Result<()> {
        self.api.clear(area).await
    }
}
