// The storage adapter callers actually talk to
use crate::backend::{BackendKind, StorageBackend, StorageMap};
use crate::callback::{CallbackBackend, CallbackStorageApi};
use crate::memory::MemoryBackend;
use crate::native::{NativeBackend, NativeStorageApi};
use crate::page::{PageFallbackBackend, PageStorage};
use crate::{Result, StorageArea};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What storage the host process offers
///
/// The page store is always there, the two extension APIs may not be.
#[derive(Clone)]
pub struct HostEnvironment {
    pub native: Option<Arc<dyn NativeStorageApi>>,
    pub callback: Option<Arc<dyn CallbackStorageApi>>,
    pub page: Arc<dyn PageStorage>,
}

impl HostEnvironment {
    /// A host with nothing but page storage
    pub fn page_only(page: Arc<dyn PageStorage>) -> Self {
        Self {
            native: None,
            callback: None,
            page,
        }
    }

    pub fn with_native(mut self, api: Arc<dyn NativeStorageApi>) -> Self {
        self.native = Some(api);
        self
    }

    pub fn with_callback(mut self, api: Arc<dyn CallbackStorageApi>) -> Self {
        self.callback = Some(api);
        self
    }
}

/// Uniform async key-value access over whichever backend the host allows
///
/// The backend is picked once, at construction, and never changes. Every
/// backend failure is logged with the operation and area, then handed back
/// to the caller untouched.
pub struct StorageService {
    backend: Arc<dyn StorageBackend>,
}

impl StorageService {
    /// Pick a backend from what the host offers
    ///
    /// First match wins: promise-style API, then callback-style API, then
    /// the page store.
    pub fn detect(env: HostEnvironment) -> Self {
        let backend: Arc<dyn StorageBackend> = if let Some(api) = env.native {
            Arc::new(NativeBackend::new(api))
        } else if let Some(api) = env.callback {
            Arc::new(CallbackBackend::new(api))
        } else {
            warn!("Extension storage API not available, using page storage fallback");
            Arc::new(PageFallbackBackend::new(env.page))
        };

        info!("Storage backend selected: {}", backend.kind());
        Self { backend }
    }

    /// Use a specific backend, skipping detection
    pub fn with_backend(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Throwaway in-memory storage
    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()))
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Read a typed value. Absent keys and stored `null` both give `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, area: StorageArea) -> Result<Option<T>> {
        let Some(value) = self.get_value(key, area).await? else {
            return Ok(None);
        };

        let typed = serde_json::from_value(value).map_err(Into::into);
        logged("get", area, typed).map(Some)
    }

    /// Read the raw JSON value behind a key
    pub async fn get_value(&self, key: &str, area: StorageArea) -> Result<Option<Value>> {
        debug!("Reading '{}' from {} storage", key, area);
        let mut result = logged("get", area, self.backend.get(area, &[key.to_string()]).await)?;

        Ok(match result.remove(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        })
    }

    /// Read several keys at once
    ///
    /// The result only contains keys the backend reported. Depending on the
    /// backend an absent key is either missing from the map or maps to
    /// `None`.
    pub async fn get_multiple<T: DeserializeOwned>(
        &self,
        keys: &[&str],
        area: StorageArea,
    ) -> Result<BTreeMap<String, Option<T>>> {
        debug!("Reading {} keys from {} storage", keys.len(), area);
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        let raw = logged("get_multiple", area, self.backend.get(area, &keys).await)?;

        let mut result = BTreeMap::new();
        for (key, value) in raw {
            let typed = logged("get_multiple", area, serde_json::from_value(value).map_err(Into::into))?;
            result.insert(key, typed);
        }
        Ok(result)
    }

    /// Every key and raw value in the area
    pub async fn get_all(&self, area: StorageArea) -> Result<StorageMap> {
        logged("get_all", area, self.backend.get_all(area).await)
    }

    /// Serialize and store a value; returns once the backend acknowledged it
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, area: StorageArea) -> Result<()> {
        let value = logged("set", area, serde_json::to_value(value).map_err(Into::into))?;

        let mut items = StorageMap::new();
        items.insert(key.to_string(), value);

        info!("Writing '{}' to {} storage", key, area);
        logged("set", area, self.backend.set(area, items).await)
    }

    /// Delete a key. Deleting a key that isn't there is fine.
    pub async fn remove(&self, key: &str, area: StorageArea) -> Result<()> {
        info!("Removing '{}' from {} storage", key, area);
        logged("remove", area, self.backend.remove(area, &[key.to_string()]).await)
    }

    /// Delete every key in the area
    pub async fn clear(&self, area: StorageArea) -> Result<()> {
        info!("Clearing {} storage", area);
        logged("clear", area, self.backend.clear(area).await)
    }

    /// True iff `get` would return something
    pub async fn has(&self, key: &str, area: StorageArea) -> Result<bool> {
        Ok(self.get_value(key, area).await?.is_some())
    }
}

/// Log a failed operation with its context, then pass the result through
fn logged<T>(operation: &'static str, area: StorageArea, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        error!(operation, area = %area, "Storage operation failed: {}", e);
    }
    result
}
