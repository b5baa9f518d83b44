// Page-local fallback storage
//
// Used when the host offers no extension storage at all. Values go through
// JSON on the way in and out of a plain string store, and both areas share
// that one store.
use crate::backend::{BackendKind, StorageBackend, StorageMap};
use crate::{Result, StorageArea, StorageError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Synchronous string key-value store, shaped like a page's `localStorage`
pub trait PageStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
    fn keys(&self) -> Vec<String>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Page store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryPageStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryPageStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageStorage for MemoryPageStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        lock(&self.items).get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.items).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        lock(&self.items).remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        lock(&self.items).clear();
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        lock(&self.items).keys().cloned().collect()
    }
}

/// Page store persisted as one JSON object on disk
///
/// Every mutation rewrites the whole file before returning. The file and
/// its parent directory are created on the first write.
#[derive(Debug)]
pub struct FilePageStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FilePageStorage {
    /// Open the store at `path`, loading whatever is already there
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let items = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            BTreeMap::new()
        };

        debug!("Opened page storage at {} ({} keys)", path.display(), items.len());

        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let contents = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Apply `change` to a copy, write the copy, and only then swap it in
    ///
    /// A failed write leaves both the file and the in-memory view as they
    /// were.
    fn commit(&self, change: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<()> {
        let mut items = lock(&self.items);
        let mut next = items.clone();
        if !change(&mut next) {
            return Ok(());
        }

        self.persist(&next)?;
        *items = next;
        Ok(())
    }
}

impl PageStorage for FilePageStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        lock(&self.items).get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.commit(|items| {
            items.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.commit(|items| items.remove(key).is_some())
    }

    fn clear(&self) -> Result<()> {
        self.commit(|items| {
            items.clear();
            true
        })
    }

    fn keys(&self) -> Vec<String> {
        lock(&self.items).keys().cloned().collect()
    }
}

/// Backend over a [`PageStorage`], JSON-encoding every value
pub struct PageFallbackBackend {
    store: Arc<dyn PageStorage>,
}

impl PageFallbackBackend {
    pub fn new(store: Arc<dyn PageStorage>) -> Self {
        Self { store }
    }

    /// Decode one stored string
    ///
    /// Missing and empty entries read as `null`. Anything that isn't valid
    /// JSON comes back as the raw string instead of failing the read.
    fn decode(raw: Option<String>) -> Value {
        match raw {
            None => Value::Null,
            Some(raw) if raw.is_empty() => Value::Null,
            Some(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        }
    }
}

#[async_trait]
impl StorageBackend for PageFallbackBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::PageFallback
    }

    // Requested keys are always present in the result, absent ones as null
    async fn get(&self, _area: StorageArea, keys: &[String]) -> Result<StorageMap> {
        let mut result = StorageMap::new();
        for key in keys {
            result.insert(key.clone(), Self::decode(self.store.get_item(key)));
        }
        Ok(result)
    }

    async fn get_all(&self, _area: StorageArea) -> Result<StorageMap> {
        let mut result = StorageMap::new();
        for key in self.store.keys() {
            let value = Self::decode(self.store.get_item(&key));
            result.insert(key, value);
        }
        Ok(result)
    }

    async fn set(&self, _area: StorageArea, items: StorageMap) -> Result<()> {
        for (key, value) in items {
            let encoded = serde_json::to_string(&value).map_err(StorageError::from)?;
            self.store.set_item(&key, &encoded)?;
        }
        Ok(())
    }

    async fn remove(&self, _area: StorageArea, keys: &[String]) -> Result<()> {
        for key in keys {
            self.store.remove_item(key)?;
        }
        Ok(())
    }

    async fn clear(&self, _area: StorageArea) -> Result<()> {
        self.store.clear()
    }
}
