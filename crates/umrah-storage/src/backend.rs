use crate::{Result, StorageArea};
use async_trait::async_trait;
use serde_json::Value;

/// Key → JSON value map, the unit every backend reads and writes
pub type StorageMap = serde_json::Map<String, Value>;

/// Which mechanism ended up behind the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Promise-style host storage API
    Native,
    /// Callback-style host storage API, wrapped into futures
    Callback,
    /// Page-local string store with JSON encoding
    PageFallback,
    /// Process memory only, nothing survives a restart
    Memory,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Native => write!(f, "native"),
            BackendKind::Callback => write!(f, "callback"),
            BackendKind::PageFallback => write!(f, "page-fallback"),
            BackendKind::Memory => write!(f, "memory"),
        }
    }
}

/// The one contract every storage mechanism is squeezed into
///
/// Implementations hold raw JSON values and know nothing about what is
/// stored in them. Reading a key that was never written is not an error.
/// How such a key shows up in the returned map (left out, or present as
/// `null`) is up to the backend.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Read the requested keys
    async fn get(&self, area: StorageArea, keys: &[String]) -> Result<StorageMap>;

    /// Read every key in the area
    async fn get_all(&self, area: StorageArea) -> Result<StorageMap>;

    /// Write all items. Returns once the write has been acknowledged.
    async fn set(&self, area: StorageArea, items: StorageMap) -> Result<()>;

    /// Delete keys. Keys that don't exist are ignored.
    async fn remove(&self, area: StorageArea, keys: &[String]) -> Result<()>;

    async fn clear(&self, area: StorageArea) -> Result<()>;
}
