// Key-value storage adapter
// One async get/set/remove/clear/has contract over whatever the host offers:
// promise-style extension storage, callback-style extension storage, or a
// page-local string store as the last resort.

pub mod area;
pub mod backend;
pub mod callback;
pub mod error;
pub mod memory;
pub mod native;
pub mod page;
pub mod service;

pub use area::StorageArea;
pub use backend::{BackendKind, StorageBackend, StorageMap};
pub use callback::{CallbackBackend, CallbackStorageApi, DoneCallback, GetCallback};
pub use error::{Result, StorageError};
pub use memory::MemoryBackend;
pub use native::{NativeBackend, NativeStorageApi};
pub use page::{FilePageStorage, MemoryPageStorage, PageFallbackBackend, PageStorage};
pub use service::{HostEnvironment, StorageService};
