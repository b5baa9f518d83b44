// Opening storage from configuration
use crate::config::{BackendChoice, Config};
use crate::Result;
use std::sync::Arc;
use tracing::debug;
use umrah_storage::{
    FilePageStorage, HostEnvironment, PageFallbackBackend, StorageService,
};

/// Build the storage adapter the configuration asks for
///
/// A plain process has no extension storage API, so `auto` detection ends
/// up on the page store as well; it just goes through the selection policy
/// (and its warning) to get there.
pub fn open_storage(config: &Config) -> Result<StorageService> {
    match config.storage.backend {
        BackendChoice::Memory => {
            debug!("Using in-memory storage");
            Ok(StorageService::in_memory())
        }
        BackendChoice::Page => {
            let page = Arc::new(FilePageStorage::open(config.data_file_path()?)?);
            debug!("Using page storage at {}", page.path().display());
            Ok(StorageService::with_backend(Arc::new(PageFallbackBackend::new(page))))
        }
        BackendChoice::Auto => {
            let page = Arc::new(FilePageStorage::open(config.data_file_path()?)?);
            Ok(StorageService::detect(HostEnvironment::page_only(page)))
        }
    }
}
