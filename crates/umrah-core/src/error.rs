use thiserror::Error;
use umrah_storage::StorageError;

/// All the ways the bookmark core can fail
///
/// "Already bookmarked" and "no such bookmark" are not errors, those come
/// back as `false` from the repository. What ends up here is storage or
/// configuration trouble the caller may want to retry or report.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
