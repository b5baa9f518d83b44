// Callback-style host storage wrapped into futures
//
// Every call hands the host a one-shot completion callback. The returned
// future resolves exactly once, when that callback fires. The callback path
// itself carries no error: the only failures are the host refusing the call
// outright, or dropping the callback without ever running it.
use crate::backend::{BackendKind, StorageBackend, StorageMap};
use crate::{Result, StorageArea, StorageError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Completion callback for reads
pub type GetCallback = Box<dyn FnOnce(StorageMap) + Send>;

/// Completion callback for writes, removals and clears
pub type DoneCallback = Box<dyn FnOnce() + Send>;

/// Host storage API that reports completion through callbacks
///
/// Each method returns `Err` only when the call could not be issued at all.
/// `keys: None` on `get` means every key in the area.
pub trait CallbackStorageApi: Send + Sync {
    fn get(
        &self,
        area: StorageArea,
        keys: Option<Vec<String>>,
        callback: GetCallback,
    ) -> std::result::Result<(), String>;

    fn set(
        &self,
        area: StorageArea,
        items: StorageMap,
        callback: DoneCallback,
    ) -> std::result::Result<(), String>;

    fn remove(
        &self,
        area: StorageArea,
        keys: Vec<String>,
        callback: DoneCallback,
    ) -> std::result::Result<(), String>;

    fn clear(&self, area: StorageArea, callback: DoneCallback) -> std::result::Result<(), String>;
}

/// Backend that turns a [`CallbackStorageApi`] into the async contract
pub struct CallbackBackend {
    api: Arc<dyn CallbackStorageApi>,
}

impl CallbackBackend {
    pub fn new(api: Arc<dyn CallbackStorageApi>) -> Self {
        Self { api }
    }
}

/// Issue a callback-style call and wait for its single completion
async fn await_callback<T, F>(operation: &'static str, issue: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(oneshot::Sender<T>) -> std::result::Result<(), String>,
{
    let (tx, rx) = oneshot::channel();
    issue(tx).map_err(StorageError::Backend)?;
    rx.await
        .map_err(|_| StorageError::CallbackDropped { operation })
}

fn done(tx: oneshot::Sender<()>) -> DoneCallback {
    Box::new(move || {
        // Receiver gone means the caller stopped waiting, nothing to do
        let _ = tx.send(());
    })
}

fn got(tx: oneshot::Sender<StorageMap>) -> GetCallback {
    Box::new(move |items| {
        let _ = tx.send(items);
    })
}

#[async_trait]
impl StorageBackend for CallbackBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Callback
    }

    async fn get(&self, area: StorageArea, keys: &[String]) -> Result<StorageMap> {
        let keys = keys.to_vec();
        await_callback("get", |tx| self.api.get(area, Some(keys), got(tx))).await
    }

    async fn get_all(&self, area: StorageArea) -> Result<StorageMap> {
        await_callback("get", |tx| self.api.get(area, None, got(tx))).await
    }

    async fn set(&self, area: StorageArea, items: StorageMap) -> Result<()> {
        await_callback("set", |tx| self.api.set(area, items, done(tx))).await
    }

    async fn remove(&self, area: StorageArea, keys: &[String]) -> Result<()> {
        let keys = keys.to_vec();
        await_callback("remove", |tx| self.api.remove(area, keys, done(tx))).await
    }

    async fn clear(&self, area: StorageArea) -> Result<()> {
        await_callback("clear", |tx| self.api.clear(area, done(tx))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Host that never runs its callbacks
    struct ForgetfulApi;

    impl CallbackStorageApi for ForgetfulApi {
        fn get(&self, _: StorageArea, _: Option<Vec<String>>, _: GetCallback) -> std::result::Result<(), String> {
            Ok(())
        }
        fn set(&self, _: StorageArea, _: StorageMap, _: DoneCallback) -> std::result::Result<(), String> {
            Ok(())
        }
        fn remove(&self, _: StorageArea, _: Vec<String>, _: DoneCallback) -> std::result::Result<(), String> {
            Ok(())
        }
        fn clear(&self, _: StorageArea, _: DoneCallback) -> std::result::Result<(), String> {
            Ok(())
        }
    }

    /// Host that refuses every call
    struct UnavailableApi;

    impl CallbackStorageApi for UnavailableApi {
        fn get(&self, _: StorageArea, _: Option<Vec<String>>, _: GetCallback) -> std::result::Result<(), String> {
            Err("storage permission missing".into())
        }
        fn set(&self, _: StorageArea, _: StorageMap, _: DoneCallback) -> std::result::Result<(), String> {
            Err("storage permission missing".into())
        }
        fn remove(&self, _: StorageArea, _: Vec<String>, _: DoneCallback) -> std::result::Result<(), String> {
            Err("storage permission missing".into())
        }
        fn clear(&self, _: StorageArea, _: DoneCallback) -> std::result::Result<(), String> {
            Err("storage permission missing".into())
        }
    }

    #[tokio::test]
    async fn test_dropped_callback_is_an_error() {
        let backend = CallbackBackend::new(Arc::new(ForgetfulApi));

        let err = backend.get(StorageArea::Local, &["k".to_string()]).await.unwrap_err();
        assert!(matches!(err, StorageError::CallbackDropped { operation: "get" }));

        let mut items = StorageMap::new();
        items.insert("k".into(), json!(1));
        let err = backend.set(StorageArea::Local, items).await.unwrap_err();
        assert!(matches!(err, StorageError::CallbackDropped { operation: "set" }));
    }

    #[tokio::test]
    async fn test_refused_call_surfaces_host_message() {
        let backend = CallbackBackend::new(Arc::new(UnavailableApi));

        let err = backend.clear(StorageArea::Sync).await.unwrap_err();
        match err {
            StorageError::Backend(msg) => assert_eq!(msg, "storage permission missing"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
