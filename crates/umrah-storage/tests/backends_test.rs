use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use umrah_storage::{
    BackendKind, CallbackStorageApi, DoneCallback, GetCallback, HostEnvironment, MemoryBackend,
    MemoryPageStorage, NativeStorageApi, Result, StorageArea, StorageBackend, StorageMap,
    StorageService,
};

/// Promise-style host API backed by process memory
#[derive(Default)]
struct FakeNativeApi {
    inner: MemoryBackend,
}

#[async_trait]
impl NativeStorageApi for FakeNativeApi {
    async fn get(&self, area: StorageArea, keys: Option<Vec<String>>) -> Result<StorageMap> {
        match keys {
            Some(keys) => self.inner.get(area, &keys).await,
            None => self.inner.get_all(area).await,
        }
    }

    async fn set(&self, area: StorageArea, items: StorageMap) -> Result<()> {
        self.inner.set(area, items).await
    }

    async fn remove(&self, area: StorageArea, keys: Vec<String>) -> Result<()> {
        self.inner.remove(area, &keys).await
    }

    async fn clear(&self, area: StorageArea) -> Result<()> {
        self.inner.clear(area).await
    }
}

/// Callback-style host API that completes on a separate thread,
/// the way a real host finishes I/O after the call has returned
#[derive(Default)]
struct FakeCallbackApi {
    inner: Arc<MemoryBackend>,
}

impl FakeCallbackApi {
    fn later<F>(&self, work: F)
    where
        F: FnOnce(Arc<MemoryBackend>) + Send + 'static,
    {
        let inner = self.inner.clone();
        std::thread::spawn(move || work(inner));
    }
}

impl CallbackStorageApi for FakeCallbackApi {
    fn get(
        &self,
        area: StorageArea,
        keys: Option<Vec<String>>,
        callback: GetCallback,
    ) -> std::result::Result<(), String> {
        self.later(move |inner| {
            let items = futures::executor::block_on(async {
                match keys {
                    Some(keys) => inner.get(area, &keys).await,
                    None => inner.get_all(area).await,
                }
            })
            .unwrap_or_default();
            callback(items);
        });
        Ok(())
    }

    fn set(
        &self,
        area: StorageArea,
        items: StorageMap,
        callback: DoneCallback,
    ) -> std::result::Result<(), String> {
        self.later(move |inner| {
            let _ = futures::executor::block_on(inner.set(area, items));
            callback();
        });
        Ok(())
    }

    fn remove(
        &self,
        area: StorageArea,
        keys: Vec<String>,
        callback: DoneCallback,
    ) -> std::result::Result<(), String> {
        self.later(move |inner| {
            let _ = futures::executor::block_on(inner.remove(area, &keys));
            callback();
        });
        Ok(())
    }

    fn clear(&self, area: StorageArea, callback: DoneCallback) -> std::result::Result<(), String> {
        self.later(move |inner| {
            let _ = futures::executor::block_on(inner.clear(area));
            callback();
        });
        Ok(())
    }
}

fn page() -> Arc<MemoryPageStorage> {
    Arc::new(MemoryPageStorage::new())
}

fn native_service() -> StorageService {
    StorageService::detect(
        HostEnvironment::page_only(page()).with_native(Arc::new(FakeNativeApi::default())),
    )
}

fn callback_service() -> StorageService {
    StorageService::detect(
        HostEnvironment::page_only(page()).with_callback(Arc::new(FakeCallbackApi::default())),
    )
}

fn fallback_service() -> StorageService {
    StorageService::detect(HostEnvironment::page_only(page()))
}

fn all_services() -> Vec<StorageService> {
    vec![native_service(), callback_service(), fallback_service()]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Saved {
    id: String,
    tags: Vec<String>,
    price: f64,
    notes: Option<String>,
}

#[test]
fn test_selection_order() {
    let both = HostEnvironment::page_only(page())
        .with_callback(Arc::new(FakeCallbackApi::default()))
        .with_native(Arc::new(FakeNativeApi::default()));
    assert_eq!(StorageService::detect(both).backend_kind(), BackendKind::Native);

    assert_eq!(callback_service().backend_kind(), BackendKind::Callback);
    assert_eq!(fallback_service().backend_kind(), BackendKind::PageFallback);
}

#[tokio::test]
async fn test_round_trip_is_exact_on_every_backend() {
    let collection = vec![
        Saved {
            id: "hotel-1".into(),
            tags: vec!["makkah".into(), "haram view".into()],
            price: 250.5,
            notes: None,
        },
        Saved {
            id: "flight-9".into(),
            tags: vec![],
            price: 0.0,
            notes: Some("aisle seat ✈".into()),
        },
    ];

    for service in all_services() {
        service.set("collection", &collection, StorageArea::Local).await.unwrap();
        let loaded: Option<Vec<Saved>> = service.get("collection", StorageArea::Local).await.unwrap();
        assert_eq!(loaded.as_ref(), Some(&collection), "backend {}", service.backend_kind());
    }
}

#[tokio::test]
async fn test_remove_and_clear_on_every_backend() {
    for service in all_services() {
        let kind = service.backend_kind();
        service.set("a", &1, StorageArea::Local).await.unwrap();
        service.set("b", &2, StorageArea::Local).await.unwrap();

        service.remove("a", StorageArea::Local).await.unwrap();
        assert!(!service.has("a", StorageArea::Local).await.unwrap(), "backend {kind}");
        assert!(service.has("b", StorageArea::Local).await.unwrap(), "backend {kind}");

        // removing twice is not an error
        service.remove("a", StorageArea::Local).await.unwrap();

        service.clear(StorageArea::Local).await.unwrap();
        assert!(!service.has("b", StorageArea::Local).await.unwrap(), "backend {kind}");
        assert!(service.get_all(StorageArea::Local).await.unwrap().is_empty(), "backend {kind}");
    }
}

// Absent keys are the one place the backends disagree: extension storage
// leaves them out, the page fallback reports them as null.
#[tokio::test]
async fn test_get_multiple_absent_key_shape() {
    for service in [native_service(), callback_service()] {
        service.set("present", &"yes", StorageArea::Local).await.unwrap();
        let result = service
            .get_multiple::<String>(&["present", "absent"], StorageArea::Local)
            .await
            .unwrap();

        assert_eq!(result.get("present"), Some(&Some("yes".to_string())));
        assert!(!result.contains_key("absent"));
    }

    let service = fallback_service();
    service.set("present", &"yes", StorageArea::Local).await.unwrap();
    let result = service
        .get_multiple::<String>(&["present", "absent"], StorageArea::Local)
        .await
        .unwrap();

    assert_eq!(result.get("present"), Some(&Some("yes".to_string())));
    assert_eq!(result.get("absent"), Some(&None));
}

#[tokio::test]
async fn test_sync_area_is_separate_on_extension_backends() {
    let service = native_service();
    service.set("lang", &"ar", StorageArea::Sync).await.unwrap();

    assert!(!service.has("lang", StorageArea::Local).await.unwrap());
    let value: Option<Value> = service.get("lang", StorageArea::Sync).await.unwrap();
    assert_eq!(value, Some(json!("ar")));
}

#[tokio::test]
async fn test_fallback_returns_raw_string_for_foreign_values() {
    let store = page();
    umrah_storage::PageStorage::set_item(store.as_ref(), "greeting", "as-salamu alaykum").unwrap();

    let service = StorageService::detect(HostEnvironment::page_only(store));
    let value: Option<String> = service.get("greeting", StorageArea::Local).await.unwrap();
    assert_eq!(value.as_deref(), Some("as-salamu alaykum"));
}
