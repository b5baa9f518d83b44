// Bookmark repository
//
// The whole collection lives under one storage key. Every mutation reads the
// full list, changes it in memory and writes the full list back with a
// single `set`. There are no partial or indexed writes.
use crate::models::{Bookmark, BookmarkFilter, BookmarkType, Bookmarkable, Flight, Hotel, UmrahPackage};
use crate::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use umrah_storage::{StorageArea, StorageService};

/// Storage key holding the bookmark collection
pub const DEFAULT_BOOKMARK_KEY: &str = "umrah_bookmarks";

/// CRUD over the saved hotels, flights and packages
///
/// At most one bookmark exists per `(type, referenceId)`. Adding an entity
/// that is already bookmarked, or touching an id that doesn't exist, is
/// reported as `false` rather than as an error. Storage failures come back
/// as `Err` and leave the stored collection as it was.
///
/// Mutations are serialized through an internal lock, so callers sharing
/// one repository can't clobber each other's read-modify-write cycles.
pub struct BookmarkRepository {
    storage: Arc<StorageService>,
    key: String,
    area: StorageArea,
    write_lock: Mutex<()>,
}

impl BookmarkRepository {
    /// Repository on the default key in local storage
    pub fn new(storage: Arc<StorageService>) -> Self {
        Self::with_key(storage, DEFAULT_BOOKMARK_KEY, StorageArea::Local)
    }

    pub fn with_key(storage: Arc<StorageService>, key: impl Into<String>, area: StorageArea) -> Self {
        Self {
            storage,
            key: key.into(),
            area,
            write_lock: Mutex::new(()),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    pub fn area(&self) -> StorageArea {
        self.area
    }

    /// Every bookmark, in the order they were added
    pub async fn list_all(&self) -> Result<Vec<Bookmark>> {
        self.load("list_all").await
    }

    pub async fn list_by_type(&self, kind: BookmarkType) -> Result<Vec<Bookmark>> {
        let filter = BookmarkFilter {
            kind: Some(kind),
            query: None,
        };
        self.load_matching("list_by_type", &filter).await
    }

    /// Case-insensitive match on name or description
    pub async fn search(&self, query: &str) -> Result<Vec<Bookmark>> {
        let filter = BookmarkFilter {
            kind: None,
            query: Some(query.to_string()),
        };
        self.load_matching("search", &filter).await
    }

    pub async fn filter(&self, filter: &BookmarkFilter) -> Result<Vec<Bookmark>> {
        self.load_matching("filter", filter).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Bookmark>> {
        let bookmarks = self.load("get").await?;
        Ok(bookmarks.into_iter().find(|b| b.id == id))
    }

    /// Whether the given hotel/flight/package already has a bookmark
    pub async fn is_bookmarked(&self, kind: BookmarkType, reference_id: &str) -> Result<bool> {
        let bookmarks = self.load("is_bookmarked").await?;
        Ok(bookmarks.iter().any(|b| b.refers_to(kind, reference_id)))
    }

    pub async fn add_hotel_bookmark(&self, hotel: &Hotel, notes: Option<String>) -> Result<bool> {
        self.add_bookmark(hotel, notes).await
    }

    pub async fn add_flight_bookmark(&self, flight: &Flight, notes: Option<String>) -> Result<bool> {
        self.add_bookmark(flight, notes).await
    }

    pub async fn add_package_bookmark(&self, pkg: &UmrahPackage, notes: Option<String>) -> Result<bool> {
        self.add_bookmark(pkg, notes).await
    }

    /// Append a bookmark for `entity` unless one already exists
    ///
    /// Returns `false` without writing anything when the entity is already
    /// bookmarked.
    pub async fn add_bookmark<E: Bookmarkable + ?Sized>(
        &self,
        entity: &E,
        notes: Option<String>,
    ) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let kind = entity.bookmark_type();
        let mut bookmarks = self.load("add_bookmark").await?;

        if bookmarks.iter().any(|b| b.refers_to(kind, entity.reference_id())) {
            debug!("{} {} is already bookmarked", kind, entity.reference_id());
            return Ok(false);
        }

        let bookmark = Bookmark::from_entity(entity, notes);
        info!("Bookmarking {} {} as {}", kind, bookmark.reference_id, bookmark.id);
        bookmarks.push(bookmark);

        self.save("add_bookmark", &bookmarks).await?;
        Ok(true)
    }

    /// Drop the bookmark with this id; `false` if there was none
    pub async fn remove_bookmark(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut bookmarks = self.load("remove_bookmark").await?;

        let before = bookmarks.len();
        bookmarks.retain(|b| b.id != id);
        if bookmarks.len() == before {
            debug!("No bookmark with id {} to remove", id);
            return Ok(false);
        }

        info!("Removing bookmark {}", id);
        self.save("remove_bookmark", &bookmarks).await?;
        Ok(true)
    }

    /// Replace the notes of one bookmark, leaving every other field alone
    pub async fn update_bookmark_notes(&self, id: &str, notes: impl Into<String>) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut bookmarks = self.load("update_bookmark_notes").await?;

        let Some(bookmark) = bookmarks.iter_mut().find(|b| b.id == id) else {
            debug!("No bookmark with id {} to update", id);
            return Ok(false);
        };
        bookmark.notes = Some(notes.into());

        info!("Updating notes on bookmark {}", id);
        self.save("update_bookmark_notes", &bookmarks).await?;
        Ok(true)
    }

    /// Write an empty collection, whatever was there before
    pub async fn clear_all_bookmarks(&self) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        info!("Clearing all bookmarks");
        self.save("clear_all_bookmarks", &[]).await?;
        Ok(true)
    }

    async fn load(&self, operation: &'static str) -> Result<Vec<Bookmark>> {
        match self.storage.get::<Vec<Bookmark>>(&self.key, self.area).await {
            Ok(bookmarks) => Ok(bookmarks.unwrap_or_default()),
            Err(e) => {
                error!(operation, area = %self.area, "Failed to load bookmarks: {}", e);
                Err(e.into())
            }
        }
    }

    async fn load_matching(&self, operation: &'static str, filter: &BookmarkFilter) -> Result<Vec<Bookmark>> {
        let bookmarks = self.load(operation).await?;
        Ok(bookmarks.into_iter().filter(|b| filter.matches(b)).collect())
    }

    async fn save(&self, operation: &'static str, bookmarks: &[Bookmark]) -> Result<()> {
        self.storage
            .set(&self.key, bookmarks, self.area)
            .await
            .map_err(|e| {
                error!(operation, area = %self.area, "Failed to save bookmarks: {}", e);
                e.into()
            })
    }
}
