// Bookmark core for the Umrah companion
// Data model, the bookmark repository and the config that wires storage up.
pub mod bookmarks;
pub mod config;
pub mod error;
pub mod host;
pub mod models;

pub use bookmarks::{BookmarkRepository, DEFAULT_BOOKMARK_KEY};
pub use config::{BackendChoice, Config};
pub use error::Error;
pub use host::open_storage;
pub use models::{
    Bookmark, BookmarkFilter, BookmarkType, Bookmarkable, City, Flight, Hotel, PriceRange,
    UmrahPackage,
};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
