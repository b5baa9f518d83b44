use crate::bookmarks::DEFAULT_BOOKMARK_KEY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use umrah_storage::StorageArea;

/// Main configuration structure
///
/// Loaded from `config.toml` in the platform config directory. A missing
/// file just means defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub bookmarks: BookmarksConfig,
}

impl Config {
    /// Load config from the default location
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from an explicit path, defaults if it doesn't exist
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Where the page-storage file lives
    ///
    /// `storage.data_file` wins, otherwise the platform data directory.
    pub fn data_file_path(&self) -> crate::Result<PathBuf> {
        if let Some(path) = &self.storage.data_file {
            return Ok(path.clone());
        }

        Ok(dirs::data_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find data directory".into()))?
            .join("umrah-companion")
            .join("storage.json"))
    }

    /// Get the config file path
    /// Uses XDG on Linux/macOS, AppData on Windows
    pub fn config_path() -> crate::Result<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("umrah-companion")
            .join("config.toml"))
    }
}

/// Which storage mechanism to open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// Run host capability detection
    Auto,
    /// JSON file on disk, shaped like page storage
    #[default]
    Page,
    /// Nothing persists past the process
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendChoice,

    /// Override for the storage file location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,

    /// Area the bookmark collection is kept in
    #[serde(default)]
    pub bookmark_area: StorageArea,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendChoice::default(),
            data_file: None,
            bookmark_area: StorageArea::Local,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarksConfig {
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_storage_key() -> String {
    DEFAULT_BOOKMARK_KEY.to_string()
}

impl Default for BookmarksConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.backend, BackendChoice::Page);
        assert_eq!(config.storage.bookmark_area, StorageArea::Local);
        assert_eq!(config.bookmarks.storage_key, "umrah_bookmarks");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            backend = "memory"
            bookmark_area = "sync"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, BackendChoice::Memory);
        assert_eq!(config.storage.bookmark_area, StorageArea::Sync);
        assert_eq!(config.bookmarks.storage_key, "umrah_bookmarks");
    }

    #[test]
    fn test_config_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.storage.data_file = Some(dir.path().join("data.json"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.storage.data_file, config.storage.data_file);
        assert_eq!(loaded.data_file_path().unwrap(), dir.path().join("data.json"));
    }

    #[test]
    fn test_missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.storage.backend, BackendChoice::Page);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage\nbackend = ").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(crate::Error::ConfigError(_))
        ));
    }
}
