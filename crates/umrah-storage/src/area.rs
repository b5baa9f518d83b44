use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Named partition of the key-value store
///
/// Both areas support the exact same operations. `Sync` is meant for data
/// the host may replicate across the user's devices, `Local` stays on this
/// one. Which of the two survives a reinstall is the host's business.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    #[default]
    Local,
    Sync,
}

impl StorageArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageArea::Local => "local",
            StorageArea::Sync => "sync",
        }
    }
}

impl std::fmt::Display for StorageArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageArea {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(StorageArea::Local),
            "sync" => Ok(StorageArea::Sync),
            other => Err(format!("unknown storage area '{}' (expected local or sync)", other)),
        }
    }
}
