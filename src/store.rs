//! Key-value persistence for small integer preferences.
//!
//! The score tracker (and the app's tab selection) persist plain integers
//! under fixed keys. [`JsonFileStore`] keeps them in a pretty-printed JSON
//! object on disk and writes the whole file on every change.

use crate::error::Result;
use log::{error, info, warn};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Key under which the high score is stored.
pub const SCORE_KEY: &str = "userScoreKey";
/// Key under which the last selected tab is stored.
pub const SELECTED_TAB_KEY: &str = "lastSelectedTab";

/// Persistence port for integer preferences.
pub trait KeyValueStore: Send + Sync {
    /// Stored value, or 0 if the key is absent.
    fn get(&self, key: &str) -> i32;

    /// Store a value. Returns once the value is durable.
    fn set(&self, key: &str, value: i32) -> Result<()>;
}

/// Volatile store, for tests and for running without a data directory.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, i32>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> i32 {
        self.values.read().get(key).copied().unwrap_or(0)
    }

    fn set(&self, key: &str, value: i32) -> Result<()> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a JSON file.
pub struct JsonFileStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, i32>>,
}

impl JsonFileStore {
    /// Open the store, loading existing values if the file is present.
    ///
    /// A missing or unreadable file yields an empty store; it is (re)created
    /// on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = Self::load(&path);
        Self {
            path,
            values: RwLock::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> BTreeMap<String, i32> {
        match fs::read(path) {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, i32>>(&bytes) {
                Ok(values) => {
                    info!("Loaded {} stored values from {:?}", values.len(), path);
                    values
                }
                Err(e) => {
                    warn!("Failed to parse store file {:?}: {}", path, e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No stored values found at {:?} (first run)", path);
                BTreeMap::new()
            }
            Err(e) => {
                error!("Failed to read store file {:?}: {}", path, e);
                BTreeMap::new()
            }
        }
    }

    fn save(&self, values: &BTreeMap<String, i32>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(values)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> i32 {
        self.values.read().get(key).copied().unwrap_or(0)
    }

    fn set(&self, key: &str, value: i32) -> Result<()> {
        let mut values = self.values.write();
        values.insert(key.to_string(), value);
        self.save(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("heartbeat-board-store-{}-{}", name, std::process::id()))
            .join("preferences.json")
    }

    #[test]
    fn test_memory_store_defaults_to_zero() {
        let store = MemoryStore::new();
        assert_eq!(store.get(SCORE_KEY), 0);
        store.set(SCORE_KEY, 12).unwrap();
        assert_eq!(store.get(SCORE_KEY), 12);
        assert_eq!(store.get(SELECTED_TAB_KEY), 0);
    }

    #[test]
    fn test_json_store_round_trips_through_disk() {
        let path = temp_path("roundtrip");
        let _ = fs::remove_file(&path);

        let store = JsonFileStore::open(&path);
        assert_eq!(store.get(SCORE_KEY), 0);
        store.set(SCORE_KEY, 88).unwrap();
        store.set(SELECTED_TAB_KEY, 1).unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get(SCORE_KEY), 88);
        assert_eq!(reopened.get(SELECTED_TAB_KEY), 1);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_json_store_ignores_corrupt_file() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert_eq!(store.get(SCORE_KEY), 0);
        store.set(SCORE_KEY, 3).unwrap();
        assert_eq!(JsonFileStore::open(&path).get(SCORE_KEY), 3);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
