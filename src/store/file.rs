//! File-based store with atomic writes.
//!
//! All entries live in one JSON document under
//! `dirs::data_dir()/<namespace>/store.json`. Every mutation rewrites the
//! whole document through a temp file + rename, so a multi-key update or
//! removal is either fully on disk or not at all.

use crate::store::KeyValueStore;
use crate::LicenseError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const STORE_FILE: &str = "store.json";

/// File-based store backend.
pub struct FileStore {
    /// Path of the JSON document.
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a new file store with the given namespace.
    ///
    /// The document is stored under `dirs::data_dir()/<namespace>/`.
    pub fn new(namespace: &str) -> Result<Self, LicenseError> {
        let base_dir = dirs::data_dir()
            .ok_or_else(|| LicenseError::StoreIO("Could not find data directory".to_string()))?;

        Self::with_dir(base_dir.join(namespace))
    }

    /// Create a file store in a specific directory.
    pub fn with_dir(dir: PathBuf) -> Result<Self, LicenseError> {
        fs::create_dir_all(&dir)
            .map_err(|e| LicenseError::StoreIO(format!("Failed to create store dir: {}", e)))?;

        Ok(Self {
            path: dir.join(STORE_FILE),
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, LicenseError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let json = fs::read_to_string(&self.path)
            .map_err(|e| LicenseError::StoreIO(format!("Failed to read store file: {}", e)))?;

        serde_json::from_str(&json)
            .map_err(|e| LicenseError::StoreIO(format!("Failed to parse store file: {}", e)))
    }

    /// Write the whole document atomically.
    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), LicenseError> {
        let temp_path = self.path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| LicenseError::StoreIO(format!("Failed to serialize store: {}", e)))?;

        fs::write(&temp_path, &json)
            .map_err(|e| LicenseError::StoreIO(format!("Failed to write temp file: {}", e)))?;

        fs::rename(&temp_path, &self.path)
            .map_err(|e| LicenseError::StoreIO(format!("Failed to rename store file: {}", e)))?;

        Ok(())
    }

    /// Read-modify-write under the write lock. The document is only
    /// rewritten when `mutate` returns `true`.
    fn update(
        &self,
        mutate: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<bool, LicenseError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| LicenseError::StoreIO("file store lock poisoned".to_string()))?;

        let mut entries = self.load()?;
        if !mutate(&mut entries) {
            return Ok(false);
        }
        self.save(&entries)?;
        Ok(true)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, LicenseError> {
        Ok(self.load()?.remove(key))
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), LicenseError> {
        self.update(|map| {
            insert_all(map, entries);
            true
        })?;
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), LicenseError> {
        self.update(|map| {
            for key in keys {
                map.remove(*key);
            }
            true
        })?;
        Ok(())
    }

    fn set_many_if(
        &self,
        guard_key: &str,
        expected: &str,
        entries: &[(&str, String)],
    ) -> Result<bool, LicenseError> {
        self.update(|map| {
            if map.get(guard_key).map(String::as_str) != Some(expected) {
                return false;
            }
            insert_all(map, entries);
            true
        })
    }
}

fn insert_all(map: &mut BTreeMap<String, String>, entries: &[(&str, String)]) {
    for (key, value) in entries {
        map.insert((*key).to_string(), value.clone());
    }
}
