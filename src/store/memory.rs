//! In-memory store.

use crate::store::KeyValueStore;
use crate::LicenseError;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Store backed by a map behind a single lock.
///
/// Useful for tests and for hosts that persist state themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    /// Copy of every entry.
    pub fn snapshot(&self) -> Result<BTreeMap<String, String>, LicenseError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, LicenseError> {
        self.entries
            .lock()
            .map_err(|_| LicenseError::StoreIO("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, LicenseError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), LicenseError> {
        let mut map = self.lock()?;
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), LicenseError> {
        let mut map = self.lock()?;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }

    fn set_many_if(
        &self,
        guard_key: &str,
        expected: &str,
        entries: &[(&str, String)],
    ) -> Result<bool, LicenseError> {
        let mut map = self.lock()?;
        if map.get(guard_key).map(String::as_str) != Some(expected) {
            return Ok(false);
        }
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(true)
    }
}
