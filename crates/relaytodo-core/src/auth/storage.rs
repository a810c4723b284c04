//! Key-value backends for session persistence.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::{debug, warn};

/// Keychain service name for the keyring backend
const SERVICE_NAME: &str = "relaytodo";

/// Storage file name in cache directory
const STORAGE_FILE: &str = "storage.json";

/// String-to-string storage with `localStorage` semantics.
pub trait KeyValueStore {
    /// Read a value. Backends report unreadable data as `None`.
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }
}

/// In-process store, lost on exit.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// A JSON object on disk, rewritten on every change.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            path: cache_dir.join(STORAGE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        if !self.path.exists() {
            return BTreeMap::new();
        }
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(error = %e, path = ?self.path, "Failed to read storage file");
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!(error = %e, path = ?self.path, "Failed to parse storage file");
            BTreeMap::new()
        })
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create storage directory")?;
        }
        let contents = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, contents).context("Failed to write storage file")?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let mut items = self.read_all();
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        let mut items = self.read_all();
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

/// Stores each key as an entry in the OS keychain.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key).context("Failed to create keyring entry")
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for KeyringStore {
    fn get_item(&self, key: &str) -> Option<String> {
        let entry = self.entry(key).ok()?;
        match entry.get_password() {
            Ok(value) => Some(value),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(error = %e, key, "Failed to read from keychain");
                None
            }
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.entry(key)?
            .set_password(value)
            .context("Failed to store value in keychain")
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => {
                debug!(key, "Keychain entry already absent");
                Ok(())
            }
            Err(e) => Err(e).context("Failed to delete value from keychain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_basics() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        store.set_item("a", "1").unwrap();
        assert_eq!(store.get_item("a").as_deref(), Some("1"));
        store.set_item("a", "2").unwrap();
        assert_eq!(store.get_item("a").as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
        store.remove_item("a").unwrap();
        store.remove_item("a").unwrap();
        assert_eq!(store.get_item("a"), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = FileStore::new(dir.path());
            store.set_item("@relayTodo:token", "t1").unwrap();
        }
        let store = FileStore::new(dir.path());
        assert_eq!(store.get_item("@relayTodo:token").as_deref(), Some("t1"));
    }

    #[test]
    fn test_file_store_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut store = FileStore::new(&nested);
        store.set_item("k", "v").unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_file_store_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STORAGE_FILE), "not json").unwrap();
        let mut store = FileStore::new(dir.path());
        assert_eq!(store.get_item("k"), None);

        // Writing replaces the corrupt contents
        store.set_item("k", "v").unwrap();
        assert_eq!(store.get_item("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_file_store_remove_missing_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.remove_item("missing").unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_boxed_store_delegates() {
        let mut store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        store.set_item("k", "v").unwrap();
        assert_eq!(store.get_item("k").as_deref(), Some("v"));
        store.remove_item("k").unwrap();
        assert_eq!(store.get_item("k"), None);
    }
}
