//! Persistent key/value storage for client settings.
//!
//! The configuration store only ever needs string keys and string values, so
//! persistence sits behind [`KeyValueStore`] and can be swapped for
//! [`MemoryStore`] in tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

pub trait KeyValueStore {
    /// Absence is a normal case and reads as `None`.
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// Write several entries as one unit: either all of them land or the
    /// store is left as it was.
    ///
    /// The default writes one key at a time and puts earlier keys back when a
    /// later write fails.
    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut written: Vec<(&str, Option<String>)> = Vec::with_capacity(entries.len());

        for &(key, value) in entries {
            let previous = self.get(key);
            if let Err(e) = self.set(key, value) {
                for (key, previous) in written.into_iter().rev() {
                    let restored = match previous {
                        Some(previous) => self.set(key, &previous),
                        None => self.remove(key),
                    };
                    if let Err(restore_err) = restored {
                        tracing::warn!(key, error = %restore_err, "failed to roll back config store entry");
                    }
                }
                return Err(e);
            }
            written.push((key, previous));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values.remove(key);
        Ok(())
    }
}

/// A flat JSON object on disk, e.g. `~/.config/smartdoc/config.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::read(&path) {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config store");
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::open(Self::default_path()?))
    }

    pub fn default_path() -> Result<PathBuf, StoreError> {
        let config_dir = dirs::config_dir().ok_or(StoreError::NoConfigDir)?;
        Ok(config_dir.join("smartdoc").join("config.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value)])
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if !self.values.contains_key(key) {
            return Ok(());
        }
        let mut next = self.values.clone();
        next.remove(key);
        self.flush(&next)?;
        self.values = next;
        Ok(())
    }

    /// One file write for the whole batch.
    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut next = self.values.clone();
        for &(key, value) in entries {
            next.insert(key.to_string(), value.to_string());
        }
        // Only commit in memory once the write made it to disk.
        self.flush(&next)?;
        self.values = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nope.json"));
        assert_eq!(store.get("smartdoc_api_url"), None);
    }

    #[test]
    fn test_set_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut store = FileStore::open(&path);
        store.set("smartdoc_user_id", "bob").unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("smartdoc_user_id").as_deref(), Some("bob"));
    }

    #[test]
    fn test_corrupt_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get("smartdoc_api_url"), None);
    }

    #[test]
    fn test_failed_write_keeps_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        // The store path is a directory, so the write must fail.
        let mut store = FileStore::open(dir.path());
        assert!(store.set("smartdoc_user_id", "bob").is_err());
        assert_eq!(store.get("smartdoc_user_id"), None);
    }

    #[test]
    fn test_failed_batch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path());
        store.values.insert("smartdoc_user_id".to_string(), "alice".to_string());

        let result = store.set_many(&[("smartdoc_api_url", "https://new.example.com"), ("smartdoc_user_id", "bob")]);
        assert!(result.is_err());
        assert_eq!(store.get("smartdoc_api_url"), None);
        assert_eq!(store.get("smartdoc_user_id").as_deref(), Some("alice"));
    }

    #[test]
    fn test_batch_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut store = FileStore::open(&path);
        store
            .set_many(&[("smartdoc_api_url", "https://api.example.com"), ("smartdoc_user_id", "bob")])
            .unwrap();
        store.remove("smartdoc_api_url").unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("smartdoc_api_url"), None);
        assert_eq!(reopened.get("smartdoc_user_id").as_deref(), Some("bob"));
    }

    /// Refuses writes to one key, like a disk that fills up mid-batch.
    struct FailingOn {
        inner: MemoryStore,
        key: &'static str,
    }

    impl KeyValueStore for FailingOn {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            if key == self.key {
                return Err(StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")));
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_default_batch_rolls_back_earlier_keys() {
        let mut store = FailingOn {
            inner: MemoryStore::new().with("a", "old"),
            key: "c",
        };

        assert!(store.set_many(&[("a", "new"), ("b", "added"), ("c", "boom")]).is_err());
        assert_eq!(store.get("a").as_deref(), Some("old"));
        assert_eq!(store.get("b"), None);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new().with("a", "1");
        store.set("b", "2").unwrap();
        assert_eq!(store.get("a").as_deref(), Some("1"));
        assert_eq!(store.get("b").as_deref(), Some("2"));
    }
}
