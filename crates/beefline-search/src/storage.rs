//! Key-value storage port with JSON helpers.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::StorageError;

/// String key-value storage, such as browser local storage or a file.
pub trait KeyValueStore: Send + Sync {
    /// Get a value. Returns `None` if the key doesn't exist.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Set a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing a missing key is not an error.
    fn clear(&self, key: &str) -> Result<(), StorageError>;
}

/// Get a value and deserialize it from JSON.
///
/// ```rust,ignore
/// let history: Option<Vec<HistoryEntry>> = get_json(&store, "beefline-search-history")?;
/// ```
pub fn get_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize a value to JSON and store it.
pub fn set_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Store persisted as a single JSON object of string values.
///
/// The file is read on every access so several processes can share it. A
/// missing file is an empty store.
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// reader sees either the old or the new contents and never an empty file.
/// Writers are serialized within a process only; across processes the last
/// writer wins.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(entries)?;
        let tmp = self.temp_path()?;
        fs::write(&tmp, raw)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf, StorageError> {
        let name = self.path.file_name().ok_or_else(|| {
            StorageError::Unavailable(format!("{} is not a file path", self.path.display()))
        })?;
        let mut tmp_name = name.to_os_string();
        tmp_name.push(format!(".{}.tmp", std::process::id()));
        Ok(self.path.with_file_name(tmp_name))
    }

    fn update<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        let mut entries = self.load()?;
        if f(&mut entries) {
            self.save(&entries)?;
        }
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("beefline-storage-{}-{}", std::process::id(), name))
            .join("store.json")
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("authToken").unwrap(), None);

        store.set("authToken", "abc").unwrap();
        assert_eq!(store.get("authToken").unwrap().as_deref(), Some("abc"));

        store.clear("authToken").unwrap();
        store.clear("authToken").unwrap();
        assert_eq!(store.get("authToken").unwrap(), None);
    }

    #[test]
    fn test_json_helpers() {
        let store = MemoryStore::new();
        set_json(&store, "numbers", &vec![1, 2, 3]).unwrap();
        let numbers: Option<Vec<u32>> = get_json(&store, "numbers").unwrap();
        assert_eq!(numbers, Some(vec![1, 2, 3]));

        store.set("broken", "{not json").unwrap();
        let broken: Result<Option<Vec<u32>>, _> = get_json(&store, "broken");
        assert!(matches!(broken, Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_file_store_persists() {
        let path = temp_path("persist");
        let _ = fs::remove_file(&path);

        let store = JsonFileStore::new(&path);
        assert_eq!(store.get("authToken").unwrap(), None);
        store.set("authToken", "abc").unwrap();
        store.set("other", "1").unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("authToken").unwrap().as_deref(), Some("abc"));

        reopened.clear("authToken").unwrap();
        assert_eq!(store.get("authToken").unwrap(), None);
        assert_eq!(store.get("other").unwrap().as_deref(), Some("1"));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_store_readers_never_see_partial_writes() {
        let path = temp_path("concurrent");
        let _ = fs::remove_dir_all(path.parent().unwrap());

        let store = Arc::new(JsonFileStore::new(&path));
        store.set("authToken", "abc").unwrap();

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..500 {
                    store.set("history", &format!("[\"term {}\"]", i)).unwrap();
                }
            })
        };

        let mut missing = 0;
        while !writer.is_finished() {
            if store.get("authToken").unwrap().as_deref() != Some("abc") {
                missing += 1;
            }
        }
        writer.join().unwrap();

        assert_eq!(missing, 0);
        assert_eq!(store.get("history").unwrap().as_deref(), Some("[\"term 499\"]"));

        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name() != "store.json")
            .collect();
        assert!(leftovers.is_empty());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[1, 2").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.get("x"), Err(StorageError::Serialization(_))));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
