// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Local key-value cache.
//!
//! The class table is the only state that outlives a session. It is kept
//! under a fixed key as the JSON form of the table, in whatever store the
//! application hands to the session.

use crate::error::StoreError;
use crate::models::classes::ClassTable;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Key the class table is stored under.
pub const CLASSES_KEY: &str = "annotator-classes";

/// A string-to-string cache.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// In-memory store, lost on exit.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a single JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// An unparsable file is moved aside to `<path>.bak` and the store starts
    /// empty, so the next `set` writes a fresh file in its place.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(entries) => entries,
                Err(e) => {
                    let backup = Self::backup_path(&path);
                    log::warn!(
                        "Unparsable store {} ({}), moving it to {}",
                        path.display(),
                        e,
                        backup.display()
                    );
                    if let Err(e) = std::fs::rename(&path, &backup) {
                        log::warn!("Could not back up {}: {}", path.display(), e);
                    }
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self { path, entries })
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".bak");
        PathBuf::from(name)
    }

    fn flush(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, json).map_err(io_err)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }
}

/// Read the persisted class table. `None` if nothing usable is stored.
pub fn load_classes(store: &dyn KeyValueStore) -> Option<ClassTable> {
    let json = match store.get(CLASSES_KEY) {
        Ok(Some(json)) => json,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Could not read stored classes: {}", e);
            return None;
        }
    };
    match serde_json::from_str(&json) {
        Ok(table) => Some(table),
        Err(e) => {
            log::warn!("Ignoring unparsable stored classes: {}", e);
            None
        }
    }
}

pub fn save_classes(store: &mut dyn KeyValueStore, classes: &ClassTable) -> Result<(), StoreError> {
    let json = serde_json::to_string(classes)?;
    store.set(CLASSES_KEY, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::ClassId;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("boxlabel-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_classes_roundtrip_through_store() {
        let mut store = MemoryStore::new();
        assert!(load_classes(&store).is_none());

        let mut table = ClassTable::with_defaults();
        table.rename(ClassId(1), "person");
        save_classes(&mut store, &table).unwrap();
        assert_eq!(load_classes(&store), Some(table));
    }

    #[test]
    fn test_garbage_is_ignored() {
        let mut store = MemoryStore::new();
        store.set(CLASSES_KEY, "{not json".to_string()).unwrap();
        assert!(load_classes(&store).is_none());
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let path = temp_path("persist");
        let _ = std::fs::remove_file(&path);

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v".to_string()).unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap(), Some("v".to_string()));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_store_recovers_from_corrupt_file() {
        let path = temp_path("corrupt");
        let backup = FileStore::backup_path(&path);
        let _ = std::fs::remove_file(&backup);
        std::fs::write(&path, "{truncated").unwrap();

        let mut store = FileStore::open(&path).unwrap();
        assert!(load_classes(&store).is_none());
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "{truncated");

        let mut table = ClassTable::with_defaults();
        table.add();
        save_classes(&mut store, &table).unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(load_classes(&reopened), Some(table));

        std::fs::remove_file(&path).unwrap();
        std::fs::remove_file(&backup).unwrap();
    }
}
