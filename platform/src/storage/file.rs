// Storage backend persisted as a single JSON object on disk; the headless stand-in
// for the browser's localStorage. Every write rewrites the whole file (last write wins).
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::StorageBackend;
use crate::error::PlatformError;

type Items = BTreeMap<String, String>;

#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Items, PlatformError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Items::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                PlatformError::StorageError(format!(
                    "corrupt storage file {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Items::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, items: &Items) -> Result<(), PlatformError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(items)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update(&self, change: impl FnOnce(&mut Items)) -> Result<(), PlatformError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = match self.load() {
            Ok(items) => items,
            // A corrupt file is replaced on the next write instead of blocking every write.
            Err(e @ PlatformError::StorageError(_)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Resetting corrupt storage file");
                Items::new()
            }
            Err(e) => return Err(e),
        };
        change(&mut items);
        self.save(&items)
    }
}

impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PlatformError> {
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PlatformError> {
        self.update(|items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), PlatformError> {
        self.update(|items| {
            items.remove(key);
        })
    }

    fn clear(&self) -> Result<(), PlatformError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.save(&Items::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::KeyValueStore;
    use std::sync::Arc;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let store = KeyValueStore::new(Arc::new(FileStorage::new(&path)));
        store.set("ultimo_cliente", &"ACME");
        store.set("pagina", &3);

        let reopened = KeyValueStore::new(Arc::new(FileStorage::new(&path)));
        assert_eq!(reopened.get("ultimo_cliente", String::new()), "ACME");
        assert_eq!(reopened.get("pagina", 1), 3);
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("storage.json"));
        assert_eq!(storage.get_item("k").unwrap(), None);
        storage.set_item("k", "1").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_remove_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));
        storage.set_item("a", "1").unwrap();
        storage.set_item("b", "2").unwrap();
        storage.remove_item("a").unwrap();
        assert_eq!(storage.get_item("a").unwrap(), None);
        storage.clear().unwrap();
        assert_eq!(storage.get_item("b").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "[1, 2").unwrap();
        let err = FileStorage::new(&path).get_item("k").unwrap_err();
        assert!(err.to_string().contains("corrupt storage file"));
    }

    #[test]
    fn test_store_recovers_from_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();

        let store = KeyValueStore::new(Arc::new(FileStorage::new(&path)));
        store.clear();
        store.set("k", &1);
        assert_eq!(store.get("k", 0), 1);
    }

    #[test]
    fn test_write_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::new(&path);
        storage.set_item("tema", "\"oscuro\"").unwrap();
        assert_eq!(storage.get_item("tema").unwrap().as_deref(), Some("\"oscuro\""));
        storage.remove_item("tema").unwrap();
        assert_eq!(storage.get_item("tema").unwrap(), None);
    }
}
