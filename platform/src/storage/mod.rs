// Best-effort key/value persistence with JSON encoding.
//
// The store never surfaces failures to callers: they are logged and, when an
// observer is attached, reported to it.
mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::settings::StorageSettings;
use crate::error::PlatformError;

/// String key/value persistence provided by the host (browser localStorage, a file, ...).
pub trait StorageBackend: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, PlatformError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), PlatformError>;
    fn remove_item(&self, key: &str) -> Result<(), PlatformError>;
    fn clear(&self) -> Result<(), PlatformError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
    Set,
    Get,
    Remove,
    Clear,
}

impl fmt::Display for StorageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageOp::Set => "set",
            StorageOp::Get => "get",
            StorageOp::Remove => "remove",
            StorageOp::Clear => "clear",
        };
        f.write_str(name)
    }
}

/// Receives the failures the store swallows.
pub trait StorageObserver: Send + Sync {
    fn on_failure(&self, op: StorageOp, key: Option<&str>, error: &PlatformError);
}

#[derive(Clone)]
pub struct KeyValueStore {
    backend: Arc<dyn StorageBackend>,
    observer: Option<Arc<dyn StorageObserver>>,
}

impl KeyValueStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn StorageObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(PlatformError::from)
            .and_then(|encoded| self.backend.set_item(key, &encoded));
        if let Err(e) = result {
            self.report(StorageOp::Set, Some(key), &e);
        }
    }

    /// Stored value for `key`, or `default` when the key is missing, empty or unreadable.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.backend.get_item(key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return default,
            Err(e) => {
                self.report(StorageOp::Get, Some(key), &e);
                return default;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                self.report(StorageOp::Get, Some(key), &e.into());
                default
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove_item(key) {
            self.report(StorageOp::Remove, Some(key), &e);
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.backend.clear() {
            self.report(StorageOp::Clear, None, &e);
        }
    }

    fn report(&self, op: StorageOp, key: Option<&str>, error: &PlatformError) {
        tracing::warn!(%op, key = key.unwrap_or("-"), error = %error, "Storage operation failed");
        if let Some(observer) = &self.observer {
            observer.on_failure(op, key, error);
        }
    }
}

/// File-backed storage when a file is configured, otherwise in-memory with the optional quota.
pub fn backend_from_settings(settings: &StorageSettings) -> Arc<dyn StorageBackend> {
    match (&settings.file, settings.quota_bytes) {
        (Some(path), _) => Arc::new(FileStorage::new(path.clone())),
        (None, Some(limit)) => Arc::new(MemoryStorage::with_quota(limit)),
        (None, None) => Arc::new(MemoryStorage::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CollectingObserver {
        failures: Mutex<Vec<(StorageOp, Option<String>)>>,
    }

    impl StorageObserver for CollectingObserver {
        fn on_failure(&self, op: StorageOp, key: Option<&str>, _error: &PlatformError) {
            self.failures.lock().unwrap().push((op, key.map(str::to_string)));
        }
    }

    struct BrokenBackend;

    impl StorageBackend for BrokenBackend {
        fn get_item(&self, _key: &str) -> Result<Option<String>, PlatformError> {
            Err(PlatformError::StorageError("unavailable".to_string()))
        }
        fn set_item(&self, _key: &str, _value: &str) -> Result<(), PlatformError> {
            Err(PlatformError::StorageError("unavailable".to_string()))
        }
        fn remove_item(&self, _key: &str) -> Result<(), PlatformError> {
            Err(PlatformError::StorageError("unavailable".to_string()))
        }
        fn clear(&self) -> Result<(), PlatformError> {
            Err(PlatformError::StorageError("unavailable".to_string()))
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Filters {
        area: String,
        year: i32,
    }

    fn memory_store() -> (Arc<MemoryStorage>, KeyValueStore) {
        let backend = Arc::new(MemoryStorage::new());
        let store = KeyValueStore::new(backend.clone());
        (backend, store)
    }

    #[test]
    fn test_set_then_get_round_trips_json() {
        let (backend, store) = memory_store();
        store.set("k", &json!({ "a": 1 }));
        assert_eq!(backend.get_item("k").unwrap().as_deref(), Some(r#"{"a":1}"#));
        let value: serde_json::Value = store.get("k", serde_json::Value::Null);
        assert_eq!(value, json!({ "a": 1 }));
    }

    #[test]
    fn test_typed_values() {
        let (_, store) = memory_store();
        let filters = Filters { area: "Consultoría".to_string(), year: 2024 };
        store.set("filters", &filters);
        let loaded: Option<Filters> = store.get("filters", None);
        assert_eq!(loaded, Some(filters));
    }

    #[test]
    fn test_missing_key_returns_default() {
        let (_, store) = memory_store();
        assert_eq!(store.get("missing", 42), 42);
    }

    #[test]
    fn test_empty_string_returns_default() {
        let (backend, store) = memory_store();
        backend.set_item("blank", "").unwrap();
        assert_eq!(store.get("blank", 7), 7);
    }

    #[test]
    fn test_corrupt_value_returns_default_and_reports() {
        let (backend, store) = memory_store();
        let observer = Arc::new(CollectingObserver::default());
        let store = store.with_observer(observer.clone());
        backend.set_item("broken", "{not json").unwrap();
        assert_eq!(store.get("broken", 5), 5);
        assert_eq!(
            *observer.failures.lock().unwrap(),
            vec![(StorageOp::Get, Some("broken".to_string()))]
        );
    }

    #[test]
    fn test_remove_and_clear() {
        let (_, store) = memory_store();
        store.set("a", &1);
        store.set("b", &2);
        store.remove("a");
        assert_eq!(store.get("a", 0), 0);
        assert_eq!(store.get("b", 0), 2);
        store.clear();
        assert_eq!(store.get("b", 0), 0);
    }

    #[test]
    fn test_backend_failures_are_swallowed() {
        let observer = Arc::new(CollectingObserver::default());
        let store = KeyValueStore::new(Arc::new(BrokenBackend)).with_observer(observer.clone());
        store.set("x", &1);
        assert_eq!(store.get("x", 3), 3);
        store.remove("x");
        store.clear();
        let ops: Vec<StorageOp> = observer.failures.lock().unwrap().iter().map(|(op, _)| *op).collect();
        assert_eq!(ops, vec![StorageOp::Set, StorageOp::Get, StorageOp::Remove, StorageOp::Clear]);
    }

    #[test]
    fn test_backend_from_settings() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        let file_backed = backend_from_settings(&StorageSettings {
            file: Some(path.clone()),
            quota_bytes: None,
        });
        KeyValueStore::new(file_backed).set("tema", "oscuro");
        assert!(path.exists());

        let limited = backend_from_settings(&StorageSettings {
            file: None,
            quota_bytes: Some(4),
        });
        assert!(limited.set_item("clave", "valor").is_err());
        assert!(backend_from_settings(&StorageSettings::default()).set_item("clave", "valor").is_ok());
    }

    #[test]
    fn test_quota_exceeded_is_swallowed() {
        let backend = Arc::new(MemoryStorage::with_quota(16));
        let observer = Arc::new(CollectingObserver::default());
        let store = KeyValueStore::new(backend).with_observer(observer.clone());
        store.set("big", &"x".repeat(64));
        assert_eq!(store.get("big", String::new()), "");
        assert_eq!(observer.failures.lock().unwrap()[0].0, StorageOp::Set);
    }
}
