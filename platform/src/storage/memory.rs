// In-process storage backend with an optional localStorage-style byte quota.
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::StorageBackend;
use crate::error::PlatformError;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys and values together may not exceed `limit` bytes.
    pub fn with_quota(limit: usize) -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            quota_bytes: Some(limit),
        }
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    fn items(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn used_bytes(items: &HashMap<String, String>) -> usize {
    items.iter().map(|(k, v)| k.len() + v.len()).sum()
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PlatformError> {
        Ok(self.items().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), PlatformError> {
        let mut items = self.items();
        if let Some(limit) = self.quota_bytes {
            let replaced = items.get(key).map_or(0, |old| key.len() + old.len());
            let needed = used_bytes(&items) - replaced + key.len() + value.len();
            if needed > limit {
                return Err(PlatformError::QuotaExceeded { needed, limit });
            }
        }
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), PlatformError> {
        self.items().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), PlatformError> {
        self.items().clear();
        Ok(())
    }
}
