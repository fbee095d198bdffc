//! Key-value persistence
//!
//! Leaderboard and settings are stored as JSON strings under fixed keys.
//! Backends:
//! - `MemoryStorage`: in-process map (native runs, tests)
//! - `LocalStorage`: browser localStorage (wasm32 only)
//!
//! Callers never let a storage failure reach the game loop: reads degrade to
//! defaults and failed writes are logged.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage failure
#[derive(Error, Debug)]
pub enum StorageError {
    /// No backing store (private browsing, missing window)
    #[error("storage unavailable")]
    Unavailable,

    /// Backend rejected the operation (quota, security policy)
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Stored value was not valid JSON for the expected type
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// String key-value store
pub trait Storage {
    /// Read a value; `Ok(None)` when the key is absent
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value (absent keys are fine)
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<T: Storage + ?Sized> Storage for Box<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// Read and decode a JSON value
pub fn load_json<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match storage.get_item(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON value
pub fn save_json<T: Serialize>(
    storage: &mut dyn Storage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;
    storage.set_item(key, &json)
}

/// In-memory storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Storage that is never available
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStorage;

impl Storage for NullStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    fn remove_item(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

/// Browser localStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    inner: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    /// None when the page has no usable localStorage
    pub fn open() -> Option<Self> {
        let inner = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()?;
        Some(Self { inner })
    }
}

#[cfg(target_arch = "wasm32")]
fn js_error(err: wasm_bindgen::JsValue) -> StorageError {
    StorageError::Backend(format!("{:?}", err))
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key).map_err(js_error)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set_item(key, value).map_err(js_error)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key).map_err(js_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_round_trip() {
        let mut storage = MemoryStorage::new();
        assert!(storage.get_item("k").unwrap().is_none());
        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));
        storage.remove_item("k").unwrap();
        assert!(storage.get_item("k").unwrap().is_none());
    }

    #[test]
    fn test_load_json_reports_malformed_data() {
        let mut storage = MemoryStorage::new();
        storage.set_item("nums", "[1, 2,").unwrap();
        let result = load_json::<Vec<u32>>(&storage, "nums");
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_json_helpers() {
        let mut storage = MemoryStorage::new();
        save_json(&mut storage, "nums", &vec![3u32, 1]).unwrap();
        let nums: Option<Vec<u32>> = load_json(&storage, "nums").unwrap();
        assert_eq!(nums, Some(vec![3, 1]));
        let missing: Option<Vec<u32>> = load_json(&storage, "other").unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_boxed_backend() {
        let mut storage: Box<dyn Storage> = Box::new(MemoryStorage::new());
        save_json(&mut storage, "k", &7u32).unwrap();
        assert_eq!(load_json::<u32>(&storage, "k").unwrap(), Some(7));
    }

    #[test]
    fn test_null_storage_is_unavailable() {
        let mut storage = NullStorage;
        assert!(matches!(storage.get_item("k"), Err(StorageError::Unavailable)));
        assert!(storage.set_item("k", "v").is_err());
    }
}
