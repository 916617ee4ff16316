//! Thread-Safe Key-Value Store
//!
//! The key space is one `HashMap` behind one `RwLock`: reads share the lock,
//! every write holds it exclusively for a single map operation, so a reader
//! sees either the previous value or the new one in full.
//!
//! Multi-key operations such as [`StorageEngine::delete_many`] take the lock
//! once per key; they are not atomic as a batch.

use crate::storage::config::ConfigStore;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// The key-value store shared by every connection.
///
/// Wrap it in an `Arc` and hand a clone to each connection's
/// [`CommandHandler`](crate::commands::CommandHandler).
///
/// # Example
///
/// ```
/// use fluxdb::storage::StorageEngine;
/// use bytes::Bytes;
///
/// let engine = StorageEngine::new();
///
/// engine.set(Bytes::from("foo"), Bytes::from("bar"));
/// assert_eq!(engine.get(b"foo"), Some(Bytes::from("bar")));
///
/// assert!(engine.delete(b"foo"));
/// assert_eq!(engine.get(b"foo"), None);
/// ```
#[derive(Debug, Default)]
pub struct StorageEngine {
    /// Keys and their values
    data: RwLock<HashMap<Bytes, Bytes>>,

    /// Runtime configuration, locked separately from `data`
    config: ConfigStore,
}

impl StorageEngine {
    /// Creates an empty key space with the default configuration.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            config: ConfigStore::new(),
        }
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Returns
    ///
    /// Returns `true` if a new key was created, `false` if an existing key was updated.
    pub fn set(&self, key: Bytes, value: Bytes) -> bool {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.insert(key, value).is_none()
    }

    /// Returns the value for `key`, or `None` if it is absent.
    ///
    /// An empty value is `Some(Bytes::new())`, never `None`.
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        data.get(key).cloned()
    }

    /// Removes `key`.
    ///
    /// # Returns
    ///
    /// Returns `true` if the key was deleted, `false` if it didn't exist.
    pub fn delete(&self, key: &[u8]) -> bool {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.remove(key).is_some()
    }

    /// Removes each key in turn.
    ///
    /// # Returns
    ///
    /// Returns the number of keys that were actually deleted.
    pub fn delete_many(&self, keys: &[Bytes]) -> u64 {
        keys.iter().filter(|key| self.delete(key)).count() as u64
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts or replaces a configuration entry.
    pub fn set_config(&self, name: impl Into<String>, value: impl Into<String>) {
        self.config.set(name, value);
    }

    /// Returns a configuration value, or `None` if the name is unset.
    pub fn get_config(&self, name: &str) -> Option<String> {
        self.config.get(name)
    }

    /// Every configuration entry, ordered by name.
    pub fn config_entries(&self) -> Vec<(String, String)> {
        self.config.entries()
    }
}
