//! Runtime configuration namespace
//!
//! A small name → value map read and written through `CONFIG GET` / `CONFIG SET`
//! and read once at startup for the listen address. It has its own lock,
//! independent of the key space.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Default entries every store starts with.
pub const DEFAULTS: &[(&str, &str)] = &[
    ("port", "6379"),
    ("bind", "0.0.0.0"),
    // Advisory only, not enforced.
    ("max_clients", "10000"),
    // Advisory only, not enforced.
    ("timeout", "0"),
];

/// Thread-safe configuration map.
///
/// Names and values are plain strings and are matched literally.
#[derive(Debug)]
pub struct ConfigStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    /// Creates a store seeded with [`DEFAULTS`].
    pub fn new() -> Self {
        let entries = DEFAULTS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Inserts or replaces an entry.
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(name.into(), value.into());
    }

    /// Returns the value for `name`, or `None` when it has never been set.
    pub fn get(&self, name: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(name).cloned()
    }

    /// Snapshot of every entry, ordered by name.
    pub fn entries(&self) -> Vec<(String, String)> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
