//! In-memory repository.

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{lock, Repository};
use crate::Result;

/// Repository held entirely in memory.
#[derive(Debug)]
pub struct MemoryStore<V> {
    entries: Mutex<BTreeMap<String, V>>,
}

impl<V> MemoryStore<V> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Create a store pre-populated with `entries`.
    pub fn with_entries(entries: impl IntoIterator<Item = (String, V)>) -> Self {
        Self {
            entries: Mutex::new(entries.into_iter().collect()),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send> Repository<V> for MemoryStore<V> {
    fn get(&self, key: &str) -> Result<Option<V>> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn put(&self, key: &str, value: V) -> Result<()> {
        lock(&self.entries).insert(key.to_string(), value);
        Ok(())
    }

    fn patch(&self, key: &str, apply: &mut dyn FnMut(&mut V)) -> Result<Option<V>> {
        let mut entries = lock(&self.entries);
        Ok(entries.get_mut(key).map(|value| {
            apply(value);
            value.clone()
        }))
    }

    fn remove(&self, key: &str) -> Result<Option<V>> {
        Ok(lock(&self.entries).remove(key))
    }

    fn list(&self) -> Result<Vec<(String, V)>> {
        Ok(lock(&self.entries)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
