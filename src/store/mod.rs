//! Storage module for caredesk.
//!
//! Every collection the services persist goes through the [`Repository`]
//! trait: a string-keyed collection with `get/put/patch/remove/list`.
//! [`MemoryStore`] backs tests, [`JsonFileStore`] mirrors a collection to a
//! single JSON document on disk.

mod json_file;
mod memory;

pub use json_file::{JsonFileStore, Layout};
pub use memory::MemoryStore;

use std::sync::{Mutex, MutexGuard};

use crate::Result;

/// Keyed collection of values.
///
/// Implementations must apply each call atomically: a failed write leaves
/// the previous contents visible.
pub trait Repository<V>: Send + Sync {
    /// Get the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<V>>;

    /// Insert or replace the value under `key`.
    fn put(&self, key: &str, value: V) -> Result<()>;

    /// Modify the value under `key` in place.
    ///
    /// Returns the updated value, or `None` if the key is absent (in which
    /// case nothing is written).
    fn patch(&self, key: &str, apply: &mut dyn FnMut(&mut V)) -> Result<Option<V>>;

    /// Remove the value under `key`, returning it if it existed.
    fn remove(&self, key: &str) -> Result<Option<V>>;

    /// All entries, ordered by key.
    fn list(&self) -> Result<Vec<(String, V)>>;
}

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
