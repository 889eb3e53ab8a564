//! JSON document repository.
//!
//! Each store owns one file holding the whole collection. The document is
//! loaded once at open time and written back in full after every mutation,
//! through a temporary file that is renamed over the target.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info};

use super::{lock, Repository};
use crate::{CaredeskError, Result};

/// On-disk shape of a collection.
pub enum Layout<V> {
    /// A JSON object mapping key to value.
    Map,
    /// A JSON array of values; the key is derived from each value.
    List(fn(&V) -> String),
}

impl<V> Layout<V> {
    fn empty_document(&self) -> &'static str {
        match self {
            Layout::Map => "{}",
            Layout::List(_) => "[]",
        }
    }
}

/// Repository persisted as a single JSON file.
pub struct JsonFileStore<V> {
    path: PathBuf,
    layout: Layout<V>,
    entries: Mutex<BTreeMap<String, V>>,
}

impl<V> JsonFileStore<V>
where
    V: Serialize + DeserializeOwned + Clone + Send,
{
    /// Open a store whose document is a JSON object.
    pub fn open_map(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path.as_ref(), Layout::Map)
    }

    /// Open a store whose document is a JSON array, keyed by `key_of`.
    pub fn open_list(path: impl AsRef<Path>, key_of: fn(&V) -> String) -> Result<Self> {
        Self::open(path.as_ref(), Layout::List(key_of))
    }

    fn open(path: &Path, layout: Layout<V>) -> Result<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, layout.empty_document())?;
            info!(path = %path.display(), "Created empty store");
        }

        let content = fs::read_to_string(path)?;
        let entries = Self::parse(path, &content, &layout)?;
        debug!(path = %path.display(), entries = entries.len(), "Store loaded");

        Ok(Self {
            path: path.to_path_buf(),
            layout,
            entries: Mutex::new(entries),
        })
    }

    fn parse(path: &Path, content: &str, layout: &Layout<V>) -> Result<BTreeMap<String, V>> {
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        let corrupt = |source: serde_json::Error| {
            error!(path = %path.display(), error = %source, "Store document is corrupt");
            CaredeskError::CorruptStore {
                path: path.to_path_buf(),
                source,
            }
        };

        match layout {
            Layout::Map => serde_json::from_str(content).map_err(corrupt),
            Layout::List(key_of) => {
                let values: Vec<V> = serde_json::from_str(content).map_err(corrupt)?;
                let mut entries = BTreeMap::new();
                for value in values {
                    let key = key_of(&value);
                    if entries.contains_key(&key) {
                        // Keeping either copy would drop the other on the next write.
                        return Err(corrupt(serde::de::Error::custom(format!(
                            "duplicate key `{key}`"
                        ))));
                    }
                    entries.insert(key, value);
                }
                Ok(entries)
            }
        }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, V>) -> Result<()> {
        let bytes = match self.layout {
            Layout::Map => serde_json::to_vec_pretty(entries)?,
            Layout::List(_) => serde_json::to_vec_pretty(&entries.values().collect::<Vec<_>>())?,
        };

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path).inspect_err(|e| {
            error!(path = %self.path.display(), error = %e, "Failed to replace store document");
        })?;
        Ok(())
    }

    /// Apply `f` to a copy of the collection, write it out, then commit it.
    fn mutate<R>(&self, f: impl FnOnce(&mut BTreeMap<String, V>) -> R) -> Result<R> {
        let mut entries = lock(&self.entries);
        let mut next = entries.clone();
        let result = f(&mut next);
        self.persist(&next)?;
        *entries = next;
        Ok(result)
    }
}

impl<V> Repository<V> for JsonFileStore<V>
where
    V: Serialize + DeserializeOwned + Clone + Send,
{
    fn get(&self, key: &str) -> Result<Option<V>> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn put(&self, key: &str, value: V) -> Result<()> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    fn patch(&self, key: &str, apply: &mut dyn FnMut(&mut V)) -> Result<Option<V>> {
        if !lock(&self.entries).contains_key(key) {
            return Ok(None);
        }
        self.mutate(|entries| {
            entries.get_mut(key).map(|value| {
                apply(value);
                value.clone()
            })
        })
    }

    fn remove(&self, key: &str) -> Result<Option<V>> {
        if !lock(&self.entries).contains_key(key) {
            return Ok(None);
        }
        self.mutate(|entries| entries.remove(key))
    }

    fn list(&self) -> Result<Vec<(String, V)>> {
        Ok(lock(&self.entries)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
