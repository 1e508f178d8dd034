//! Key-value persistence contract and the in-memory backend.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::errors::Result;

/// Opaque string storage that survives process restarts (for persistent
/// backends).
///
/// A missing key is `Ok(None)`, never an error. Multi-key operations are
/// all-or-nothing from the caller's point of view: on `Err`, the caller must
/// assume none of the changes were applied.
pub trait KeyValueStore: Send + Sync {
    /// Read one value.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write one value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Write several values in one step.
    fn set_all(&self, entries: &[(&str, &str)]) -> Result<()>;

    /// Remove several keys in one step. Absent keys are ignored.
    fn remove_all(&self, keys: &[&str]) -> Result<()>;
}

/// Process-local store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: seed a value (used by tests before wrapping in `Arc`).
    #[must_use]
    pub fn with(self, key: &str, value: &str) -> Self {
        let _ = self.entries.lock().insert(key.to_string(), value.to_string());
        self
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _ = self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut map = self.entries.lock();
        for (key, value) in entries {
            let _ = map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.entries.lock();
        for key in keys {
            let _ = map.remove(*key);
        }
        Ok(())
    }
}
