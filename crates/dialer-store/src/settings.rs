//! Persisted socket endpoint.

use std::sync::Arc;

use crate::KEY_ENDPOINT;
use crate::errors::Result;
use crate::kv::KeyValueStore;

/// Reads and writes the operator-chosen socket endpoint.
#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    /// Wrap a key-value backend.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The saved endpoint, if any. Blank values count as unset.
    pub fn endpoint(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(KEY_ENDPOINT)?
            .filter(|url| !url.trim().is_empty()))
    }

    /// Persist `url` as the endpoint for future runs.
    pub fn save_endpoint(&self, url: &str) -> Result<()> {
        self.store.set(KEY_ENDPOINT, url)
    }

    /// The saved endpoint, falling back to `default` only when none is saved.
    ///
    /// A storage failure is returned as-is; it never silently degrades to
    /// the default.
    pub fn resolve_endpoint(&self, default: &str) -> Result<String> {
        match self.endpoint()? {
            Some(url) => Ok(url),
            None => {
                tracing::debug!(default, "no saved endpoint, using default");
                Ok(default.to_string())
            }
        }
    }
}
