//! Persisted operator session.

use std::sync::Arc;

use dialer_core::Session;

use crate::errors::Result;
use crate::kv::KeyValueStore;
use crate::{KEY_ACCESS_TOKEN, KEY_BRANCH, KEY_REFRESH_TOKEN};

const SESSION_KEYS: [&str; 3] = [KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN, KEY_BRANCH];

/// Sole writer of the persisted [`Session`].
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Wrap a key-value backend.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Snapshot of the full session.
    ///
    /// `None` unless both an access token and a branch are stored. A missing
    /// refresh token reads as empty.
    pub fn load(&self) -> Result<Option<Session>> {
        let Some(access_token) = self.access_token()? else {
            return Ok(None);
        };
        let Some(branch_id) = self.branch_id()? else {
            return Ok(None);
        };
        let refresh_token = self.store.get(KEY_REFRESH_TOKEN)?.unwrap_or_default();
        Ok(Some(Session {
            access_token,
            refresh_token,
            branch_id,
        }))
    }

    /// The bearer token, if present and non-empty.
    pub fn access_token(&self) -> Result<Option<String>> {
        Ok(self.store.get(KEY_ACCESS_TOKEN)?.filter(|t| !t.is_empty()))
    }

    /// The branch identifier, if present and non-empty.
    pub fn branch_id(&self) -> Result<Option<String>> {
        Ok(self.store.get(KEY_BRANCH)?.filter(|b| !b.is_empty()))
    }

    /// Whether a branch is stored (the "logged in" gate at startup).
    pub fn has_branch(&self) -> Result<bool> {
        Ok(self.branch_id()?.is_some())
    }

    /// Persist all three session fields in one write.
    pub fn save(&self, session: &Session) -> Result<()> {
        self.store.set_all(&[
            (KEY_ACCESS_TOKEN, session.access_token.as_str()),
            (KEY_REFRESH_TOKEN, session.refresh_token.as_str()),
            (KEY_BRANCH, session.branch_id.as_str()),
        ])?;
        tracing::info!(branch_id = %session.branch_id, "session saved");
        Ok(())
    }

    /// Remove tokens and branch together. Partial failure is reported.
    pub fn clear(&self) -> Result<()> {
        self.store.remove_all(&SESSION_KEYS)?;
        tracing::info!("session cleared");
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
