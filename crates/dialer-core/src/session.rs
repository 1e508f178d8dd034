//! Authenticated operator session.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tokens and branch identifier issued by the admin login endpoint.
///
/// Created at login, read on every submission, destroyed on logout.
/// Only the session store writes it; everyone else holds a snapshot.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Bearer token for lookup requests.
    pub access_token: String,
    /// Refresh token (persisted, not yet used for renewal).
    pub refresh_token: String,
    /// Branch the operator is logged into.
    pub branch_id: String,
}

impl Session {
    /// Build a session from its three parts.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        branch_id: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            branch_id: branch_id.into(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("branch_id", &self.branch_id)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
