//! # dialer-store
//!
//! Minimal persisted key-value storage and the two typed stores built on it.
//!
//! - [`KeyValueStore`]: `get` / `set` / `set_all` / `remove_all` over opaque strings
//! - [`JsonFileStore`]: flat JSON object on disk, written atomically with 0o600
//! - [`MemoryStore`]: in-process map for tests and ephemeral runs
//! - [`SettingsStore`]: the operator-chosen socket endpoint
//! - [`SessionStore`]: access token, refresh token, and branch identifier
//!
//! Key names match the ones the mobile client persisted, so a store file
//! written by either side reads the same.

#![deny(unsafe_code)]

pub mod errors;
pub mod file;
pub mod kv;
pub mod session;
pub mod settings;

pub use errors::{Result, StoreError};
pub use file::JsonFileStore;
pub use kv::{KeyValueStore, MemoryStore};
pub use session::SessionStore;
pub use settings::SettingsStore;

/// Persisted socket endpoint URL.
pub const KEY_ENDPOINT: &str = "app_ws_url";
/// Persisted branch identifier.
pub const KEY_BRANCH: &str = "branch_id";
/// Persisted bearer token.
pub const KEY_ACCESS_TOKEN: &str = "accessToken";
/// Persisted refresh token.
pub const KEY_REFRESH_TOKEN: &str = "refreshToken";
