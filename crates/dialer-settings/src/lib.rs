//! # dialer-settings
//!
//! Application configuration with layered sources.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`DialerSettings::default()`]
//! 2. **User file**: `~/.dialer/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `DIALER_*` overrides (highest priority)
//!
//! These are process-level settings (API base URL, default socket endpoint,
//! store location, logging). The operator-edited socket endpoint is *not*
//! kept here; it lives in the key-value store so it survives restarts
//! independently of this file.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{data_dir, deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;
