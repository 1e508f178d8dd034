//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and implement
//! [`Default`] with production default values. Every section is marked
//! `#[serde(default)]` so partial JSON files are accepted.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root settings type for the dialer.
///
/// Loaded from `~/.dialer/settings.json` with defaults applied for missing
/// fields. Environment variables can override specific values.
///
/// # JSON Format
///
/// ```json
/// {
///   "api": { "baseUrl": "https://api.example.com" },
///   "connection": { "defaultEndpoint": "wss://relay.example.com/ws" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DialerSettings {
    /// Lookup and login API.
    pub api: ApiSettings,
    /// Socket connection defaults.
    pub connection: ConnectionSettings,
    /// Key-value store location.
    pub storage: StorageSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl DialerSettings {
    /// Trim URL fields and restore defaults for empty ones.
    ///
    /// Called automatically during loading. Blank values are replaced with a
    /// warning rather than rejected.
    pub fn validate(&mut self) {
        fn restore_if_blank(val: &mut String, default: &str, name: &str) {
            let trimmed = val.trim();
            if trimmed.is_empty() {
                tracing::warn!("{name} is empty, using default {default}");
                *val = default.to_string();
            } else if trimmed.len() != val.len() {
                *val = trimmed.to_string();
            }
        }

        restore_if_blank(&mut self.api.base_url, DEFAULT_API_URL, "api.baseUrl");
        while self.api.base_url.ends_with('/') {
            let _ = self.api.base_url.pop();
        }
        restore_if_blank(
            &mut self.connection.default_endpoint,
            DEFAULT_WS_URL,
            "connection.defaultEndpoint",
        );
        if self.api.timeout_ms == Some(0) {
            tracing::warn!("api.timeoutMs of 0 disables requests, ignoring");
            self.api.timeout_ms = None;
        }
    }
}

/// Default lookup/login API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default socket endpoint when nothing has been persisted.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8080/ws";

/// HTTP API settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiSettings {
    /// Base URL; `/users`, `/enrolls`, and `/admin_login` hang off it.
    pub base_url: String,
    /// Per-request timeout. `None` leaves the transport default in place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_ms: None,
            user_agent: format!("dialer/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Socket connection settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionSettings {
    /// Compiled-in endpoint used until the operator saves one.
    pub default_endpoint: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            default_endpoint: DEFAULT_WS_URL.to_string(),
        }
    }
}

/// Key-value store settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageSettings {
    /// Store file path. `None` means `~/.dialer/store.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl StorageSettings {
    /// The configured store path, or the default under the data directory.
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .as_ref()
            .map_or_else(|| crate::loader::data_dir().join("store.json"), PathBuf::from)
    }
}

/// Logging settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level (`trace`..`error`) or a full `EnvFilter` directive.
    pub level: String,
    /// Emit one JSON object per line instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = DialerSettings::default();
        assert_eq!(s.api.base_url, DEFAULT_API_URL);
        assert!(s.api.timeout_ms.is_none());
        assert!(s.api.user_agent.starts_with("dialer/"));
        assert_eq!(s.connection.default_endpoint, DEFAULT_WS_URL);
        assert!(s.storage.path.is_none());
        assert_eq!(s.logging.level, "info");
        assert!(!s.logging.json);
    }

    #[test]
    fn json_field_names_are_camel_case() {
        let json = serde_json::to_value(DialerSettings::default()).unwrap();
        assert!(json["api"].get("baseUrl").is_some());
        assert!(json["api"].get("userAgent").is_some());
        assert!(json["connection"].get("defaultEndpoint").is_some());
        // Optional fields are omitted when unset
        assert!(json["api"].get("timeoutMs").is_none());
        assert!(json["storage"].get("path").is_none());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let s: DialerSettings =
            serde_json::from_str(r#"{"api": {"baseUrl": "https://api.example.com"}}"#).unwrap();
        assert_eq!(s.api.base_url, "https://api.example.com");
        assert_eq!(s.connection.default_endpoint, DEFAULT_WS_URL);
        assert_eq!(s.logging.level, "info");
    }

    #[test]
    fn validate_trims_and_strips_trailing_slash() {
        let mut s = DialerSettings::default();
        s.api.base_url = "  https://api.example.com/  ".to_string();
        s.connection.default_endpoint = " wss://relay.example.com/ws ".to_string();
        s.validate();
        assert_eq!(s.api.base_url, "https://api.example.com");
        assert_eq!(s.connection.default_endpoint, "wss://relay.example.com/ws");
    }

    #[test]
    fn validate_restores_blank_urls() {
        let mut s = DialerSettings::default();
        s.api.base_url = "   ".to_string();
        s.connection.default_endpoint = String::new();
        s.validate();
        assert_eq!(s.api.base_url, DEFAULT_API_URL);
        assert_eq!(s.connection.default_endpoint, DEFAULT_WS_URL);
    }

    #[test]
    fn validate_drops_zero_timeout() {
        let mut s = DialerSettings::default();
        s.api.timeout_ms = Some(0);
        s.validate();
        assert!(s.api.timeout_ms.is_none());
    }

    #[test]
    fn storage_path_override() {
        let s = StorageSettings {
            path: Some("/var/lib/dialer/kv.json".to_string()),
        };
        assert_eq!(s.resolved_path(), PathBuf::from("/var/lib/dialer/kv.json"));
        let default = StorageSettings::default().resolved_path();
        assert!(default.ends_with(".dialer/store.json"));
    }
}
