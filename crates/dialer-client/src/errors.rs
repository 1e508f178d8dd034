//! Error types for the connection, lookup, and login paths.

use dialer_store::StoreError;

/// Errors from [`crate::ConnectionManager`] and its transports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// The endpoint URL was empty (or only whitespace).
    #[error("socket endpoint must not be empty")]
    InvalidEndpoint,

    /// A send was attempted while the connection was not open.
    #[error("socket is not open")]
    SocketNotOpen,

    /// The transport failed to open the connection.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors from a subscriber or enrollment lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The server rejected the bearer token (401/403).
    #[error("lookup unauthorized ({status})")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
    },

    /// No such record: a 4xx other than 401/403, or a `null` body.
    #[error("record not found ({status})")]
    NotFound {
        /// HTTP status code.
        status: u16,
    },

    /// The server failed (5xx).
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        message: String,
    },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// A 2xx response whose body was not the expected JSON.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl LookupError {
    /// Classify a non-2xx status.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status },
            500..=599 => Self::Server {
                status,
                message: truncate(body, 200),
            },
            _ => Self::NotFound { status },
        }
    }
}

/// Errors from [`crate::ApiClient::login`].
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// Username or password was empty; nothing was sent.
    #[error("username and password are required")]
    MissingCredentials,

    /// The server refused the login, with its message when it sent one.
    #[error("login rejected: {0}")]
    Rejected(String),

    /// The request never produced a usable response.
    #[error("network error: {0}")]
    Network(String),
}

/// Top-level error for [`crate::Dialer`] operations.
#[derive(Debug, thiserror::Error)]
pub enum DialerError {
    /// Connection management failed.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Login failed.
    #[error(transparent)]
    Login(#[from] LoginError),

    /// Reading or writing persisted state failed.
    #[error("persistence error: {0}")]
    Store(#[from] StoreError),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
