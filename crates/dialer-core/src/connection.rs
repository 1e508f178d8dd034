//! Socket connection lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// State of the single outbound socket connection.
///
/// Owned by the connection manager; observers only ever see transitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No connection, or the last one was closed locally or remotely.
    #[default]
    Closed,
    /// An open attempt is in flight.
    Connecting,
    /// The socket accepts writes.
    Open,
    /// The transport reported a failure.
    Error,
}

impl ConnectionState {
    /// Whether a send would be handed to the transport.
    pub fn is_open(self) -> bool {
        self == Self::Open
    }

    /// Lowercase label used in logs and the status line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
