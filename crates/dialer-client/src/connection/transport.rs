//! Transport seam between [`super::ConnectionManager`] and a concrete socket.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::errors::ConnectionError;

/// Frames the manager asks a live link to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A single text frame.
    Text(String),
    /// Close the socket and stop the link.
    Close,
}

/// Events a live link reports back to the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Inbound text frame.
    Message(String),
    /// The socket closed (either side).
    Closed,
    /// The socket failed after opening.
    Error(String),
}

/// Manager-side handle to one open connection.
#[derive(Debug)]
pub struct TransportLink {
    /// Frames to write.
    pub outbound: mpsc::UnboundedSender<Outbound>,
    /// Events from the socket.
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Transport-side half of a [`TransportLink`].
#[derive(Debug)]
pub struct LinkDriver {
    /// Frames the manager wants written.
    pub outbound: mpsc::UnboundedReceiver<Outbound>,
    /// Where to report socket events.
    pub events: mpsc::UnboundedSender<TransportEvent>,
}

impl TransportLink {
    /// Create a connected link/driver pair.
    pub fn pair() -> (Self, LinkDriver) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (ev_tx, ev_rx) = mpsc::unbounded_channel();
        (
            Self {
                outbound: out_tx,
                events: ev_rx,
            },
            LinkDriver {
                outbound: out_rx,
                events: ev_tx,
            },
        )
    }
}

/// Opens socket connections.
///
/// `open` resolves once the connection is open or has failed to open.
/// After that, everything flows through the returned [`TransportLink`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a connection to `url`.
    async fn open(&self, url: &str) -> Result<TransportLink, ConnectionError>;
}
