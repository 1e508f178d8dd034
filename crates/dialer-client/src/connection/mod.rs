//! Single outbound socket connection.
//!
//! [`ConnectionManager`] owns at most one live connection. Replacing the
//! endpoint tears the old connection down before the new one is opened, and
//! every connection is tagged with a generation number: events arriving from
//! a connection whose generation is no longer current are dropped, so a
//! late close or error from a replaced socket can never clobber the state of
//! its successor.
//!
//! State is broadcast on a [`tokio::sync::watch`] channel: subscribers see
//! the latest [`ConnectionState`], never a queued history.

mod transport;
mod ws;

use std::sync::Arc;

use dialer_core::ConnectionState;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

pub use transport::{LinkDriver, Outbound, Transport, TransportEvent, TransportLink};
pub use ws::WsTransport;

use crate::errors::ConnectionError;

/// Owns the process's single socket connection.
pub struct ConnectionManager {
    transport: Arc<dyn Transport>,
    shared: Arc<Shared>,
}

struct Shared {
    inner: Mutex<Inner>,
    state: watch::Sender<ConnectionState>,
}

#[derive(Default)]
struct Inner {
    generation: u64,
    /// Endpoint of the current (or in-flight) connection.
    endpoint: Option<String>,
    /// Most recent endpoint ever requested; survives teardown for `reconnect`.
    last_endpoint: Option<String>,
    link: Option<mpsc::UnboundedSender<Outbound>>,
}

impl Shared {
    /// Publish `next` if it differs from the current state.
    fn publish(&self, next: ConnectionState) {
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            debug!(state = %next, "connection state changed");
        }
    }

    /// Invalidate the current connection and return the new generation.
    fn supersede(&self, inner: &mut Inner) -> u64 {
        inner.generation += 1;
        if let Some(link) = inner.link.take() {
            let _ = link.send(Outbound::Close);
        }
        inner.generation
    }

    /// Apply one transport event. Returns `false` once `generation` is stale.
    fn apply(&self, generation: u64, event: TransportEvent) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            debug!(
                generation,
                current = inner.generation,
                ?event,
                "dropping event from superseded connection"
            );
            return false;
        }
        match event {
            TransportEvent::Message(frame) => {
                info!(generation, %frame, "inbound frame");
            }
            TransportEvent::Closed => {
                inner.link = None;
                info!(generation, "connection closed");
                self.publish(ConnectionState::Closed);
            }
            TransportEvent::Error(reason) => {
                inner.link = None;
                warn!(generation, %reason, "connection error");
                self.publish(ConnectionState::Error);
            }
        }
        true
    }
}

impl ConnectionManager {
    /// Create a manager with no connection, in [`ConnectionState::Closed`].
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Closed);
        Self {
            transport,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner::default()),
                state,
            }),
        }
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.borrow()
    }

    /// Receive the latest state on every change.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    /// Endpoint of the active (or in-flight) connection.
    pub fn endpoint(&self) -> Option<String> {
        self.shared.inner.lock().endpoint.clone()
    }

    /// Point the connection at `url`.
    ///
    /// The URL is trimmed; an empty URL is rejected and the current
    /// connection is left alone. Re-selecting the active endpoint is a
    /// no-op. Otherwise the old connection is closed, the state goes
    /// `Closed` → `Connecting`, and this resolves with `Open` or `Error`
    /// once the transport reports. If another call supersedes this one
    /// while it is opening, the new socket is discarded and the current
    /// state is returned.
    #[tracing::instrument(skip_all, fields(url = url.trim()))]
    pub async fn set_endpoint(&self, url: &str) -> Result<ConnectionState, ConnectionError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ConnectionError::InvalidEndpoint);
        }

        let generation = {
            let mut inner = self.shared.inner.lock();
            if inner.endpoint.as_deref() == Some(url) {
                debug!("endpoint unchanged");
                return Ok(self.state());
            }
            self.begin(&mut inner, url)
        };
        Ok(self.open(url, generation).await)
    }

    /// Reopen the most recently requested endpoint, even if it is active.
    pub async fn reconnect(&self) -> Result<ConnectionState, ConnectionError> {
        let (url, generation) = {
            let mut inner = self.shared.inner.lock();
            let url = inner
                .last_endpoint
                .clone()
                .ok_or(ConnectionError::InvalidEndpoint)?;
            let generation = self.begin(&mut inner, &url);
            (url, generation)
        };
        info!(%url, "reconnecting");
        Ok(self.open(&url, generation).await)
    }

    /// Write `payload` as one text frame on the open connection.
    pub fn send(&self, payload: &str) -> Result<(), ConnectionError> {
        let inner = self.shared.inner.lock();
        if !self.state().is_open() {
            return Err(ConnectionError::SocketNotOpen);
        }
        let link = inner.link.as_ref().ok_or(ConnectionError::SocketNotOpen)?;
        link.send(Outbound::Text(payload.to_string()))
            .map_err(|_| ConnectionError::SocketNotOpen)?;
        debug!(bytes = payload.len(), "frame queued");
        Ok(())
    }

    /// Close the connection and forget the active endpoint. Idempotent.
    pub fn teardown(&self) {
        let mut inner = self.shared.inner.lock();
        let _ = self.shared.supersede(&mut inner);
        if inner.endpoint.take().is_some() {
            info!("connection torn down");
        }
        self.shared.publish(ConnectionState::Closed);
    }

    fn begin(&self, inner: &mut Inner, url: &str) -> u64 {
        let generation = self.shared.supersede(inner);
        inner.endpoint = Some(url.to_string());
        inner.last_endpoint = Some(url.to_string());
        self.shared.publish(ConnectionState::Closed);
        self.shared.publish(ConnectionState::Connecting);
        generation
    }

    async fn open(&self, url: &str, generation: u64) -> ConnectionState {
        let opened = self.transport.open(url).await;

        let mut inner = self.shared.inner.lock();
        if inner.generation != generation {
            debug!(url, generation, "open attempt superseded");
            if let Ok(link) = opened {
                let _ = link.outbound.send(Outbound::Close);
            }
            return self.state();
        }

        match opened {
            Ok(TransportLink { outbound, events }) => {
                inner.link = Some(outbound);
                self.shared.publish(ConnectionState::Open);
                info!(url, generation, "connection open");
                let _pump = tokio::spawn(pump(Arc::clone(&self.shared), generation, events));
                ConnectionState::Open
            }
            Err(e) => {
                warn!(url, error = %e, "connection failed to open");
                self.shared.publish(ConnectionState::Error);
                ConnectionState::Error
            }
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        let mut inner = self.shared.inner.lock();
        let _ = self.shared.supersede(&mut inner);
    }
}

async fn pump(
    shared: Arc<Shared>,
    generation: u64,
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
) {
    loop {
        let event = events.recv().await.unwrap_or(TransportEvent::Closed);
        let terminal = !matches!(event, TransportEvent::Message(_));
        if !shared.apply(generation, event) || terminal {
            break;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
