//! Process-level dialer context.
//!
//! [`Dialer`] owns the stores, the single [`ConnectionManager`], the API
//! client, and the pipeline. Front ends (the CLI, a UI) hold one `Dialer`
//! and call into it; nothing else constructs a connection.

use std::sync::Arc;

use dialer_core::ConnectionState;
use dialer_settings::DialerSettings;
use dialer_store::{KeyValueStore, SessionStore, SettingsStore};
use tokio::sync::watch;
use tracing::info;

use crate::api::{ApiClient, Directory};
use crate::connection::{ConnectionManager, Transport};
use crate::errors::{ConnectionError, DialerError};
use crate::pipeline::{Delivery, SubmissionOutcome, SubmissionPipeline};

/// The dialer's single shared context.
pub struct Dialer {
    settings: SettingsStore,
    sessions: SessionStore,
    connection: Arc<ConnectionManager>,
    api: Arc<ApiClient>,
    pipeline: SubmissionPipeline,
    default_endpoint: String,
}

impl Dialer {
    /// Build a dialer from configuration, a key-value backend, and a socket
    /// transport. No connection is opened until [`Self::start`].
    pub fn new(
        config: &DialerSettings,
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, DialerError> {
        let api = Arc::new(ApiClient::new(&config.api)?);
        let sessions = SessionStore::new(Arc::clone(&store));
        let connection = Arc::new(ConnectionManager::new(transport));
        let pipeline = SubmissionPipeline::new(
            Arc::clone(&api) as Arc<dyn Directory>,
            sessions.clone(),
            Arc::clone(&connection),
        );
        Ok(Self {
            settings: SettingsStore::new(store),
            sessions,
            connection,
            api,
            pipeline,
            default_endpoint: config.connection.default_endpoint.clone(),
        })
    }

    /// Connect to the saved endpoint, or the configured default.
    pub async fn start(&self) -> Result<ConnectionState, DialerError> {
        let url = self.settings.resolve_endpoint(&self.default_endpoint)?;
        info!(%url, "starting connection");
        Ok(self.connection.set_endpoint(&url).await?)
    }

    /// Persist a new endpoint, then switch the connection to it.
    ///
    /// Nothing is persisted for an empty URL, and the connection is not
    /// touched if persisting fails.
    pub async fn change_endpoint(&self, url: &str) -> Result<ConnectionState, DialerError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ConnectionError::InvalidEndpoint.into());
        }
        self.settings.save_endpoint(url)?;
        Ok(self.connection.set_endpoint(url).await?)
    }

    /// The endpoint the next [`Self::start`] would use.
    pub fn saved_endpoint(&self) -> Result<String, DialerError> {
        Ok(self.settings.resolve_endpoint(&self.default_endpoint)?)
    }

    /// Endpoint of the live (or opening) connection.
    pub fn active_endpoint(&self) -> Option<String> {
        self.connection.endpoint()
    }

    /// Reopen the last endpoint after a failure.
    pub async fn reconnect(&self) -> Result<ConnectionState, DialerError> {
        Ok(self.connection.reconnect().await?)
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Latest-value connection state broadcast.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.connection.subscribe()
    }

    /// Whether a branch is persisted.
    pub fn is_logged_in(&self) -> Result<bool, DialerError> {
        Ok(self.sessions.has_branch()?)
    }

    /// Log in and persist the granted session.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), DialerError> {
        let session = self.api.login(username, password).await?;
        self.sessions.save(&session)?;
        Ok(())
    }

    /// Forget the persisted session. The connection is left as is.
    pub fn logout(&self) -> Result<(), DialerError> {
        Ok(self.sessions.clear()?)
    }

    /// Validate, look up, and send `raw`.
    pub async fn submit(&self, raw: &str) -> SubmissionOutcome {
        self.pipeline.submit(raw).await
    }

    /// Retry the send for a delivery that found the socket closed.
    pub fn resend(&self, delivery: Delivery) -> SubmissionOutcome {
        self.pipeline.resend(delivery)
    }

    /// Close the connection.
    pub fn shutdown(&self) {
        self.connection.teardown();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
