//! Shared test doubles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dialer_core::ConnectionState;
use dialer_store::{MemoryStore, SessionStore};
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::{Semaphore, watch};

use crate::api::{Directory, EnrollmentRecord, UserRecord};
use crate::connection::{LinkDriver, Transport, TransportLink};
use crate::errors::{ConnectionError, LookupError};

/// In-memory [`Transport`] that records attempts and hands out link drivers.
pub(crate) struct FakeTransport {
    attempts: Mutex<Vec<String>>,
    drivers: Mutex<Vec<(String, Option<LinkDriver>)>>,
    refuse: AtomicBool,
    gate: Option<Semaphore>,
}

impl FakeTransport {
    /// Opens every connection immediately.
    pub(crate) fn new() -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            drivers: Mutex::new(Vec::new()),
            refuse: AtomicBool::new(false),
            gate: None,
        }
    }

    /// Fails every open.
    pub(crate) fn refusing() -> Self {
        let transport = Self::new();
        transport.refuse.store(true, Ordering::SeqCst);
        transport
    }

    /// Each open waits for one [`Self::release`].
    pub(crate) fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    pub(crate) fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub(crate) fn attempts(&self) -> Vec<String> {
        self.attempts.lock().clone()
    }

    /// Take the driver of the `index`-th successful open.
    pub(crate) fn take_driver(&self, index: usize) -> LinkDriver {
        self.drivers.lock()[index]
            .1
            .take()
            .expect("driver already taken")
    }

    /// Take the driver of the first open to `url`.
    pub(crate) fn take_driver_for(&self, url: &str) -> LinkDriver {
        self.drivers
            .lock()
            .iter_mut()
            .find(|(u, d)| u == url && d.is_some())
            .and_then(|(_, d)| d.take())
            .expect("no driver for url")
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn open(&self, url: &str) -> Result<TransportLink, ConnectionError> {
        self.attempts.lock().push(url.to_string());
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        if self.refuse.load(Ordering::SeqCst) {
            return Err(ConnectionError::Transport("connection refused".into()));
        }
        let (link, driver) = TransportLink::pair();
        self.drivers.lock().push((url.to_string(), Some(driver)));
        Ok(link)
    }
}

/// Wait (bounded) until the broadcast state equals `want`.
pub(crate) async fn wait_for_state(rx: &watch::Receiver<ConnectionState>, want: ConnectionState) {
    let mut rx = rx.clone();
    let _ = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| *s == want))
        .await
        .expect("timed out waiting for state")
        .expect("state sender dropped");
}

/// Let spawned tasks drain their queues.
pub(crate) async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
}

/// Scripted [`Directory`] that records the order of calls.
pub(crate) struct FakeDirectory {
    pub(crate) user: Result<UserRecord, LookupError>,
    pub(crate) enrollment: Result<EnrollmentRecord, LookupError>,
    pub(crate) calls: Mutex<Vec<String>>,
    /// Runs after the user lookup is recorded.
    pub(crate) after_user: Option<Box<dyn Fn() + Send + Sync>>,
}

impl FakeDirectory {
    pub(crate) fn found() -> Self {
        Self {
            user: Ok(user("7", "Kim")),
            enrollment: Ok(enrollment()),
            calls: Mutex::new(Vec::new()),
            after_user: None,
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Directory for FakeDirectory {
    async fn find_user(&self, token: &str, phone: &str) -> Result<UserRecord, LookupError> {
        self.calls.lock().push(format!("user:{token}:{phone}"));
        if let Some(hook) = &self.after_user {
            hook();
        }
        self.user.clone()
    }

    async fn find_enrollment(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<EnrollmentRecord, LookupError> {
        self.calls.lock().push(format!("enrollment:{token}:{user_id}"));
        self.enrollment.clone()
    }
}

pub(crate) fn user(id: &str, name: &str) -> UserRecord {
    serde_json::from_value(json!({ "id": id, "name": name })).expect("user record")
}

pub(crate) fn enrollment() -> EnrollmentRecord {
    serde_json::from_value(json!({ "id": 11, "course": "Pilates", "remaining": 4 }))
        .expect("enrollment record")
}

/// HS256 token with the given `exp` (or none).
pub(crate) fn token_with_exp(exp: Option<i64>) -> String {
    let claims = match exp {
        Some(exp) => json!({ "sub": "admin", "exp": exp }),
        None => json!({ "sub": "admin" }),
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
    )
    .expect("encode token")
}

/// Token valid for another hour.
pub(crate) fn fresh_token() -> String {
    token_with_exp(Some(chrono::Utc::now().timestamp() + 3600))
}

/// Session store over memory, pre-loaded with `token` and branch "3".
pub(crate) fn sessions_with(token: Option<&str>) -> (Arc<MemoryStore>, SessionStore) {
    let mut store = MemoryStore::new().with(dialer_store::KEY_BRANCH, "3");
    if let Some(token) = token {
        store = store.with(dialer_store::KEY_ACCESS_TOKEN, token);
    }
    let store = Arc::new(store);
    let sessions = SessionStore::new(Arc::clone(&store) as Arc<dyn dialer_store::KeyValueStore>);
    (store, sessions)
}
