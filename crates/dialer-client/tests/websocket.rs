//! ConnectionManager and Dialer against a real WebSocket server on loopback.

#![allow(unused_results)]

use std::sync::Arc;
use std::time::Duration;

use dialer_client::{ConnectionManager, Dialer, SubmissionOutcome, Transport, WsTransport};
use dialer_core::ConnectionState;
use dialer_settings::DialerSettings;
use dialer_store::{KEY_ACCESS_TOKEN, KEY_BRANCH, KeyValueStore, MemoryStore};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Accept one client, forward every text frame it sends, and close the
/// socket when `close` fires.
async fn spawn_server() -> (String, mpsc::UnboundedReceiver<String>, mpsc::UnboundedSender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (frames_tx, frames_rx) = mpsc::unbounded_channel();
    let (close_tx, mut close_rx) = mpsc::unbounded_channel::<()>();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        loop {
            tokio::select! {
                msg = ws.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        frames_tx.send(text.as_str().to_owned()).unwrap();
                        ws.send(Message::Text(String::from("ack").into())).await.unwrap();
                    }
                    Some(Ok(_)) => {}
                    _ => break,
                },
                _ = close_rx.recv() => {
                    let _ = ws.close(None).await;
                    break;
                }
            }
        }
    });

    (format!("ws://{addr}"), frames_rx, close_tx)
}

async fn wait_for(rx: &watch::Receiver<ConnectionState>, want: ConnectionState) {
    let mut rx = rx.clone();
    tokio::time::timeout(TIMEOUT, rx.wait_for(|s| *s == want))
        .await
        .expect("timed out waiting for state")
        .expect("state sender dropped");
}

fn ws_manager() -> ConnectionManager {
    ConnectionManager::new(Arc::new(WsTransport::new()) as Arc<dyn Transport>)
}

#[tokio::test]
async fn sends_text_frame_to_server() {
    let (url, mut frames, _close) = spawn_server().await;
    let manager = ws_manager();

    assert_eq!(manager.set_endpoint(&url).await.unwrap(), ConnectionState::Open);
    manager.send("12345678").unwrap();

    let frame = tokio::time::timeout(TIMEOUT, frames.recv()).await.unwrap();
    assert_eq!(frame.as_deref(), Some("12345678"));
    assert_eq!(manager.state(), ConnectionState::Open);
}

#[tokio::test]
async fn server_close_moves_to_closed() {
    let (url, _frames, close) = spawn_server().await;
    let manager = ws_manager();
    let _ = manager.set_endpoint(&url).await.unwrap();

    close.send(()).unwrap();

    wait_for(&manager.subscribe(), ConnectionState::Closed).await;
    assert!(manager.send("12345678").is_err());
}

#[tokio::test]
async fn unreachable_endpoint_reports_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let manager = ws_manager();

    let state = manager.set_endpoint(&format!("ws://{addr}")).await.unwrap();

    assert_eq!(state, ConnectionState::Error);
}

#[tokio::test]
async fn switching_servers_ignores_old_close() {
    let (first, _first_frames, first_close) = spawn_server().await;
    let (second, mut second_frames, _second_close) = spawn_server().await;
    let manager = ws_manager();

    let _ = manager.set_endpoint(&first).await.unwrap();
    assert_eq!(manager.set_endpoint(&second).await.unwrap(), ConnectionState::Open);
    let _ = first_close.send(());
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(manager.state(), ConnectionState::Open);
    manager.send("87654321").unwrap();
    let frame = tokio::time::timeout(TIMEOUT, second_frames.recv()).await.unwrap();
    assert_eq!(frame.as_deref(), Some("87654321"));
}

#[tokio::test]
async fn dialer_delivers_looked_up_number() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("phone", "01012345678"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "name": "Kim"})))
        .expect(1)
        .mount(&api)
        .await;
    Mock::given(method("GET"))
        .and(path("/enrolls"))
        .and(query_param("user_id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"course": "Yoga"})))
        .expect(1)
        .mount(&api)
        .await;

    let (ws_url, mut frames, _close) = spawn_server().await;
    let mut config = DialerSettings::default();
    config.api.base_url = api.uri();
    config.connection.default_endpoint = ws_url;
    let store = MemoryStore::new()
        .with(KEY_ACCESS_TOKEN, "opaque")
        .with(KEY_BRANCH, "3");
    let dialer = Dialer::new(
        &config,
        Arc::new(store) as Arc<dyn KeyValueStore>,
        Arc::new(WsTransport::new()),
    )
    .unwrap();

    assert_eq!(dialer.start().await.unwrap(), ConnectionState::Open);
    let outcome = dialer.submit("010-1234-5678").await;

    // "010-1234-5678" has 11 digits and is rejected; only the suffix is valid input.
    assert!(matches!(outcome, SubmissionOutcome::ValidationFailed(_)));

    let outcome = dialer.submit("1234 5678").await;
    assert!(outcome.is_sent(), "unexpected outcome {outcome:?}");
    let frame = tokio::time::timeout(TIMEOUT, frames.recv()).await.unwrap();
    assert_eq!(frame.as_deref(), Some("12345678"));

    dialer.shutdown();
    assert_eq!(dialer.state(), ConnectionState::Closed);
}

#[tokio::test]
async fn dialer_with_unknown_user_sends_nothing() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&api)
        .await;
    Mock::given(method("GET"))
        .and(path("/enrolls"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&api)
        .await;

    let (ws_url, mut frames, _close) = spawn_server().await;
    let mut config = DialerSettings::default();
    config.api.base_url = api.uri();
    config.connection.default_endpoint = ws_url;
    let store = MemoryStore::new()
        .with(KEY_ACCESS_TOKEN, "opaque")
        .with(KEY_BRANCH, "3");
    let dialer = Dialer::new(
        &config,
        Arc::new(store) as Arc<dyn KeyValueStore>,
        Arc::new(WsTransport::new()),
    )
    .unwrap();
    let _ = dialer.start().await.unwrap();

    assert!(matches!(
        dialer.submit("12345678").await,
        SubmissionOutcome::UserNotFound
    ));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(frames.try_recv().is_err());
}
