//! Store lifecycle over a scripted transport
//!
//! Drives the full client stack (store facade, worker, connection session)
//! against the in-process transport pair, covering reconnect replay,
//! terminal failure, and disposal mid-retry.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;
use xfform::client::{ClientError, FormStore, MemoryConnector, MemoryControl, MemoryLink, SessionState};
use xfform::shared::{ClientConfig, FormMessage, ReconnectConfig};

use crate::common::settle;

async fn connected_store() -> (FormStore, MemoryLink, MemoryControl) {
    let (connector, mut control) = MemoryConnector::pair();
    let config = ClientConfig::new("memory://test", "Alice");
    let store = FormStore::connect_with_connector(Arc::new(connector), config);
    let mut link = control.accept().await.expect("store should connect");
    assert_matches!(link.sent().await, Some(FormMessage::Join(_)));
    (store, link, control)
}

#[tokio::test(start_paused = true)]
async fn test_update_queued_while_down_replays_once_after_rejoin() {
    let (store, link, mut control) = connected_store().await;
    link.sever();

    // Edit while the connection is gone; the intent must survive the outage.
    store.update_field("draft", json!("offline edit")).unwrap();

    let mut link = control.accept().await.expect("reconnect");
    assert_matches!(link.sent().await, Some(FormMessage::Join(_)));
    match link.sent().await {
        Some(FormMessage::Update(data)) => {
            assert_eq!(data.field.as_deref(), Some("draft"));
            assert_eq!(data.value, Some(json!("offline edit")));
        }
        other => panic!("Expected the queued update, got {:?}", other),
    }

    settle().await;
    assert_eq!(link.try_sent(), None, "the update must flush exactly once");
}

#[tokio::test(start_paused = true)]
async fn test_connection_state_mirrors_session_lifecycle() {
    let (connector, mut control) = MemoryConnector::pair();
    let config = ClientConfig::new("memory://test", "Alice");
    let store = FormStore::connect_with_connector(Arc::new(connector), config);
    settle().await;
    assert_eq!(store.get_connection_state(), SessionState::Connecting);

    let mut link = control.accept().await.expect("store should connect");
    assert_matches!(link.sent().await, Some(FormMessage::Join(_)));
    settle().await;
    assert_eq!(store.get_connection_state(), SessionState::Open);

    link.sever();
    settle().await;
    assert_eq!(
        store.get_connection_state(),
        SessionState::Retrying { attempt: 1 }
    );

    let mut link = control.accept().await.expect("reconnect");
    assert_matches!(link.sent().await, Some(FormMessage::Join(_)));
    settle().await;
    assert_eq!(store.get_connection_state(), SessionState::Open);
}

#[tokio::test(start_paused = true)]
async fn test_terminal_failure_surfaces_through_on_error() {
    let (connector, mut control) = MemoryConnector::pair();
    let config = ClientConfig::builder()
        .server_url("memory://test")
        .display_name("Alice")
        .reconnect(ReconnectConfig {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(40),
            multiplier: 2.0,
            max_attempts: 2,
        })
        .build()
        .unwrap();
    let store = FormStore::connect_with_connector(Arc::new(connector), config);
    let mut link = control.accept().await.expect("store should connect");
    assert_matches!(link.sent().await, Some(FormMessage::Join(_)));

    let errors: Arc<Mutex<Vec<ClientError>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    let _watch = store.on_error(move |error| sink.lock().unwrap().push(error.clone()));
    settle().await;

    link.sever();
    assert!(control.refuse().await);
    assert!(control.refuse().await);
    settle().await;

    assert_eq!(store.get_connection_state(), SessionState::Terminal);
    let errors = errors.lock().unwrap();
    assert_matches!(
        errors.last(),
        Some(ClientError::TerminalConnectivity { attempts: 2, .. })
    );
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_during_retry_stops_reconnecting() {
    let (store, link, mut control) = connected_store().await;
    link.sever();
    settle().await;

    store.disconnect();
    settle().await;

    // The connector is released, so no further attempts can arrive.
    assert!(control.accept().await.is_none());
    assert_matches!(
        store.update_field("field", json!(1)),
        Err(ClientError::Disposed)
    );
}
