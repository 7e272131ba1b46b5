//! Field locking flows at the store surface
//!
//! Scripts the server side of the conversation over the in-process link:
//! grants, conflicts, and foreign locks, asserted through the public store
//! API exactly as a UI would see them.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;
use xfform::client::{ClientError, FormStore, MemoryConnector, MemoryControl, MemoryLink};
use xfform::shared::{ClientConfig, FormMessage, Participant};

use crate::common::settle;

/// Connect a store and greet it as the server would
async fn welcomed_store(session_id: &str) -> (FormStore, MemoryLink, MemoryControl) {
    let (connector, mut control) = MemoryConnector::pair();
    let config = ClientConfig::new("memory://test", "Alice");
    let store = FormStore::connect_with_connector(Arc::new(connector), config);
    let mut link = control.accept().await.expect("store should connect");
    assert_matches!(link.sent().await, Some(FormMessage::Join(_)));
    assert!(link.push(FormMessage::welcome(session_id)));
    settle().await;
    (store, link, control)
}

#[tokio::test(start_paused = true)]
async fn test_focus_debounce_grant_round_trip() {
    let (store, mut link, _control) = welcomed_store("srv-1").await;

    store.handle_field_focus("email").unwrap();
    settle().await;
    assert_eq!(link.try_sent(), None, "the intent must wait out the debounce");

    // Waiting on the link advances the paused clock past the debounce.
    match link.sent().await {
        Some(FormMessage::Lock(data)) => assert_eq!(data.field, "email"),
        other => panic!("Expected lock request, got {:?}", other),
    }

    assert!(link.push(FormMessage::lock_granted(
        "email",
        Participant::with_id("srv-1", "Alice"),
    )));
    settle().await;
    assert!(store.is_field_locked_by_me("email"));
}

#[tokio::test(start_paused = true)]
async fn test_blur_before_debounce_cancels_the_intent() {
    let (store, mut link, _control) = welcomed_store("srv-1").await;

    store.handle_field_focus("email").unwrap();
    store.handle_field_blur("email").unwrap();
    settle().await;

    tokio::time::advance(Duration::from_secs(1)).await;
    settle().await;
    assert_eq!(link.try_sent(), None, "a cancelled intent must never fire");
}

#[tokio::test(start_paused = true)]
async fn test_change_promotes_pending_intent_before_the_update() {
    let (store, mut link, _control) = welcomed_store("srv-1").await;

    store.handle_field_focus("name").unwrap();
    store.handle_field_change("name", json!("A")).unwrap();
    settle().await;

    match link.try_sent() {
        Some(FormMessage::Lock(data)) => assert_eq!(data.field, "name"),
        other => panic!("Expected immediate lock request, got {:?}", other),
    }
    match link.try_sent() {
        Some(FormMessage::Update(data)) => {
            assert_eq!(data.field.as_deref(), Some("name"));
            assert_eq!(data.value, Some(json!("A")));
        }
        other => panic!("Expected update after the lock, got {:?}", other),
    }

    // The write is visible locally before any echo returns.
    assert_eq!(store.get_field("name"), Some(json!("A")));

    // The promoted intent must not fire again from the timer.
    tokio::time::advance(Duration::from_secs(1)).await;
    settle().await;
    assert_eq!(link.try_sent(), None);
}

#[tokio::test(start_paused = true)]
async fn test_conflict_reply_reaches_error_observers() {
    let (store, mut link, _control) = welcomed_store("srv-1").await;

    let errors: Arc<Mutex<Vec<ClientError>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    let _watch = store.on_error(move |error| sink.lock().unwrap().push(error.clone()));
    settle().await;

    store.lock_field("email").unwrap();
    assert_matches!(link.sent().await, Some(FormMessage::Lock(_)));
    assert!(link.push(FormMessage::error(
        "Field 'email' is locked by Bea",
        Some("email".to_string()),
    )));
    settle().await;

    let errors = errors.lock().unwrap();
    assert_matches!(
        errors.as_slice(),
        [ClientError::LockConflict { field, .. }] if field == "email"
    );
    assert!(!store.is_field_locked("email"), "a refusal grants nothing");
}

#[tokio::test(start_paused = true)]
async fn test_foreign_lock_makes_focus_and_unlock_inert() {
    let (store, mut link, _control) = welcomed_store("srv-1").await;
    let bea = Participant::with_id("p-bea", "Bea");
    assert!(link.push(FormMessage::lock_granted("email", bea.clone())));
    settle().await;
    assert_eq!(store.get_field_locker("email"), Some(bea));

    store.handle_field_focus("email").unwrap();
    store.unlock_field("email").unwrap();
    store.handle_field_blur("email").unwrap();
    settle().await;
    tokio::time::advance(Duration::from_secs(1)).await;
    settle().await;

    assert_eq!(
        link.try_sent(),
        None,
        "a field someone else holds must not be contested or released"
    );
}

#[tokio::test(start_paused = true)]
async fn test_late_observers_replay_the_current_state() {
    let (store, link, _control) = welcomed_store("srv-1").await;
    let bea = Participant::with_id("p-bea", "Bea");
    assert!(link.push(FormMessage::join(bea.clone())));
    assert!(link.push(FormMessage::lock_granted("email", bea.clone())));
    assert!(link.push(FormMessage::update("email", json!("b@example.com"))));
    settle().await;

    let changes = Arc::new(Mutex::new(Vec::new()));
    let change_sink = changes.clone();
    let _on_change = store.on_change(move |field, value| {
        change_sink.lock().unwrap().push((field.to_string(), value.clone()));
    });

    let rosters = Arc::new(Mutex::new(Vec::new()));
    let roster_sink = rosters.clone();
    let _on_users = store.on_users_change(move |users| {
        roster_sink.lock().unwrap().push(users.to_vec());
    });

    let locks = Arc::new(Mutex::new(Vec::new()));
    let lock_sink = locks.clone();
    let _on_locks = store.on_field_lock_change(move |field, owner| {
        lock_sink.lock().unwrap().push((field.to_string(), owner.cloned()));
    });
    settle().await;

    assert_eq!(
        *changes.lock().unwrap(),
        vec![("email".to_string(), json!("b@example.com"))]
    );
    assert_eq!(*rosters.lock().unwrap(), vec![vec![bea.clone()]]);
    assert_eq!(
        *locks.lock().unwrap(),
        vec![("email".to_string(), Some(bea))]
    );
}
