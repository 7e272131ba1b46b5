//! Full-stack coordination scenarios
//!
//! Each test boots the real server and talks to it through real WebSocket
//! stores. Assertions poll the public store API; nothing reaches into
//! internals.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;
use xfform::client::{ClientError, FormStore, SessionState};

use crate::common::{wait_until, TestServer};

const DEADLINE: Duration = Duration::from_secs(5);

fn has_user(store: &FormStore, name: &str) -> bool {
    store.get_users().iter().any(|p| p.display_name == name)
}

/// Record `(field, owner display name)` pairs from lock change events
fn lock_recorder(store: &FormStore) -> Arc<Mutex<Vec<(String, Option<String>)>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    // Dropping the handle keeps the observer registered; the stores are
    // disposed at the end of the test anyway.
    let _ = store.on_field_lock_change(move |field, owner| {
        sink.lock()
            .unwrap()
            .push((field.to_string(), owner.map(|p| p.display_name.clone())));
    });
    log
}

#[tokio::test]
async fn test_health_and_static_assets_over_http() {
    let assets = tempfile::tempdir().expect("temp static dir");
    std::fs::write(
        assets.path().join("index.html"),
        "<html><body>form demo</body></html>",
    )
    .expect("write asset");

    let mut config = xfform::backend::server::config::ServerConfig::default();
    config.static_dir = assets.path().to_string_lossy().into_owned();
    let server = TestServer::start(config).await;

    let health: serde_json::Value = reqwest::get(format!("{}/health", server.http_url()))
        .await
        .expect("health request")
        .json()
        .await
        .expect("health body");
    assert_eq!(health, json!({"status": "ok"}));

    let page = reqwest::get(format!("{}/index.html", server.http_url()))
        .await
        .expect("asset request")
        .text()
        .await
        .expect("asset body");
    assert!(page.contains("form demo"));
}

#[tokio::test]
async fn test_lock_coordination_between_real_clients() {
    let server = TestServer::start_default().await;

    let alice = server.connect_store("Alice");
    wait_until("alice is open", DEADLINE, || {
        alice.get_connection_state() == SessionState::Open
    })
    .await;
    wait_until("alice sees her own join echo", DEADLINE, || {
        has_user(&alice, "Alice")
    })
    .await;

    let bob = server.connect_store("Bob");
    wait_until("alice sees bob arrive", DEADLINE, || has_user(&alice, "Bob")).await;

    // Alice takes a field. Bob observes it; Alice's own echo is suppressed.
    let alice_locks = lock_recorder(&alice);
    let bob_locks = lock_recorder(&bob);
    alice.lock_field("email").unwrap();
    wait_until("alice holds email", DEADLINE, || {
        alice.is_field_locked_by_me("email")
    })
    .await;
    wait_until("bob sees the lock", DEADLINE, || bob.is_field_locked("email")).await;
    assert_eq!(
        bob.get_field_locker("email").map(|p| p.display_name),
        Some("Alice".to_string())
    );
    assert!(!bob.is_field_locked_by_me("email"));
    assert_eq!(
        *bob_locks.lock().unwrap(),
        vec![("email".to_string(), Some("Alice".to_string()))]
    );
    assert!(
        alice_locks.lock().unwrap().is_empty(),
        "own grants must not echo into observers"
    );

    // A newcomer knows nothing yet and contests the field; the refusal is
    // private and names the holder.
    let carol = server.connect_store("Carol");
    let carol_errors: Arc<Mutex<Vec<ClientError>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = carol_errors.clone();
    let _ = carol.on_error(move |error| sink.lock().unwrap().push(error.clone()));
    carol.lock_field("email").unwrap();
    wait_until("carol is refused", DEADLINE, || {
        !carol_errors.lock().unwrap().is_empty()
    })
    .await;
    {
        let errors = carol_errors.lock().unwrap();
        assert_matches!(
            errors.first(),
            Some(ClientError::LockConflict { field, message })
                if field == "email" && message.contains("Alice")
        );
    }
    assert!(!carol.is_field_locked_by_me("email"));

    // Values propagate to everyone.
    alice
        .update_field("email", json!("alice@example.com"))
        .unwrap();
    wait_until("bob sees the value", DEADLINE, || {
        bob.get_field("email") == Some(json!("alice@example.com"))
    })
    .await;

    // Bob takes a second field, then leaves; his lock is force-released and
    // his departure reaches the roster.
    bob.lock_field("phone").unwrap();
    wait_until("alice sees bob's lock", DEADLINE, || {
        alice.get_field_locker("phone").map(|p| p.display_name) == Some("Bob".to_string())
    })
    .await;

    bob.disconnect();
    wait_until("bob's lock is force-released", DEADLINE, || {
        !alice.is_field_locked("phone")
    })
    .await;
    wait_until("bob leaves the roster", DEADLINE, || !has_user(&alice, "Bob")).await;

    alice.disconnect();
    carol.disconnect();
}

#[tokio::test]
async fn test_fast_typing_takes_exactly_one_lock() {
    let server = TestServer::start_default().await;

    let alice = server.connect_store("Alice");
    wait_until("alice is open", DEADLINE, || {
        alice.get_connection_state() == SessionState::Open
    })
    .await;
    let bob = server.connect_store("Bob");
    wait_until("alice sees bob", DEADLINE, || has_user(&alice, "Bob")).await;

    let bob_locks = lock_recorder(&bob);

    // Focus, then type immediately: the first keystroke must promote the
    // pending intent instead of waiting for the debounce timer.
    alice.handle_field_focus("bio").unwrap();
    alice.handle_field_change("bio", json!("h")).unwrap();
    alice.handle_field_change("bio", json!("he")).unwrap();
    alice.handle_field_change("bio", json!("hello")).unwrap();

    wait_until("bob sees the lock", DEADLINE, || {
        bob.is_field_locked("bio")
    })
    .await;
    wait_until("bob sees the final value", DEADLINE, || {
        bob.get_field("bio") == Some(json!("hello"))
    })
    .await;

    // Give any spurious extra grant time to arrive, then count.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(
        *bob_locks.lock().unwrap(),
        vec![("bio".to_string(), Some("Alice".to_string()))],
        "rapid typing must produce exactly one lock"
    );

    alice.handle_field_blur("bio").unwrap();
    wait_until("blur releases the lock", DEADLINE, || {
        !bob.is_field_locked("bio")
    })
    .await;
    assert_eq!(
        bob_locks.lock().unwrap().last(),
        Some(&("bio".to_string(), None))
    );

    alice.disconnect();
    bob.disconnect();
}
