//! Scheduler and timing helpers shared across the suite

use std::time::Duration;

/// Let spawned tasks drain their channels
///
/// Under a paused clock this is pure cooperative yielding; nothing advances
/// time, so debounce and heartbeat timers stay untouched.
pub async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

/// Poll a condition until it holds or the deadline passes
///
/// For tests that run against real sockets, where delivery is prompt but
/// not synchronous. Panics with the given label on timeout.
pub async fn wait_until(label: &str, deadline: Duration, mut condition: impl FnMut() -> bool) {
    let started = std::time::Instant::now();
    while started.elapsed() < deadline {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition '{}' not reached within {:?}", label, deadline);
}
