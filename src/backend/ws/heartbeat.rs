/**
 * Server Heartbeat
 *
 * Periodically asks the coordinator to ping every session. Sessions whose
 * outbound buffers cannot even accept the ping are dropped through the
 * coordinator's normal slow-consumer handling, so the sweep doubles as a
 * liveness check for sockets that died without sending a close frame.
 */
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::backend::coordinator::CoordinatorHandle;

/// Spawn the periodic ping task
///
/// The returned handle can be aborted on shutdown; the task itself never
/// exits on its own.
pub fn spawn_heartbeat(coordinator: CoordinatorHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            debug!("[Ws] pinging all sessions");
            coordinator.ping_all();
        }
    })
}
