//! WebSocket transport for the form coordination server
//!
//! # Overview
//!
//! Bridges axum's WebSocket upgrade machinery to the lock coordinator.
//! Each accepted socket becomes one session: a fresh id, a bounded outbound
//! channel registered with the coordinator, and a pair of pumps moving
//! frames between the socket and the actor.
//!
//! # Architecture
//!
//! - **handler**: upgrade endpoint and the per-session socket loop
//! - **heartbeat**: periodic ping sweep across all registered sessions
//!
//! # Module Structure
//!
//! ```text
//! ws/
//! ├── mod.rs        - Module exports
//! ├── handler.rs    - /ws upgrade handler and socket pumps
//! └── heartbeat.rs  - Periodic ping task
//! ```

pub mod handler;
pub mod heartbeat;

pub use handler::ws_handler;
pub use heartbeat::spawn_heartbeat;
