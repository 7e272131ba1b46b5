//! Backend Module
//!
//! This module contains all server-side code for the XFForm application.
//! It provides a complete Axum HTTP server that coordinates field locks
//! across every connected form editing session.
//!
//! # Overview
//!
//! The backend module includes:
//! - Axum HTTP server setup and configuration
//! - The lock coordinator actor (lock table, roster, fan-out)
//! - WebSocket session handling and heartbeat sweeps
//! - Route configuration and static asset serving
//!
//! This module is only compiled when the `ssr` feature is enabled.
//! All code in this module runs on the server and handles HTTP requests.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`coordinator`** - Lock coordination actor and its state tables
//! - **`ws`** - WebSocket upgrade handling and the heartbeat sweep
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── coordinator/    - Lock coordination actor
//! └── ws/             - WebSocket handler and heartbeat
//! ```
//!
//! # Coordination Model
//!
//! Every decision that touches the lock table or the roster flows through
//! one actor task. Sockets never share mutable state; they translate frames
//! into coordinator commands and copy fan-out frames back out. A session
//! whose outbound buffer stays full is dropped rather than allowed to
//! stall the rest of the room.
//!
//! # Thread Safety
//!
//! All backend code is designed for concurrent access:
//! - The coordinator owns its state exclusively; no locks are shared
//! - `CoordinatorHandle` clones feed one command channel
//! - Axum handlers are `Send + Sync`
//!
//! # Error Handling
//!
//! Protocol violations never take the server down. Malformed frames are
//! answered with a private error message on the offending session; every
//! other session is unaffected.

/// Server setup and configuration
#[cfg(feature = "ssr")]
pub mod server;

/// Route configuration
#[cfg(feature = "ssr")]
pub mod routes;

/// Lock coordination actor
#[cfg(feature = "ssr")]
pub mod coordinator;

/// WebSocket transport and heartbeat
#[cfg(feature = "ssr")]
pub mod ws;

/// Re-export commonly used types
#[cfg(feature = "ssr")]
pub use coordinator::{CoordinatorHandle, LockCoordinator};
#[cfg(feature = "ssr")]
pub use server::{create_app, AppState, ServerConfig};
#[cfg(feature = "ssr")]
pub use ws::{spawn_heartbeat, ws_handler};
