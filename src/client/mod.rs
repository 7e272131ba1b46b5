//! Client Module
//!
//! This module contains the client side of the collaborative form system:
//! the `FormStore` facade the UI talks to, the connection session that keeps
//! a WebSocket alive across network trouble, and the worker that serializes
//! every state mutation.
//!
//! # Overview
//!
//! The client module includes:
//! - Store facade with intent operations and pure-read getters
//! - Debounced lock acquisition for focus/blur/change UI events
//! - Reconnection with exponential backoff and outbound queueing
//! - Heartbeat and liveness supervision of the connection
//! - Observer registry with replay-at-registration semantics
//!
//! # Architecture
//!
//! The client is organized into focused submodules:
//!
//! - **`store`** - `FormStore`, the cloneable public handle
//! - **`worker`** - The single task that owns caches, timers, observers
//! - **`session`** - Connection lifecycle, heartbeat, backoff, queueing
//! - **`transport`** - The `Transport`/`Connector` seam, WebSocket and
//!   in-process implementations
//! - **`observers`** - Callback registry keyed by stable subscription ids
//! - **`error`** - Client-side error types
//!
//! # Module Structure
//!
//! ```text
//! client/
//! ├── mod.rs        - Module exports and documentation
//! ├── store.rs      - Public store handle
//! ├── worker.rs     - State-owning worker task
//! ├── session.rs    - Connection session state machine
//! ├── transport.rs  - Transport trait and implementations
//! ├── observers.rs  - Observer registry and subscriptions
//! └── error.rs      - Error types
//! ```
//!
//! # Data Flow
//!
//! ```text
//! UI intent ──► FormStore ──► StoreWorker ──► ConnectionSession ──► server
//!                                 ▲                   │
//!                                 └── session events ◄┘
//! ```
//!
//! Broadcasts coming back from the server are reconciled into the worker's
//! caches and fanned out to registered observers; echoes of this client's
//! own lock traffic are suppressed by server-assigned participant id.

pub mod error;
pub mod observers;
pub mod session;
pub mod store;
pub mod transport;
pub mod worker;

pub use error::ClientError;
pub use observers::Subscription;
pub use session::SessionState;
pub use store::FormStore;
pub use transport::{Connector, MemoryConnector, MemoryControl, MemoryLink, Transport, WsConnector};
