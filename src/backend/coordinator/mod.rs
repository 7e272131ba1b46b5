//! Lock Coordinator Module
//!
//! The authoritative side of field locking. A single actor task owns the
//! lock table and the participant roster, applies every inbound message in
//! arrival order, and fans results out to all connected sessions.
//!
//! # Architecture
//!
//! - **`state`** - `LockTable` and `Roster`, the pure data structures
//! - **`actor`** - `LockCoordinator` task and its `CoordinatorHandle`
//!
//! # Module Structure
//!
//! ```text
//! coordinator/
//! ├── mod.rs      - Module exports and documentation
//! ├── state.rs    - Lock table and roster
//! └── actor.rs    - Coordinator task, commands, fan-out
//! ```
//!
//! # Serialization Model
//!
//! All writes funnel through one command channel into one task. That makes
//! per-field serialization trivial (no two messages are ever applied
//! concurrently) at the cost of a single choke point, which is acceptable
//! because lock and presence traffic is low-frequency compared to raw
//! socket I/O handled out in the session tasks.

/// Lock table and roster data structures
pub mod state;

/// The coordinator actor and its handle
pub mod actor;

// Re-export commonly used types
pub use actor::{CoordinatorHandle, LockCoordinator};
pub use state::{LockTable, Roster, SessionId};
