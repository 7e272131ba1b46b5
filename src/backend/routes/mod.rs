//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Architecture
//!
//! - **`router`** - Main router creation and route assembly
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! └── router.rs       - Main router creation
//! ```
//!
//! # Route Organization
//!
//! Routes are added in a specific order to ensure proper matching:
//!
//! 1. **Health Probe** - `GET /health`
//! 2. **WebSocket** - `GET /ws`, the coordination protocol endpoint
//! 3. **Static Fallback** - Front-end assets for every other path
//!
//! # Dependencies
//!
//! - `backend::server::state` - Application state
//! - `backend::ws` - WebSocket upgrade handler

/// Main router creation
pub mod router;

// Re-export commonly used functions
#[cfg(feature = "ssr")]
pub use router::create_router;
