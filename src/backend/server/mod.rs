//! Server Module
//!
//! This module contains all server-side code for initializing and configuring
//! the Axum HTTP server. It provides the foundation for the application's
//! backend infrastructure.
//!
//! # Architecture
//!
//! The server module is organized into focused submodules:
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`config`** - Configuration loading from environment variables
//! - **`init`** - Server initialization and app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Configuration loading (port, buffers, intervals)
//! └── init.rs         - Server initialization and app creation
//! ```
//!
//! # State Management
//!
//! The server uses `AppState` as the central state container, which holds:
//! - The lock coordinator handle
//! - The server configuration
//!
//! Both parts are cheaply cloneable, so the state is shared across all
//! request handlers by value.
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: Reads environment variables with defaults
//! 2. **Coordinator Spawn**: Starts the actor that owns locks and the roster
//! 3. **Heartbeat**: Starts the periodic ping sweep
//! 4. **Router Creation**: Configures all routes and the static fallback
//!
//! # Dependencies
//!
//! - `backend::coordinator` - Lock coordination actor
//! - `backend::routes` - Route configuration
//! - `backend::ws` - WebSocket handler and heartbeat

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

// Re-export commonly used types
#[cfg(feature = "ssr")]
pub use config::ServerConfig;
#[cfg(feature = "ssr")]
pub use init::create_app;
#[cfg(feature = "ssr")]
pub use state::AppState;
