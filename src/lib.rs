// Increase recursion limit for the larger async select loops
#![recursion_limit = "256"]

//! XFForm - Main Library
//!
//! XFForm is a collaborative form editing toolkit built with Rust. A central
//! coordination server grants per-field locks to editing sessions and relays
//! field values and presence, so several people can fill in one form without
//! stepping on each other's input.
//!
//! # Overview
//!
//! This library provides the core functionality for XFForm, including:
//! - A JSON wire protocol for locks, updates, presence, and heartbeats
//! - A reconnecting client store with focus/blur/change lock acquisition
//! - An Axum WebSocket server that serializes every lock decision
//! - Observer registration with replay for late subscribers
//!
//! # Module Structure
//!
//! The library is organized into three main modules:
//!
//! - **`shared`** - Types shared between client and server
//!   - Wire protocol messages and the `{"type","data"}` envelope
//!   - Participant and field-lock data structures
//!   - Configuration and error types
//!
//! - **`client`** - Client-side store (always compiled)
//!   - Reconnecting connection session with heartbeat and backoff
//!   - Store worker owning caches, debounce timers, and observers
//!   - Pluggable transports (WebSocket, in-process memory)
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server with the `/ws` upgrade endpoint
//!   - Lock coordinator actor owning the lock table and roster
//!   - Heartbeat sweep and slow-session eviction
//!
//! # Feature Flags
//!
//! The library uses feature flags to control compilation:
//!
//! - **`ssr`** - Server-side code (enables the backend modules)
//!   - Includes the Axum server, coordinator, and WebSocket handler
//!   - Required for server builds
//!
//! # Usage
//!
//! ## Client-Side
//!
//! ```rust,no_run
//! use xfform::client::FormStore;
//! use xfform::shared::ClientConfig;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = FormStore::connect(ClientConfig::new("ws://127.0.0.1:3001/ws", "Alice"))?;
//!     let changes = store.on_change(|field, value| println!("{} = {}", field, value));
//!     store.handle_field_focus("email")?;
//!     // ... edit, observe, coordinate ...
//!     changes.unsubscribe();
//!     store.disconnect();
//!     Ok(())
//! }
//! ```
//!
//! ## Server-Side
//!
//! For server builds, use the `ssr` feature:
//!
//! ```rust,ignore
//! use xfform::backend::server::config::ServerConfig;
//! use xfform::backend::server::init::create_app;
//!
//! let config = ServerConfig::from_env();
//! let app = create_app(config);
//! // Use app with axum::serve
//! ```
//!
//! # Architecture
//!
//! The application follows a modular architecture:
//!
//! - **Shared Types**: Platform-agnostic types for serialization
//! - **Client**: Actor-style store worker behind a cheap cloneable facade
//! - **Backend**: Axum server with one coordinator actor per process
//!
//! # Coordination Model
//!
//! Locks are advisory and field-grained. The server is the single authority:
//! a lock exists once the coordinator has granted it and every session has
//! been told. Clients request locks after a short focus debounce (or
//! immediately on first change), release on blur, and suppress their own
//! echoes by comparing the server-assigned session id.
//!
//! # Thread Safety
//!
//! - **Server**: The coordinator actor owns all mutable state exclusively
//! - **Client**: One worker task owns caches and observers; the facade
//!   reads through a shared snapshot and never blocks the worker
//!
//! # Error Handling
//!
//! The library uses Rust's standard error handling:
//!
//! - `Result<T, E>` for fallible operations
//! - `Option<T>` for optional values
//! - Custom error types in `shared::error` and `client::error`

/// Shared types and data structures
pub mod shared;

/// Client-side store and connection session
pub mod client;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
