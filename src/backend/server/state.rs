/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container for the
 * application, holding:
 * - A handle to the lock coordinator actor
 * - The server configuration loaded at startup
 *
 * # Thread Safety
 *
 * All state is designed to be thread-safe:
 * - `CoordinatorHandle` is a cloneable command-channel sender
 * - `Arc<ServerConfig>` shares the immutable configuration
 *
 * # State Extraction
 *
 * The `FromRef` implementations allow Axum handlers to extract specific
 * parts of the state without needing the entire `AppState`. This follows
 * Axum's recommended pattern for state management.
 */

#[cfg(feature = "ssr")]
use axum::extract::FromRef;
#[cfg(feature = "ssr")]
use std::sync::Arc;
#[cfg(feature = "ssr")]
use crate::backend::coordinator::CoordinatorHandle;
#[cfg(feature = "ssr")]
use crate::backend::server::config::ServerConfig;

/// Application state shared by every route
///
/// This struct serves as the central state container for the Axum
/// application. It implements `FromRef` for its parts so handlers can
/// extract just what they need.
///
/// # Fields
///
/// * `coordinator` - Command handle to the lock coordinator actor
/// * `config` - Server configuration loaded at startup
///
/// # Thread Safety
///
/// All fields are designed for concurrent access:
/// - `CoordinatorHandle` clones share one command channel into the actor
/// - `Arc<ServerConfig>` is immutable after startup
#[cfg(feature = "ssr")]
#[derive(Clone)]
pub struct AppState {
    /// Command handle to the lock coordinator actor
    ///
    /// Cloning the handle is cheap; every clone feeds the same actor,
    /// which is what keeps lock decisions serialized.
    pub coordinator: CoordinatorHandle,

    /// Server configuration loaded at startup
    ///
    /// Shared immutably; handlers read buffer sizes and paths from it.
    pub config: Arc<ServerConfig>,
}

#[cfg(feature = "ssr")]
/// Implement FromRef for CoordinatorHandle
///
/// This allows Axum handlers to extract the coordinator handle directly
/// from `AppState` using `State(CoordinatorHandle)`.
impl FromRef<AppState> for CoordinatorHandle {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.coordinator.clone()
    }
}

#[cfg(feature = "ssr")]
/// Implement FromRef for Arc<ServerConfig>
///
/// This allows Axum handlers to extract the shared configuration directly
/// from `AppState`.
impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
