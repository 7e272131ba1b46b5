/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including actor spawning, state creation, and route configuration.
 *
 * # Initialization Process
 *
 * The server initialization follows these steps:
 * 1. Spawn the lock coordinator actor
 * 2. Start the heartbeat sweep
 * 3. Assemble the application state
 * 4. Create and configure the router
 *
 * # Error Handling
 *
 * Initialization cannot fail: the coordinator owns only in-memory state
 * and the configuration always resolves to usable values.
 */

#[cfg(feature = "ssr")]
use axum::Router;
#[cfg(feature = "ssr")]
use std::sync::Arc;
#[cfg(feature = "ssr")]
use crate::backend::coordinator::LockCoordinator;
#[cfg(feature = "ssr")]
use crate::backend::routes::router::create_router;
#[cfg(feature = "ssr")]
use crate::backend::server::config::ServerConfig;
#[cfg(feature = "ssr")]
use crate::backend::server::state::AppState;
#[cfg(feature = "ssr")]
use crate::backend::ws::spawn_heartbeat;

/// Create and configure the Axum application
///
/// This function sets up the Axum HTTP server with:
/// - The lock coordinator actor
/// - The periodic heartbeat sweep
/// - Route configuration
///
/// # Arguments
///
/// * `config` - Server configuration loaded at startup
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
///
/// # Initialization Steps
///
/// 1. **Spawn Coordinator**: Starts the actor that owns the lock table and roster
/// 2. **Start Heartbeat**: Periodic ping sweep over every registered session
/// 3. **Assemble State**: Bundles the coordinator handle and configuration
/// 4. **Create Router**: Configures all routes and the static fallback
///
/// Must be called from within a Tokio runtime; both the coordinator and
/// the heartbeat are spawned tasks.
#[cfg(feature = "ssr")]
pub fn create_app(config: ServerConfig) -> Router<()> {
    tracing::info!("Initializing form coordination server");

    // Step 1: Spawn the lock coordinator
    // Every lock decision flows through this one actor
    let coordinator = LockCoordinator::spawn();

    // Step 2: Start the heartbeat sweep
    // Rides the coordinator's normal fan-out, so slow sessions get
    // dropped here too
    spawn_heartbeat(coordinator.clone(), config.ping_interval);

    tracing::info!("Coordinator and heartbeat task started");

    // Step 3: Assemble app state
    let app_state = AppState {
        coordinator,
        config: Arc::new(config),
    };

    // Step 4: Create router with all routes
    create_router(app_state)
}
