/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * Routes are added in a specific order to ensure proper matching:
 * 1. Health probe
 * 2. WebSocket upgrade for the coordination protocol
 * 3. Static fallback (front-end assets)
 *
 * # Route Priority
 *
 * Protocol routes are added before the static fallback so they take
 * precedence; every unmatched path is treated as an asset request.
 */

use axum::Router;
#[cfg(feature = "ssr")]
use crate::backend::server::state::AppState;
use tower_http::services::ServeDir;

/// Create the Axum router with all routes configured
///
/// This function sets up all HTTP routes for the application in the
/// following order:
///
/// 1. **Health**: Liveness probe for deployment checks
/// 2. **WebSocket**: Session upgrade endpoint
/// 3. **Static Files**: Front-end assets from the configured directory
///
/// # Arguments
///
/// * `app_state` - Application state containing the coordinator handle
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
///
/// # Route Details
///
/// - `GET /health` - Returns `{"status":"ok"}`
/// - `GET /ws` - WebSocket upgrade; one session per accepted socket
/// - anything else - Served from the static directory
#[cfg(feature = "ssr")]
pub fn create_router(app_state: AppState) -> Router<()> {
    let static_dir = app_state.config.static_dir.clone();

    // Protocol routes first so they win over the static fallback
    let router = Router::new()
        .route("/health", axum::routing::get(health))
        .route(
            "/ws",
            axum::routing::get({
                use crate::backend::ws::ws_handler;
                ws_handler
            }),
        );

    // Everything else serves the bundled front-end assets
    let router = router.fallback_service(ServeDir::new(static_dir));

    // Use AppState as router state
    router.with_state(app_state)
}

/// Liveness probe used by deployment checks
#[cfg(feature = "ssr")]
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
