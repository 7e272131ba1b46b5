/**
 * XFForm Server Entry Point
 *
 * This is the main entry point for the XFForm coordination server.
 * It initializes the Axum HTTP server that relays form field locks,
 * values, and presence between editing sessions.
 */

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    // Initialize tracing with DEBUG level by default
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug".to_string());

    eprintln!("[STARTUP] Setting RUST_LOG={}", env_filter);

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .with_max_level(tracing::Level::DEBUG)
        .init();

    eprintln!("[STARTUP] Tracing initialized");
    tracing::warn!("[STARTUP] Server initialization started");

    // Load configuration and create the Axum app
    let config = xfform::backend::server::config::ServerConfig::from_env();
    let port = config.port;
    let app = xfform::backend::server::init::create_app(config);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    eprintln!("[STARTUP] Starting server on {}", addr);
    tracing::warn!("Starting server on {}", addr);

    // Run the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    eprintln!("[STARTUP] Listening on {}", addr);
    eprintln!("[STARTUP] Clients should connect to ws://127.0.0.1:{}/ws", port);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("Server requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin xfform-server --features ssr");
    std::process::exit(1);
}
