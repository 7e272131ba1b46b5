/**
 * Server Configuration
 *
 * This module handles loading of server configuration from environment
 * variables, with sensible defaults for local development.
 *
 * # Configuration Sources
 *
 * - `SERVER_PORT`: TCP port to bind (default 3001)
 * - `XFFORM_STATIC_DIR`: directory served for non-API routes (default "public")
 * - `XFFORM_SESSION_BUFFER`: outbound frames buffered per session (default 256)
 * - `XFFORM_PING_INTERVAL_SECS`: heartbeat sweep period in seconds (default 30)
 *
 * # Error Handling
 *
 * Malformed values are logged and replaced with their defaults.
 * Configuration never prevents server startup.
 */

#[cfg(feature = "ssr")]
use std::time::Duration;

/// Runtime settings for the coordination server
#[cfg(feature = "ssr")]
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port the HTTP listener binds on
    pub port: u16,
    /// Directory served for static assets and the page fallback
    pub static_dir: String,
    /// Outbound frames buffered per session before it is dropped as slow
    pub session_buffer: usize,
    /// Period of the heartbeat ping sweep
    pub ping_interval: Duration,
}

#[cfg(feature = "ssr")]
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            static_dir: "public".to_string(),
            session_buffer: 256,
            ping_interval: Duration::from_secs(30),
        }
    }
}

#[cfg(feature = "ssr")]
impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Missing variables fall back to their defaults silently; present but
    /// malformed values fall back with a warning.
    ///
    /// # Returns
    ///
    /// A complete configuration. This function cannot fail.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parsed("SERVER_PORT", defaults.port),
            static_dir: std::env::var("XFFORM_STATIC_DIR").unwrap_or(defaults.static_dir),
            session_buffer: env_parsed("XFFORM_SESSION_BUFFER", defaults.session_buffer),
            ping_interval: Duration::from_secs(env_parsed(
                "XFFORM_PING_INTERVAL_SECS",
                defaults.ping_interval.as_secs(),
            )),
        }
    }
}

/// Read an environment variable and parse it, falling back on failure
#[cfg(feature = "ssr")]
fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("{} has unparseable value {:?}, using default", name, raw);
                default
            }
        },
        Err(_) => default,
    }
}
