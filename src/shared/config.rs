//! Client configuration module
//!
//! Provides the tunables for a client store and its connection session,
//! with validated defaults matching the production deployment: 500 ms lock
//! debounce, 15 s heartbeat, 45 s liveness window, and an exponential
//! reconnect policy of 1 s doubling up to 30 s for at most 10 attempts.

use std::time::Duration;

use thiserror::Error;

/// Reconnect backoff policy for a connection session
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectConfig {
    /// Delay before the first reconnect attempt
    pub initial_delay: Duration,
    /// Upper bound for any reconnect delay
    pub max_delay: Duration,
    /// Factor applied to the delay after each failed attempt
    pub multiplier: f64,
    /// Attempts allowed before the session becomes terminal
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            max_attempts: 10,
        }
    }
}

impl ReconnectConfig {
    /// Delay to wait before the given 1-based attempt
    ///
    /// Grows exponentially from `initial_delay` by `multiplier` per failed
    /// attempt and is clamped to `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63);
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent as i32);
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(secs).min(self.max_delay)
        }
    }
}

/// Configuration for a client store
///
/// Built via [`ClientConfig::new`] for the defaults or
/// [`ClientConfig::builder`] to override individual tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// WebSocket address of the coordination server (e.g. `ws://host:3001/ws`)
    pub server_url: String,
    /// Display name announced in the `join` message
    pub display_name: String,
    /// Delay between field focus and the lock request
    pub debounce_delay: Duration,
    /// Period between heartbeat pings while the session is open
    pub heartbeat_interval: Duration,
    /// Silence duration after which the peer is presumed dead
    pub liveness_timeout: Duration,
    /// Reconnect backoff policy
    pub reconnect: ReconnectConfig,
}

impl ClientConfig {
    /// Create a configuration with production defaults
    pub fn new(server_url: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            display_name: display_name.into(),
            debounce_delay: Duration::from_millis(500),
            heartbeat_interval: Duration::from_secs(15),
            liveness_timeout: Duration::from_secs(45),
            reconnect: ReconnectConfig::default(),
        }
    }

    /// Create a new ClientConfigBuilder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_url.is_empty() {
            return Err(ConfigError::MissingValue("server_url"));
        }
        if self.display_name.is_empty() {
            return Err(ConfigError::MissingValue("display_name"));
        }
        if self.heartbeat_interval.is_zero() {
            return Err(ConfigError::invalid(
                "heartbeat_interval",
                "must be non-zero",
            ));
        }
        if self.liveness_timeout <= self.heartbeat_interval {
            return Err(ConfigError::invalid(
                "liveness_timeout",
                "must exceed the heartbeat interval",
            ));
        }
        if self.reconnect.multiplier < 1.0 {
            return Err(ConfigError::invalid("multiplier", "must be at least 1.0"));
        }
        if self.reconnect.max_delay < self.reconnect.initial_delay {
            return Err(ConfigError::invalid(
                "max_delay",
                "must be at least the initial delay",
            ));
        }
        if self.reconnect.max_attempts == 0 {
            return Err(ConfigError::invalid(
                "max_attempts",
                "must allow at least one attempt",
            ));
        }
        Ok(())
    }
}

/// Builder for ClientConfig
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    server_url: Option<String>,
    display_name: Option<String>,
    debounce_delay: Option<Duration>,
    heartbeat_interval: Option<Duration>,
    liveness_timeout: Option<Duration>,
    reconnect: Option<ReconnectConfig>,
}

impl ClientConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Set the display name
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the lock debounce delay
    pub fn debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = Some(delay);
        self
    }

    /// Set the heartbeat period
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }

    /// Set the liveness timeout
    pub fn liveness_timeout(mut self, timeout: Duration) -> Self {
        self.liveness_timeout = Some(timeout);
        self
    }

    /// Set the reconnect policy
    pub fn reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = Some(reconnect);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let server_url = self.server_url.ok_or(ConfigError::MissingValue("server_url"))?;
        let display_name = self
            .display_name
            .ok_or(ConfigError::MissingValue("display_name"))?;
        let mut config = ClientConfig::new(server_url, display_name);
        if let Some(delay) = self.debounce_delay {
            config.debounce_delay = delay;
        }
        if let Some(interval) = self.heartbeat_interval {
            config.heartbeat_interval = interval;
        }
        if let Some(timeout) = self.liveness_timeout {
            config.liveness_timeout = timeout;
        }
        if let Some(reconnect) = self.reconnect {
            config.reconnect = reconnect;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}
