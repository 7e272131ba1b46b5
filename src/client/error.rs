//! Client Error Types
//!
//! This module defines the errors surfaced by the client store and its
//! connection session.
//!
//! # Error Categories
//!
//! - `Protocol` - a malformed message (local decode failure or peer-reported)
//! - `LockConflict` - the server refused a lock because another participant
//!   holds it
//! - `Connectivity` - the transport failed or the heartbeat lapsed; handled
//!   by the reconnect policy and only surfaced for observability
//! - `TerminalConnectivity` - the reconnect budget is exhausted; fatal
//! - `Disposed` - an operation was issued against a disposed store/session
//!
//! # Propagation
//!
//! Connectivity errors never abort the session by themselves — the session
//! retries with backoff until the attempt budget runs out, at which point a
//! `TerminalConnectivity` error is delivered once and the session stops.
use thiserror::Error;

use crate::shared::error::ProtocolError;

/// Errors observable through a client store
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClientError {
    /// A protocol-level fault; the session stays alive
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The server refused a lock request
    #[error("Lock conflict on '{field}': {message}")]
    LockConflict {
        /// The contested field
        field: String,
        /// The server's error text, naming the current owner
        message: String,
    },

    /// The transport failed to establish, dropped, or went silent
    #[error("Connectivity error: {message}")]
    Connectivity {
        /// Human-readable description of the failure
        message: String,
    },

    /// The reconnect attempt budget is exhausted
    #[error("Connection lost after {attempts} reconnect attempts: {message}")]
    TerminalConnectivity {
        /// How many reconnect attempts were made
        attempts: u32,
        /// Human-readable description of the final failure
        message: String,
    },

    /// The store or session was already disposed
    #[error("Client is disposed")]
    Disposed,
}

impl ClientError {
    /// Create a new lock-conflict error
    pub fn lock_conflict(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LockConflict {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new connectivity error
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity {
            message: message.into(),
        }
    }

    /// Create a new terminal connectivity error
    pub fn terminal(attempts: u32, message: impl Into<String>) -> Self {
        Self::TerminalConnectivity {
            attempts,
            message: message.into(),
        }
    }

    /// Whether this error ends the session for good
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::TerminalConnectivity { .. })
    }
}
