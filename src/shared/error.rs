//! Shared Error Types
//!
//! This module defines the protocol-level error type shared by the client and
//! the server. A `ProtocolError` is always non-fatal: the side that detects
//! it reports the error and keeps the session alive.
//!
//! # Error Categories
//!
//! - `Decode` - an inbound frame could not be parsed into a protocol message
//! - `Encode` - an outbound message could not be serialized
//! - `UnexpectedFrame` - the transport delivered a frame kind the protocol
//!   does not use (e.g. a binary frame)
//! - `Remote` - the peer reported a protocol fault via an `error` message
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be safely shared across thread
//! boundaries.
use thiserror::Error;

/// Errors raised while encoding, decoding or validating protocol messages
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// An inbound frame was not a valid protocol message
    #[error("Protocol decode error: {message}")]
    Decode {
        /// Human-readable description of the parse failure
        message: String,
    },

    /// An outbound message could not be serialized
    #[error("Protocol encode error: {message}")]
    Encode {
        /// Human-readable description of the serialization failure
        message: String,
    },

    /// The transport delivered a frame kind the protocol does not use
    #[error("Unexpected {kind} frame")]
    UnexpectedFrame {
        /// The offending frame kind (e.g. "binary")
        kind: String,
    },

    /// The peer reported a protocol fault
    #[error("Peer reported: {message}")]
    Remote {
        /// The error text carried by the peer's `error` message
        message: String,
    },
}

impl ProtocolError {
    /// Create a new decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a new encode error
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Create a new unexpected-frame error
    pub fn unexpected_frame(kind: impl Into<String>) -> Self {
        Self::UnexpectedFrame { kind: kind.into() }
    }

    /// Create a new peer-reported error
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }
}
