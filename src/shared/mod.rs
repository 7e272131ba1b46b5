//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the client and the server. These types define the wire protocol and the
//! data model for collaborative form sessions.
//!
//! # Overview
//!
//! The shared module provides platform-agnostic types that can be used in
//! both server and client code. All wire types serialize to the
//! `{"type", "data"}` JSON envelope carried over the WebSocket transport.

/// Wire protocol messages
pub mod protocol;

/// Participant and field-lock data structures
pub mod participant;

/// Shared error types
pub mod error;

/// Client configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use config::{ClientConfig, ClientConfigBuilder, ConfigError, ReconnectConfig};
pub use error::ProtocolError;
pub use participant::{FieldLock, Participant};
pub use protocol::FormMessage;
