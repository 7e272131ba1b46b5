//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - Scheduler settling and condition polling
//! - In-process server fixtures for end-to-end tests

pub mod fixtures;
#[cfg(feature = "ssr")]
pub mod server;

// Re-export commonly used utilities
pub use fixtures::*;
#[cfg(feature = "ssr")]
pub use server::*;
