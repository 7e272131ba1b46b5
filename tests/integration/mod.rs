//! Integration tests
//!
//! Scenarios that cross module boundaries: the client store driven over a
//! scripted in-process transport, the coordinator driven through its real
//! command channel, and the HTTP surface probed through the router.

pub mod client;
#[cfg(feature = "ssr")]
pub mod http;
