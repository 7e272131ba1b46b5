//! E2E test suite for XFForm
//!
//! Full client/server round trips: real Axum server on an ephemeral port,
//! real WebSocket stores on the other end.

pub mod form_suite;
