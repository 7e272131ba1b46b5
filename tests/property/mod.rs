//! Property-based tests
//!
//! Uses proptest to generate adversarial inputs and whole operation
//! sequences, checking the invariants that individual example tests
//! cannot sweep.

#[cfg(feature = "ssr")]
pub mod lock_table_proptest;
pub mod protocol_proptest;
