//! Client store integration tests

pub mod lifecycle_test;
pub mod locking_test;
