//! HTTP surface tests through the router

pub mod health_test;
