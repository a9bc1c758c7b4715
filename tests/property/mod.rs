//! Property-based tests for the throttle controller.
//!
//! Run with: cargo test --test property_tests

pub mod config;
pub mod throttle;
