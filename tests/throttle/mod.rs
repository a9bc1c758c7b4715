//! Throttle integration tests
//!
//! - `scenarios`: controller sequences through the public API
//! - `layer`: middleware composition and pacing
//! - `concurrency`: shared and independent throttles under parallel load

mod concurrency;
mod layer;
