//! Demonstration of adaptive throttling over HTTP.
//!
//! The [`server`] answers `503` once requests arrive faster than a ceiling
//! that can be changed at runtime. The [`client`] drains a queue of jobs
//! with a pool of workers, each pacing itself through its own
//! [`ThrottleLayer`](throttle_tower::ThrottleLayer).
//!
//! ```text
//! throttle-server --max-rate 10
//! throttle-client --workers 5 --jobs 1000
//! curl 'http://localhost:23456/config?max=25'
//! ```

pub mod args;
pub mod client;
pub mod error;
pub mod rate;
pub mod server;

pub use client::{run, ClientConfig, Job, RunSummary, StatusFetcher};
pub use error::DemoError;
pub use rate::{RateTracker, Verdict};

use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
