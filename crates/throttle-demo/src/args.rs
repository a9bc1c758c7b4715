//! Command-line arguments for the demo binaries.

use crate::client::{ClientConfig, DEFAULT_JOBS, DEFAULT_URL, DEFAULT_WORKERS};
use crate::rate::DEFAULT_MAX_RATE;
use crate::server::DEFAULT_ADDR;
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;
use throttle_core::ThrottleConfig;

/// Demo server that answers 503 once requests arrive faster than a ceiling.
#[derive(Debug, Clone, Parser)]
#[command(name = "throttle-server", version)]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, default_value = DEFAULT_ADDR)]
    pub addr: SocketAddr,

    /// Initial ceiling in requests per second; change it later via /config
    #[arg(long, default_value_t = DEFAULT_MAX_RATE)]
    pub max_rate: f64,
}

/// Worker-pool client that throttles itself against the demo server.
#[derive(Debug, Clone, Parser)]
#[command(name = "throttle-client", version)]
pub struct ClientArgs {
    /// Endpoint every job requests
    #[arg(long, default_value = DEFAULT_URL)]
    pub url: String,

    /// Number of concurrent workers
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Number of jobs to run
    #[arg(long, default_value_t = DEFAULT_JOBS)]
    pub jobs: usize,

    /// Delay between starting workers, in milliseconds
    #[arg(long, default_value_t = 50)]
    pub stagger_ms: u64,

    /// Sleep each worker starts with, in milliseconds [default: 100]
    #[arg(long)]
    pub initial_sleep_ms: Option<u64>,

    /// Shortest sleep, in milliseconds [default: 10]
    #[arg(long)]
    pub min_sleep_ms: Option<u64>,

    /// Longest sleep, in milliseconds [default: 10000]
    #[arg(long)]
    pub max_sleep_ms: Option<u64>,

    /// Factor applied to the sleep after a non-200 response [default: 1.2]
    #[arg(long)]
    pub increase_modifier: Option<f64>,

    /// Factor applied to the sleep after a 200 response [default: 0.8]
    #[arg(long)]
    pub decrease_modifier: Option<f64>,
}

impl ClientArgs {
    /// Converts the arguments into run settings. Unset throttle options keep
    /// the controller defaults.
    pub fn client_config(&self) -> ClientConfig {
        let mut throttle = ThrottleConfig::new();
        if let Some(ms) = self.initial_sleep_ms {
            throttle = throttle.with_initial_sleep(Duration::from_millis(ms));
        }
        if let Some(ms) = self.min_sleep_ms {
            throttle = throttle.with_min_sleep(Duration::from_millis(ms));
        }
        if let Some(ms) = self.max_sleep_ms {
            throttle = throttle.with_max_sleep(Duration::from_millis(ms));
        }
        if let Some(modifier) = self.increase_modifier {
            throttle = throttle.with_increase_modifier(modifier);
        }
        if let Some(modifier) = self.decrease_modifier {
            throttle = throttle.with_decrease_modifier(modifier);
        }

        ClientConfig {
            url: self.url.clone(),
            workers: self.workers,
            jobs: self.jobs,
            stagger: Duration::from_millis(self.stagger_ms),
            throttle,
        }
    }
}
