//! Sliding-window request-rate estimation for the demo server.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Number of most recent request timestamps the rate is computed over.
pub const WINDOW_SIZE: usize = 20;

/// Requests per second the server accepts before answering with overload.
pub const DEFAULT_MAX_RATE: f64 = 10.0;

/// How the server answers a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The observed rate is within the ceiling.
    Accepted,
    /// The observed rate is above the ceiling.
    Overloaded,
    /// The ceiling is zero, so no request can be served.
    Unconfigured,
}

/// Tracks recent request arrivals and decides whether the server is
/// overloaded.
///
/// Shared between handlers behind an `Arc`; both the window and the ceiling
/// are locked independently.
#[derive(Debug)]
pub struct RateTracker {
    window: Mutex<VecDeque<Instant>>,
    max_rate: Mutex<f64>,
}

impl Default for RateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RateTracker {
    /// Creates a tracker with an empty window and [`DEFAULT_MAX_RATE`].
    pub fn new() -> Self {
        Self::with_max_rate(DEFAULT_MAX_RATE)
    }

    pub fn with_max_rate(max_rate: f64) -> Self {
        Self {
            window: Mutex::new(VecDeque::with_capacity(WINDOW_SIZE)),
            max_rate: Mutex::new(max_rate),
        }
    }

    /// Records a request that arrived at `now` and classifies it.
    pub fn admit(&self, now: Instant) -> Verdict {
        let rate = {
            let mut window = lock(&self.window);
            window.push_front(now);
            window.truncate(WINDOW_SIZE);
            rate_of(&window)
        };
        let max_rate = self.max_rate();

        tracing::debug!(rate, max_rate, "request rate");

        if max_rate == 0.0 {
            Verdict::Unconfigured
        } else if rate > max_rate {
            Verdict::Overloaded
        } else {
            Verdict::Accepted
        }
    }

    /// Requests per second over the current window.
    ///
    /// Fewer than two recorded requests give `0.0`. Two or more requests
    /// recorded at the same instant give `f64::INFINITY`.
    pub fn rate(&self) -> f64 {
        rate_of(&lock(&self.window))
    }

    pub fn max_rate(&self) -> f64 {
        *lock(&self.max_rate)
    }

    pub fn set_max_rate(&self, max_rate: f64) {
        *lock(&self.max_rate) = max_rate;
    }

    /// Number of timestamps currently in the window.
    pub fn len(&self) -> usize {
        lock(&self.window).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.window).is_empty()
    }
}

fn rate_of(window: &VecDeque<Instant>) -> f64 {
    let (Some(newest), Some(oldest)) = (window.front(), window.back()) else {
        return 0.0;
    };
    if window.len() < 2 {
        return 0.0;
    }

    let span = (*newest).max(*oldest) - (*newest).min(*oldest);
    if span.is_zero() {
        return f64::INFINITY;
    }
    window.len() as f64 / span.as_secs_f64()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
