//! The throttle controller.
//!
//! A [`Throttler`] tracks one sleep duration. Callers wait that long before
//! each action and then report how it went:
//! - **Increase**: the action failed or the remote side signalled overload;
//!   the duration is multiplied by the increase modifier, capped at the
//!   maximum.
//! - **Decrease**: the action succeeded; the duration is multiplied by the
//!   decrease modifier, floored at the minimum.
//!
//! Both steps are multiplicative, so the duration ramps up quickly under
//! sustained overload and relaxes geometrically once it clears.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use throttle_core::{ThrottleConfig, Throttler};
//!
//! let mut throttler = Throttler::new(
//!     ThrottleConfig::new()
//!         .with_initial_sleep(Duration::from_millis(200))
//!         .with_min_sleep(Duration::from_millis(20))
//!         .with_max_sleep(Duration::from_secs(1))
//!         .with_increase_modifier(1.5)
//!         .with_decrease_modifier(0.8),
//! );
//!
//! throttler.increase();
//! assert_eq!(throttler.increase(), Duration::from_millis(450));
//! assert_eq!(throttler.decrease(), Duration::from_millis(360));
//! assert_eq!(throttler.reset(), Duration::from_millis(20));
//! ```

use crate::config::ThrottleConfig;
use crate::error::ConfigError;
use std::time::Duration;

/// How a throttled action turned out, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Speed up: the duration decreases.
    Success,
    /// Slow down: the duration increases.
    Failure,
}

/// Adaptive sleep-duration controller.
///
/// This is a plain value with no interior mutability. Give each worker its
/// own instance; sharing one across threads requires external locking.
#[derive(Debug, Clone, PartialEq)]
pub struct Throttler {
    current_sleep: Duration,
    min_sleep: Duration,
    max_sleep: Duration,
    increase_modifier: f64,
    decrease_modifier: f64,
}

impl Throttler {
    /// Create a throttler, substituting defaults for unset fields.
    ///
    /// This never fails and performs no validation: a minimum above the
    /// maximum is accepted as given. Use [`Throttler::try_new`] to reject such
    /// configurations.
    pub fn new(config: ThrottleConfig) -> Self {
        let resolved = config.resolve();
        Self {
            current_sleep: resolved.initial_sleep,
            min_sleep: resolved.min_sleep,
            max_sleep: resolved.max_sleep,
            increase_modifier: resolved.increase_modifier,
            decrease_modifier: resolved.decrease_modifier,
        }
    }

    /// Create a throttler, rejecting resolved configurations whose bounds or
    /// modifiers contradict each other.
    pub fn try_new(config: ThrottleConfig) -> Result<Self, ConfigError> {
        config.resolve().validate()?;
        Ok(Self::new(config))
    }

    /// Multiply the duration by the increase modifier, capped at the maximum.
    pub fn increase(&mut self) -> Duration {
        #[cfg(feature = "tracing")]
        let previous = self.current_sleep;
        self.current_sleep = scale(self.current_sleep, self.increase_modifier).min(self.max_sleep);

        #[cfg(feature = "tracing")]
        tracing::trace!(from = ?previous, to = ?self.current_sleep, "throttle increased");

        self.current_sleep
    }

    /// Multiply the duration by the decrease modifier, floored at the minimum.
    pub fn decrease(&mut self) -> Duration {
        #[cfg(feature = "tracing")]
        let previous = self.current_sleep;
        self.current_sleep = scale(self.current_sleep, self.decrease_modifier).max(self.min_sleep);

        #[cfg(feature = "tracing")]
        tracing::trace!(from = ?previous, to = ?self.current_sleep, "throttle decreased");

        self.current_sleep
    }

    /// Drop straight to the minimum.
    pub fn reset(&mut self) -> Duration {
        self.current_sleep = self.min_sleep;

        #[cfg(feature = "tracing")]
        tracing::trace!(to = ?self.current_sleep, "throttle reset");

        self.current_sleep
    }

    /// Feed back an outcome: failures increase, successes decrease.
    pub fn apply(&mut self, outcome: Outcome) -> Duration {
        match outcome {
            Outcome::Success => self.decrease(),
            Outcome::Failure => self.increase(),
        }
    }

    /// The current duration.
    pub fn duration(&self) -> Duration {
        self.current_sleep
    }

    /// Sleep for the current duration, then return it.
    ///
    /// Dropping the returned future abandons the wait.
    pub async fn wait(&self) -> Duration {
        let duration = self.current_sleep;
        tokio::time::sleep(duration).await;
        duration
    }

    pub fn min_sleep(&self) -> Duration {
        self.min_sleep
    }

    pub fn max_sleep(&self) -> Duration {
        self.max_sleep
    }

    pub fn increase_modifier(&self) -> f64 {
        self.increase_modifier
    }

    pub fn decrease_modifier(&self) -> f64 {
        self.decrease_modifier
    }
}

impl Default for Throttler {
    fn default() -> Self {
        Self::new(ThrottleConfig::default())
    }
}

/// Multiply in floating point over whole nanoseconds, truncating the result.
///
/// Products beyond `u64::MAX` nanoseconds (about 584 years) are computed in
/// seconds instead and saturate at `Duration::MAX`.
fn scale(duration: Duration, modifier: f64) -> Duration {
    let nanos = duration.as_nanos() as f64 * modifier;
    if nanos < u64::MAX as f64 {
        Duration::from_nanos(nanos as u64)
    } else {
        Duration::try_from_secs_f64(duration.as_secs_f64() * modifier).unwrap_or(Duration::MAX)
    }
}
