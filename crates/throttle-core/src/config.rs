//! Throttle configuration and default substitution.

use crate::error::ConfigError;
use std::time::Duration;

/// Starting sleep when none is configured.
pub const DEFAULT_INITIAL_SLEEP: Duration = Duration::from_millis(100);
/// Lower bound when none is configured.
pub const DEFAULT_MIN_SLEEP: Duration = Duration::from_millis(10);
/// Upper bound when none is configured.
pub const DEFAULT_MAX_SLEEP: Duration = Duration::from_secs(10);
/// Growth factor applied on failure when none is configured.
pub const DEFAULT_INCREASE_MODIFIER: f64 = 1.2;
/// Shrink factor applied on success when none is configured.
pub const DEFAULT_DECREASE_MODIFIER: f64 = 0.8;

/// Configuration for a [`Throttler`](crate::Throttler).
///
/// Every field is optional. A zero duration, or a modifier that is not
/// strictly positive, means "unset" and is replaced by the matching
/// `DEFAULT_*` constant when the configuration is resolved. The `Default`
/// value therefore leaves everything unset.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use throttle_core::ThrottleConfig;
///
/// let config = ThrottleConfig::new()
///     .with_initial_sleep(Duration::from_millis(500))
///     .with_decrease_modifier(0.5);
///
/// let resolved = config.resolve();
/// assert_eq!(resolved.initial_sleep, Duration::from_millis(500));
/// assert_eq!(resolved.max_sleep, Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ThrottleConfig {
    /// Duration the throttle starts at.
    pub initial_sleep: Duration,
    /// Floor for the duration.
    pub min_sleep: Duration,
    /// Ceiling for the duration.
    pub max_sleep: Duration,
    /// Factor the duration is multiplied by on failure. Expected above 1.0.
    pub increase_modifier: f64,
    /// Factor the duration is multiplied by on success. Expected below 1.0.
    pub decrease_modifier: f64,
}

impl ThrottleConfig {
    /// Create a config with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the starting duration.
    pub fn with_initial_sleep(mut self, sleep: Duration) -> Self {
        self.initial_sleep = sleep;
        self
    }

    /// Set the floor.
    pub fn with_min_sleep(mut self, sleep: Duration) -> Self {
        self.min_sleep = sleep;
        self
    }

    /// Set the ceiling.
    pub fn with_max_sleep(mut self, sleep: Duration) -> Self {
        self.max_sleep = sleep;
        self
    }

    /// Set the factor applied by `increase`.
    pub fn with_increase_modifier(mut self, modifier: f64) -> Self {
        self.increase_modifier = modifier;
        self
    }

    /// Set the factor applied by `decrease`.
    ///
    /// The duration is multiplied by this value, so 0.5 halves it.
    pub fn with_decrease_modifier(mut self, modifier: f64) -> Self {
        self.decrease_modifier = modifier;
        self
    }

    /// Substitute defaults for unset fields.
    ///
    /// Never fails. Bound ordering is not checked here; see
    /// [`ResolvedThrottleConfig::validate`].
    pub fn resolve(&self) -> ResolvedThrottleConfig {
        ResolvedThrottleConfig {
            initial_sleep: duration_or(self.initial_sleep, DEFAULT_INITIAL_SLEEP),
            min_sleep: duration_or(self.min_sleep, DEFAULT_MIN_SLEEP),
            max_sleep: duration_or(self.max_sleep, DEFAULT_MAX_SLEEP),
            increase_modifier: modifier_or(self.increase_modifier, DEFAULT_INCREASE_MODIFIER),
            decrease_modifier: modifier_or(self.decrease_modifier, DEFAULT_DECREASE_MODIFIER),
        }
    }
}

/// A configuration with every field populated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedThrottleConfig {
    pub initial_sleep: Duration,
    pub min_sleep: Duration,
    pub max_sleep: Duration,
    pub increase_modifier: f64,
    pub decrease_modifier: f64,
}

impl ResolvedThrottleConfig {
    /// Check that the bounds are ordered, the initial sleep lies within them,
    /// and both modifiers move the duration in their intended direction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_sleep > self.max_sleep {
            return Err(ConfigError::InvalidBounds {
                min: self.min_sleep,
                max: self.max_sleep,
            });
        }
        if self.initial_sleep < self.min_sleep || self.initial_sleep > self.max_sleep {
            return Err(ConfigError::InitialOutOfBounds {
                initial: self.initial_sleep,
                min: self.min_sleep,
                max: self.max_sleep,
            });
        }
        if !self.increase_modifier.is_finite() || self.increase_modifier <= 1.0 {
            return Err(ConfigError::InvalidIncreaseModifier(self.increase_modifier));
        }
        if !self.decrease_modifier.is_finite() || self.decrease_modifier >= 1.0 {
            return Err(ConfigError::InvalidDecreaseModifier(self.decrease_modifier));
        }
        Ok(())
    }
}

fn duration_or(value: Duration, default: Duration) -> Duration {
    if value.is_zero() {
        default
    } else {
        value
    }
}

// NaN fails the comparison and falls back too.
fn modifier_or(value: f64, default: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        default
    }
}
