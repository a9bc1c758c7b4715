//! Configuration errors.

use std::time::Duration;

/// Reasons [`Throttler::try_new`](crate::Throttler::try_new) refuses a
/// configuration.
///
/// These are checked against the *resolved* configuration, after defaults
/// have replaced unset fields.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The lower bound is above the upper bound.
    #[error("min sleep ({min:?}) is greater than max sleep ({max:?})")]
    InvalidBounds {
        /// Resolved minimum sleep.
        min: Duration,
        /// Resolved maximum sleep.
        max: Duration,
    },
    /// The starting duration lies outside the bounds.
    #[error("initial sleep ({initial:?}) is outside [{min:?}, {max:?}]")]
    InitialOutOfBounds {
        /// Resolved initial sleep.
        initial: Duration,
        /// Resolved minimum sleep.
        min: Duration,
        /// Resolved maximum sleep.
        max: Duration,
    },
    /// The increase modifier would not grow the duration.
    #[error("increase modifier must be a finite value above 1.0, got {0}")]
    InvalidIncreaseModifier(f64),
    /// The decrease modifier would not shrink the duration.
    #[error("decrease modifier must be a finite value below 1.0, got {0}")]
    InvalidDecreaseModifier(f64),
}
