//! Adaptive throttle controller.
//!
//! This crate holds the piece every throttled client needs and nothing else:
//! - [`Throttler`]: a bounded sleep duration that grows multiplicatively on
//!   failure and shrinks multiplicatively on success
//! - [`ThrottleConfig`]: optional settings with default substitution
//! - [`events`]: listener plumbing shared by the wrappers built on top
//!
//! The controller never touches the network and never waits on its own
//! initiative. The caller decides what counts as success or failure and when
//! to sleep.

pub mod config;
pub mod error;
pub mod events;
pub mod throttle;

pub use config::{
    ResolvedThrottleConfig, ThrottleConfig, DEFAULT_DECREASE_MODIFIER, DEFAULT_INCREASE_MODIFIER,
    DEFAULT_INITIAL_SLEEP, DEFAULT_MAX_SLEEP, DEFAULT_MIN_SLEEP,
};
pub use error::ConfigError;
pub use events::{EventListener, EventListeners, FeedbackEvent};
pub use throttle::{Outcome, Throttler};
