//! Observer hooks for code that drives a [`Throttler`](crate::Throttler).
//!
//! The controller reports nothing on its own. Wrappers such as the Tower
//! middleware describe each wait and adjustment as a [`FeedbackEvent`] and
//! pass it to the [`EventListeners`] registered with them.
//!
//! Any `Fn(&E) + Send + Sync` closure is a listener:
//!
//! ```
//! use std::time::{Duration, Instant};
//! use throttle_core::events::{EventListeners, FeedbackEvent};
//!
//! #[derive(Debug)]
//! struct Slept(Duration, Instant);
//!
//! impl FeedbackEvent for Slept {
//!     fn event_type(&self) -> &'static str { "Slept" }
//!     fn timestamp(&self) -> Instant { self.1 }
//!     fn throttle_name(&self) -> &str { "example" }
//! }
//!
//! let mut listeners: EventListeners<Slept> = EventListeners::new();
//! listeners.add(|event: &Slept| println!("slept {:?}", event.0));
//! assert_eq!(listeners.emit(&Slept(Duration::from_millis(100), Instant::now())), 0);
//! ```

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// An event produced by something that drives a throttle.
pub trait FeedbackEvent: Send + Sync + fmt::Debug {
    /// Short, stable name of the event kind (e.g. `"Increased"`).
    fn event_type(&self) -> &'static str;

    /// When the event happened.
    fn timestamp(&self) -> Instant;

    /// Name of the throttle instance that produced the event.
    fn throttle_name(&self) -> &str;
}

/// Receives throttle events.
pub trait EventListener<E>: Send + Sync {
    fn on_event(&self, event: &E);
}

impl<E, F> EventListener<E> for F
where
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        self(event)
    }
}

/// Listeners called in registration order for every emitted event.
///
/// Clones share one list until either side registers another listener, at
/// which point that side gets its own copy. Handles and services cloned from
/// a layer therefore never observe listeners added after the split.
pub struct EventListeners<E> {
    listeners: Arc<Vec<Arc<dyn EventListener<E>>>>,
}

impl<E> EventListeners<E> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Vec::new()),
        }
    }

    /// Registers `listener` after those already present.
    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        Arc::make_mut(&mut self.listeners).push(Arc::new(listener));
    }
}

impl<E: FeedbackEvent> EventListeners<E> {
    /// Delivers `event` to every listener and returns how many of them
    /// panicked.
    ///
    /// A panic never reaches the caller and never stops delivery to the
    /// listeners registered after the one that panicked.
    pub fn emit(&self, event: &E) -> usize {
        let mut panicked = 0;
        for listener in self.listeners.iter() {
            if panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(event))).is_err() {
                panicked += 1;
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    throttle = event.throttle_name(),
                    event = event.event_type(),
                    "throttle event listener panicked"
                );
            }
        }
        panicked
    }
}

impl<E> Clone for EventListeners<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<E> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("registered", &self.listeners.len())
            .finish()
    }
}
