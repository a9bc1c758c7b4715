use std::time::{Duration, Instant};
use throttle_core::events::FeedbackEvent;

/// Events emitted by the throttle middleware.
#[derive(Debug, Clone)]
pub enum ThrottleEvent {
    /// A call is about to sleep for the current duration.
    Waited {
        throttle_name: String,
        timestamp: Instant,
        duration: Duration,
    },
    /// A failure grew the duration.
    Increased {
        throttle_name: String,
        timestamp: Instant,
        from: Duration,
        to: Duration,
    },
    /// A success shrank the duration.
    Decreased {
        throttle_name: String,
        timestamp: Instant,
        from: Duration,
        to: Duration,
    },
    /// The duration was dropped to the minimum through a handle.
    Reset {
        throttle_name: String,
        timestamp: Instant,
        to: Duration,
    },
}

impl FeedbackEvent for ThrottleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ThrottleEvent::Waited { .. } => "Waited",
            ThrottleEvent::Increased { .. } => "Increased",
            ThrottleEvent::Decreased { .. } => "Decreased",
            ThrottleEvent::Reset { .. } => "Reset",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            ThrottleEvent::Waited { timestamp, .. } => *timestamp,
            ThrottleEvent::Increased { timestamp, .. } => *timestamp,
            ThrottleEvent::Decreased { timestamp, .. } => *timestamp,
            ThrottleEvent::Reset { timestamp, .. } => *timestamp,
        }
    }

    fn throttle_name(&self) -> &str {
        match self {
            ThrottleEvent::Waited { throttle_name, .. } => throttle_name,
            ThrottleEvent::Increased { throttle_name, .. } => throttle_name,
            ThrottleEvent::Decreased { throttle_name, .. } => throttle_name,
            ThrottleEvent::Reset { throttle_name, .. } => throttle_name,
        }
    }
}
