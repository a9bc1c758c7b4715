//! Throttle service implementation.

use crate::config::ThrottleLayerConfig;
use crate::events::ThrottleEvent;
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use throttle_core::{Outcome, Throttler};
use tower::Service;

#[cfg(feature = "metrics")]
use metrics::{counter, gauge, histogram};

/// Service that sleeps for the current throttle duration before each call and
/// adjusts the duration from the call's result.
///
/// Clones share one throttle. Separate [`Layer::layer`](tower::Layer::layer)
/// calls do not.
pub struct ThrottleService<S, Res, E> {
    inner: S,
    config: Arc<ThrottleLayerConfig<Res, E>>,
    throttler: Arc<Mutex<Throttler>>,
}

impl<S, Res, E> ThrottleService<S, Res, E> {
    pub(crate) fn new(inner: S, config: Arc<ThrottleLayerConfig<Res, E>>) -> Self {
        let throttler = Throttler::new(config.throttle);
        Self {
            inner,
            config,
            throttler: Arc::new(Mutex::new(throttler)),
        }
    }

    /// Returns a handle for reading or resetting this service's throttle.
    pub fn handle(&self) -> ThrottleHandle {
        ThrottleHandle {
            throttler: Arc::clone(&self.throttler),
            name: self.config.name.clone(),
            event_listeners: self.config.event_listeners.clone(),
        }
    }

    /// The current sleep duration.
    pub fn duration(&self) -> Duration {
        lock(&self.throttler).duration()
    }
}

impl<S, Res, E> Clone for ThrottleService<S, Res, E>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            config: Arc::clone(&self.config),
            throttler: Arc::clone(&self.throttler),
        }
    }
}

impl<S, Req, Res, E> Service<Req> for ThrottleService<S, Res, E>
where
    S: Service<Req, Response = Res, Error = E> + Clone + Send + 'static,
    S::Future: Send + 'static,
    Req: Send + 'static,
    Res: Send + 'static,
    E: Send + 'static,
{
    type Response = Res;
    type Error = E;
    type Future = BoxFuture<'static, Result<Res, E>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Req) -> Self::Future {
        let config = Arc::clone(&self.config);
        let throttler = Arc::clone(&self.throttler);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let duration = lock(&throttler).duration();

            config.event_listeners.emit(&ThrottleEvent::Waited {
                throttle_name: config.name.clone(),
                timestamp: Instant::now(),
                duration,
            });

            #[cfg(feature = "metrics")]
            histogram!("throttle_wait_duration_seconds", "throttle" => config.name.clone())
                .record(duration.as_secs_f64());

            tokio::time::sleep(duration).await;

            let result = inner.call(request).await;

            if let Some(outcome) = config.classify(&result) {
                let (from, to) = {
                    let mut throttler = lock(&throttler);
                    let from = throttler.duration();
                    (from, throttler.apply(outcome))
                };
                record_adjustment(&config, outcome, from, to);
            }

            result
        })
    }
}

fn record_adjustment<Res, E>(
    config: &ThrottleLayerConfig<Res, E>,
    outcome: Outcome,
    from: Duration,
    to: Duration,
) {
    let timestamp = Instant::now();
    let throttle_name = config.name.clone();

    let event = match outcome {
        Outcome::Failure => ThrottleEvent::Increased {
            throttle_name,
            timestamp,
            from,
            to,
        },
        Outcome::Success => ThrottleEvent::Decreased {
            throttle_name,
            timestamp,
            from,
            to,
        },
    };
    config.event_listeners.emit(&event);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        throttle = %config.name,
        outcome = ?outcome,
        from = ?from,
        to = ?to,
        "throttle adjusted"
    );

    #[cfg(feature = "metrics")]
    {
        let direction = match outcome {
            Outcome::Failure => "increase",
            Outcome::Success => "decrease",
        };
        counter!("throttle_adjustments_total", "throttle" => config.name.clone(), "direction" => direction)
            .increment(1);
        gauge!("throttle_sleep_seconds", "throttle" => config.name.clone()).set(to.as_secs_f64());
    }
}

/// Read and reset access to a service's throttle from outside the call path.
#[derive(Clone)]
pub struct ThrottleHandle {
    throttler: Arc<Mutex<Throttler>>,
    name: String,
    event_listeners: throttle_core::EventListeners<ThrottleEvent>,
}

impl ThrottleHandle {
    /// The current sleep duration.
    pub fn duration(&self) -> Duration {
        lock(&self.throttler).duration()
    }

    /// Drop the throttle to its minimum, e.g. after the remote side was
    /// reconfigured.
    pub fn reset(&self) -> Duration {
        let to = lock(&self.throttler).reset();

        self.event_listeners.emit(&ThrottleEvent::Reset {
            throttle_name: self.name.clone(),
            timestamp: Instant::now(),
            to,
        });

        #[cfg(feature = "tracing")]
        tracing::debug!(throttle = %self.name, to = ?to, "throttle reset");

        #[cfg(feature = "metrics")]
        {
            counter!("throttle_adjustments_total", "throttle" => self.name.clone(), "direction" => "reset")
                .increment(1);
            gauge!("throttle_sleep_seconds", "throttle" => self.name.clone()).set(to.as_secs_f64());
        }

        to
    }
}

impl std::fmt::Debug for ThrottleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThrottleHandle")
            .field("name", &self.name)
            .field("duration", &self.duration())
            .finish()
    }
}

// The guard is never held across an await, and Throttler has no invariant a
// panic could break halfway, so a poisoned lock is still usable.
fn lock(throttler: &Mutex<Throttler>) -> MutexGuard<'_, Throttler> {
    throttler.lock().unwrap_or_else(PoisonError::into_inner)
}
