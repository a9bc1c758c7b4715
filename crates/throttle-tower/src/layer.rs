//! Tower layer implementation for the throttle.

use crate::config::{ThrottleLayerBuilder, ThrottleLayerConfig};
use crate::service::ThrottleService;
use std::sync::Arc;
use tower::Layer;

#[cfg(feature = "metrics")]
use metrics::{describe_counter, describe_gauge, describe_histogram};
#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// A Tower [`Layer`] that paces calls with an adaptive throttle.
///
/// Every call to [`Layer::layer`] creates a service with its own fresh
/// [`Throttler`](throttle_core::Throttler), so two workers that each wrap
/// their client never influence each other's delay.
///
/// # Examples
///
/// ```
/// use throttle_tower::ThrottleLayer;
/// use tower::ServiceBuilder;
/// use std::time::Duration;
///
/// # async fn example() {
/// let throttle = ThrottleLayer::<String, std::io::Error>::builder()
///     .name("upstream")
///     .initial_sleep(Duration::from_millis(50))
///     .max_sleep(Duration::from_secs(2))
///     .build();
///
/// let service = ServiceBuilder::new()
///     .layer(throttle)
///     .service(my_service());
/// # }
/// # fn my_service() -> impl tower::Service<String, Response = String, Error = std::io::Error> {
/// #     tower::service_fn(|req: String| async move { Ok::<_, std::io::Error>(req) })
/// # }
/// ```
pub struct ThrottleLayer<Res, E> {
    config: Arc<ThrottleLayerConfig<Res, E>>,
}

impl<Res, E> ThrottleLayer<Res, E> {
    /// Creates a new `ThrottleLayer` with the given configuration.
    pub fn new(config: ThrottleLayerConfig<Res, E>) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Creates a new builder for configuring a throttle layer.
    pub fn builder() -> ThrottleLayerBuilder<Res, E> {
        #[cfg(feature = "metrics")]
        {
            METRICS_INIT.call_once(|| {
                describe_counter!(
                    "throttle_adjustments_total",
                    "Total number of throttle adjustments, labelled by direction"
                );
                describe_gauge!(
                    "throttle_sleep_seconds",
                    "Current throttle sleep duration"
                );
                describe_histogram!(
                    "throttle_wait_duration_seconds",
                    "Time calls spent sleeping before reaching the inner service"
                );
            });
        }
        ThrottleLayerBuilder::new()
    }

    pub fn config(&self) -> &ThrottleLayerConfig<Res, E> {
        &self.config
    }
}

impl<Res, E> Clone for ThrottleLayer<Res, E> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, Res, E> Layer<S> for ThrottleLayer<Res, E> {
    type Service = ThrottleService<S, Res, E>;

    fn layer(&self, service: S) -> Self::Service {
        ThrottleService::new(service, Arc::clone(&self.config))
    }
}
