//! Adaptive throttling middleware for Tower services.
//!
//! Wraps a service so that every call first sleeps for the current throttle
//! duration, then reports the call's result back to the throttle. Failures
//! lengthen the sleep, successes shorten it, always within the configured
//! bounds.
//!
//! # Features
//!
//! - **Per-instance throttles**: each `layer()` call owns its own
//!   [`Throttler`](throttle_core::Throttler)
//! - **Pluggable classification**: decide which results count as overload
//! - **Handles**: read or reset a service's throttle from elsewhere
//! - **Event system**: observe waits and adjustments
//!
//! # Examples
//!
//! ```
//! use throttle_core::Outcome;
//! use throttle_tower::ThrottleLayer;
//! use tower::{Service, ServiceBuilder, ServiceExt};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Treat anything but 200 as a request to slow down.
//! let throttle = ThrottleLayer::<u16, std::io::Error>::builder()
//!     .name("upstream")
//!     .initial_sleep(Duration::from_millis(100))
//!     .max_sleep(Duration::from_secs(10))
//!     .classify(|result| match result {
//!         Ok(200) => Some(Outcome::Success),
//!         Ok(_) => Some(Outcome::Failure),
//!         Err(_) => None,
//!     })
//!     .on_increase(|from, to| println!("slowing down: {:?} -> {:?}", from, to))
//!     .build();
//!
//! let mut service = ServiceBuilder::new()
//!     .layer(throttle)
//!     .service(tower::service_fn(|_req: ()| async { Ok::<_, std::io::Error>(200u16) }));
//!
//! let status = service.ready().await?.call(()).await?;
//! assert_eq!(status, 200);
//! # Ok(())
//! # }
//! ```

mod config;
mod events;
mod layer;
mod service;

pub use config::{Classifier, ThrottleLayerBuilder, ThrottleLayerConfig};
pub use events::ThrottleEvent;
pub use layer::ThrottleLayer;
pub use service::{ThrottleHandle, ThrottleService};

pub use throttle_core::{Outcome, ThrottleConfig, Throttler};
