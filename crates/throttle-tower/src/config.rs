use crate::events::ThrottleEvent;
use std::sync::Arc;
use std::time::Duration;
use throttle_core::events::EventListeners;
use throttle_core::{Outcome, ThrottleConfig};

/// Maps a call's result to the feedback given to the throttle.
///
/// Returning `None` leaves the throttle untouched.
pub type Classifier<Res, E> = Arc<dyn Fn(&Result<Res, E>) -> Option<Outcome> + Send + Sync>;

/// Configuration for the throttle middleware.
pub struct ThrottleLayerConfig<Res, E> {
    pub(crate) throttle: ThrottleConfig,
    pub(crate) classifier: Option<Classifier<Res, E>>,
    pub(crate) event_listeners: EventListeners<ThrottleEvent>,
    pub(crate) name: String,
}

impl<Res, E> ThrottleLayerConfig<Res, E> {
    /// Creates a new builder.
    pub fn builder() -> ThrottleLayerBuilder<Res, E> {
        ThrottleLayerBuilder::new()
    }

    /// The controller settings each service instance starts from.
    pub fn throttle(&self) -> &ThrottleConfig {
        &self.throttle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the configured classifier, or the default one when none was set.
    pub fn classify(&self, result: &Result<Res, E>) -> Option<Outcome> {
        match &self.classifier {
            Some(classifier) => classifier(result),
            None => default_classifier(result),
        }
    }
}

/// Builder for [`ThrottleLayerConfig`].
pub struct ThrottleLayerBuilder<Res, E> {
    throttle: ThrottleConfig,
    classifier: Option<Classifier<Res, E>>,
    event_listeners: EventListeners<ThrottleEvent>,
    name: String,
}

impl<Res, E> Default for ThrottleLayerBuilder<Res, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Res, E> ThrottleLayerBuilder<Res, E> {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - throttle: every field unset, so the controller defaults apply
    ///   (100ms initial, 10ms min, 10s max, x1.2 increase, x0.8 decrease)
    /// - classifier: `Ok` is a success, `Err` is a failure
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            throttle: ThrottleConfig::default(),
            classifier: None,
            event_listeners: EventListeners::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Replaces all controller settings at once.
    pub fn throttle_config(mut self, config: ThrottleConfig) -> Self {
        self.throttle = config;
        self
    }

    /// Sets the duration each service instance starts at.
    pub fn initial_sleep(mut self, sleep: Duration) -> Self {
        self.throttle.initial_sleep = sleep;
        self
    }

    /// Sets the floor.
    pub fn min_sleep(mut self, sleep: Duration) -> Self {
        self.throttle.min_sleep = sleep;
        self
    }

    /// Sets the ceiling.
    pub fn max_sleep(mut self, sleep: Duration) -> Self {
        self.throttle.max_sleep = sleep;
        self
    }

    /// Sets the factor applied after a failure.
    pub fn increase_modifier(mut self, modifier: f64) -> Self {
        self.throttle.increase_modifier = modifier;
        self
    }

    /// Sets the factor applied after a success.
    pub fn decrease_modifier(mut self, modifier: f64) -> Self {
        self.throttle.decrease_modifier = modifier;
        self
    }

    /// Sets the name for this throttle (used in events and metrics).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Sets how call results are turned into throttle feedback.
    ///
    /// The classifier sees the inner service's result before it is returned
    /// to the caller. A status-code check on an `Ok` response is the usual
    /// reason to override the default.
    ///
    /// # Example
    ///
    /// ```rust
    /// use throttle_core::Outcome;
    /// use throttle_tower::ThrottleLayer;
    ///
    /// // Responses are HTTP status codes; transport errors are ignored.
    /// let layer = ThrottleLayer::<u16, std::io::Error>::builder()
    ///     .classify(|result| match result {
    ///         Ok(200) => Some(Outcome::Success),
    ///         Ok(_) => Some(Outcome::Failure),
    ///         Err(_) => None,
    ///     })
    ///     .build();
    /// ```
    pub fn classify<F>(mut self, f: F) -> Self
    where
        F: Fn(&Result<Res, E>) -> Option<Outcome> + Send + Sync + 'static,
    {
        self.classifier = Some(Arc::new(f));
        self
    }

    /// Registers a callback invoked before each call sleeps.
    ///
    /// # Callback Signature
    /// `Fn(Duration)` - the duration about to be slept.
    pub fn on_wait<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event: &ThrottleEvent| {
            if let ThrottleEvent::Waited { duration, .. } = event {
                f(*duration);
            }
        });
        self
    }

    /// Registers a callback invoked when a failure grows the duration.
    ///
    /// # Callback Signature
    /// `Fn(Duration, Duration)` - the duration before and after.
    pub fn on_increase<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event: &ThrottleEvent| {
            if let ThrottleEvent::Increased { from, to, .. } = event {
                f(*from, *to);
            }
        });
        self
    }

    /// Registers a callback invoked when a success shrinks the duration.
    ///
    /// # Callback Signature
    /// `Fn(Duration, Duration)` - the duration before and after.
    pub fn on_decrease<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event: &ThrottleEvent| {
            if let ThrottleEvent::Decreased { from, to, .. } = event {
                f(*from, *to);
            }
        });
        self
    }

    /// Registers a callback invoked when a handle resets the throttle.
    ///
    /// # Callback Signature
    /// `Fn(Duration)` - the minimum the throttle was reset to.
    pub fn on_reset<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event: &ThrottleEvent| {
            if let ThrottleEvent::Reset { to, .. } = event {
                f(*to);
            }
        });
        self
    }

    /// Builds the configuration without wrapping it in a layer.
    pub fn build_config(self) -> ThrottleLayerConfig<Res, E> {
        ThrottleLayerConfig {
            throttle: self.throttle,
            classifier: self.classifier,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }

    /// Builds the throttle layer.
    pub fn build(self) -> crate::ThrottleLayer<Res, E> {
        crate::ThrottleLayer::new(self.build_config())
    }
}

fn default_classifier<Res, E>(result: &Result<Res, E>) -> Option<Outcome> {
    match result {
        Ok(_) => Some(Outcome::Success),
        Err(_) => Some(Outcome::Failure),
    }
}
