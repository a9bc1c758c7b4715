//! Property tests for the controller's adjustments.
//!
//! Invariants tested:
//! - `increase` never exceeds the maximum
//! - `decrease` and `reset` never go below the minimum
//! - Adjustments at the ceiling and floor are idempotent
//! - The duration moves in the direction of the feedback

use proptest::prelude::*;
use std::time::Duration;
use throttle_core::{Outcome, ThrottleConfig, Throttler};

prop_compose! {
    /// Configurations that pass validation.
    fn valid_config()(
        min_ms in 1u64..=1_000,
        span_ms in 0u64..=10_000,
        percent in 0u32..=100,
        increase in 1.01f64..4.0,
        decrease in 0.05f64..0.99,
    ) -> ThrottleConfig {
        let min = Duration::from_millis(min_ms);
        let max = Duration::from_millis(min_ms + span_ms);
        let initial = min + (max - min) * percent / 100;
        ThrottleConfig::new()
            .with_initial_sleep(initial)
            .with_min_sleep(min)
            .with_max_sleep(max)
            .with_increase_modifier(increase)
            .with_decrease_modifier(decrease)
    }
}

fn outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![Just(Outcome::Success), Just(Outcome::Failure)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: any feedback sequence keeps the duration within bounds
    #[test]
    fn duration_stays_within_bounds(
        config in valid_config(),
        outcomes in prop::collection::vec(outcome(), 0..200),
    ) {
        let mut throttler = Throttler::try_new(config).unwrap();
        for outcome in outcomes {
            let duration = throttler.apply(outcome);
            prop_assert!(duration >= throttler.min_sleep());
            prop_assert!(duration <= throttler.max_sleep());
            prop_assert_eq!(duration, throttler.duration());
        }
    }

    /// Property: failures never shrink the duration, successes never grow it
    #[test]
    fn adjustments_move_in_feedback_direction(
        config in valid_config(),
        outcomes in prop::collection::vec(outcome(), 1..100),
    ) {
        let mut throttler = Throttler::try_new(config).unwrap();
        for outcome in outcomes {
            let before = throttler.duration();
            let after = throttler.apply(outcome);
            match outcome {
                Outcome::Failure => prop_assert!(after >= before),
                Outcome::Success => prop_assert!(after <= before),
            }
        }
    }

    /// Property: enough failures reach the ceiling, and further failures stay there
    #[test]
    fn ceiling_is_absorbing(config in valid_config()) {
        let mut throttler = Throttler::try_new(config).unwrap();
        // 1.01^2000 is far beyond 10_001x, the widest span generated.
        for _ in 0..2_000 {
            throttler.increase();
        }
        prop_assert_eq!(throttler.duration(), throttler.max_sleep());
        prop_assert_eq!(throttler.increase(), throttler.max_sleep());
    }

    /// Property: enough successes reach the floor, and further successes stay there
    #[test]
    fn floor_is_absorbing(config in valid_config()) {
        let mut throttler = Throttler::try_new(config).unwrap();
        for _ in 0..2_000 {
            throttler.decrease();
        }
        prop_assert_eq!(throttler.duration(), throttler.min_sleep());
        prop_assert_eq!(throttler.decrease(), throttler.min_sleep());
    }

    /// Property: reset lands on the minimum from any state
    #[test]
    fn reset_always_yields_min(
        config in valid_config(),
        outcomes in prop::collection::vec(outcome(), 0..50),
    ) {
        let mut throttler = Throttler::try_new(config).unwrap();
        for outcome in outcomes {
            throttler.apply(outcome);
        }
        prop_assert_eq!(throttler.reset(), throttler.min_sleep());
        prop_assert_eq!(throttler.duration(), throttler.min_sleep());
    }
}
