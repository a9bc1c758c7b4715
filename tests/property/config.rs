//! Property tests for configuration resolution.
//!
//! Invariants tested:
//! - Every resolved field is usable (non-zero durations, positive modifiers)
//! - Set fields are kept, unset fields take the defaults

use proptest::prelude::*;
use std::time::Duration;
use throttle_core::{
    DEFAULT_DECREASE_MODIFIER, DEFAULT_INCREASE_MODIFIER, DEFAULT_INITIAL_SLEEP,
    DEFAULT_MAX_SLEEP, DEFAULT_MIN_SLEEP, ThrottleConfig,
};

fn any_duration() -> impl Strategy<Value = Duration> {
    prop_oneof![
        Just(Duration::ZERO),
        (1u64..=60_000_000_000).prop_map(Duration::from_nanos),
    ]
}

fn any_modifier() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(0.0),
        Just(f64::NAN),
        -10.0f64..10.0,
    ]
}

prop_compose! {
    fn any_config()(
        initial in any_duration(),
        min in any_duration(),
        max in any_duration(),
        increase in any_modifier(),
        decrease in any_modifier(),
    ) -> ThrottleConfig {
        ThrottleConfig {
            initial_sleep: initial,
            min_sleep: min,
            max_sleep: max,
            increase_modifier: increase,
            decrease_modifier: decrease,
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: resolution never leaves a field unset
    #[test]
    fn resolved_fields_are_populated(config in any_config()) {
        let resolved = config.resolve();
        prop_assert!(!resolved.initial_sleep.is_zero());
        prop_assert!(!resolved.min_sleep.is_zero());
        prop_assert!(!resolved.max_sleep.is_zero());
        prop_assert!(resolved.increase_modifier > 0.0);
        prop_assert!(resolved.decrease_modifier > 0.0);
    }

    /// Property: a positive setting is kept as given, anything else is replaced
    #[test]
    fn set_fields_win_over_defaults(config in any_config()) {
        let resolved = config.resolve();

        let expect_duration = |value: Duration, default: Duration| {
            if value.is_zero() { default } else { value }
        };
        let expect_modifier = |value: f64, default: f64| {
            if value > 0.0 { value } else { default }
        };

        prop_assert_eq!(resolved.initial_sleep, expect_duration(config.initial_sleep, DEFAULT_INITIAL_SLEEP));
        prop_assert_eq!(resolved.min_sleep, expect_duration(config.min_sleep, DEFAULT_MIN_SLEEP));
        prop_assert_eq!(resolved.max_sleep, expect_duration(config.max_sleep, DEFAULT_MAX_SLEEP));
        prop_assert_eq!(resolved.increase_modifier, expect_modifier(config.increase_modifier, DEFAULT_INCREASE_MODIFIER));
        prop_assert_eq!(resolved.decrease_modifier, expect_modifier(config.decrease_modifier, DEFAULT_DECREASE_MODIFIER));
    }

    /// Property: validation accepts exactly the well-ordered, well-directed configurations
    #[test]
    fn validation_matches_its_rules(config in any_config()) {
        let resolved = config.resolve();
        let well_formed = resolved.min_sleep <= resolved.max_sleep
            && resolved.min_sleep <= resolved.initial_sleep
            && resolved.initial_sleep <= resolved.max_sleep
            && resolved.increase_modifier > 1.0
            && resolved.decrease_modifier < 1.0;
        prop_assert_eq!(resolved.validate().is_ok(), well_formed);
    }
}
