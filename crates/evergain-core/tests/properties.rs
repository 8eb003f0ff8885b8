//! Property tests for the arithmetic and timer rules.

use evergain_core::history::{suggest_next_session, SESSION_ROTATION};
use evergain_core::models::set_volume;
use evergain_core::timer::{format_elapsed, format_rest, parse_rest_input, RestTimer, RestTrigger, DEFAULT_REST_SECS};
use proptest::prelude::*;

proptest! {
    #[test]
    fn volume_is_weight_times_reps(weight in 0.0f64..1000.0, reps in 0u32..100) {
        let volume = set_volume(weight, reps);
        prop_assert!((volume - weight * f64::from(reps)).abs() < 1e-9);
        prop_assert!(volume >= 0.0);
    }

    #[test]
    fn countdown_ends_idle_and_refilled(duration in 1u32..400) {
        let mut timer = RestTimer::new(duration);
        timer.start(RestTrigger::Auto);
        let mut completions = 0;
        for _ in 0..duration {
            if timer.tick().is_some() {
                completions += 1;
            }
        }
        prop_assert_eq!(completions, 1);
        prop_assert!(!timer.is_running());
        prop_assert_eq!(timer.remaining_secs(), duration);
    }

    #[test]
    fn stop_after_any_progress_resets(duration in 2u32..400, ticks in 0u32..400) {
        let mut timer = RestTimer::new(duration);
        timer.start(RestTrigger::Manual);
        for _ in 0..ticks.min(duration - 1) {
            timer.tick();
        }
        timer.stop();
        prop_assert!(!timer.is_running());
        prop_assert_eq!(timer.remaining_secs(), duration);
    }

    #[test]
    fn rest_input_is_always_positive(input in ".*") {
        prop_assert!(parse_rest_input(&input) > 0);
    }

    #[test]
    fn non_numeric_rest_input_falls_back(input in "[a-zA-Z ]*") {
        prop_assert_eq!(parse_rest_input(&input), DEFAULT_REST_SECS);
    }

    #[test]
    fn rest_display_roundtrips_to_seconds(secs in 0u32..6000) {
        let shown = format_rest(secs);
        let (m, s) = shown.split_once(':').unwrap();
        prop_assert_eq!(m.parse::<u32>().unwrap() * 60 + s.parse::<u32>().unwrap(), secs);
    }

    #[test]
    fn elapsed_format_switches_at_one_hour(secs in 0u64..36_000) {
        let colons = format_elapsed(secs).matches(':').count();
        prop_assert_eq!(colons, if secs >= 3600 { 2 } else { 1 });
    }

    #[test]
    fn suggestion_stays_in_rotation(last in proptest::option::of(".*")) {
        prop_assert!(SESSION_ROTATION.contains(&suggest_next_session(last.as_deref())));
    }
}
