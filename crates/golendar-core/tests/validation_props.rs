//! Property tests for title/message validation and date handling.

use chrono::{Duration as ChronoDuration, Local, Utc};
use golendar_core::validate::{is_valid_title, parse_datetime, parse_future_datetime};
use golendar_core::EventError;
use proptest::prelude::*;

proptest! {
    #[test]
    fn allowed_charset_within_bounds_is_valid(title in "[a-zA-Z0-9а-яА-ЯёЁ ]{3,50}") {
        prop_assert!(is_valid_title(&title));
    }

    #[test]
    fn too_short_is_invalid(title in "[a-zA-Z0-9]{0,2}") {
        prop_assert!(!is_valid_title(&title));
    }

    #[test]
    fn too_long_is_invalid(title in "[a-zA-Zа-я]{51,80}") {
        prop_assert!(!is_valid_title(&title));
    }

    #[test]
    fn punctuation_is_rejected(
        head in "[a-z]{2,10}",
        punct in "[!?.,;:@#$%^&*()_+=-]",
        tail in "[a-z]{0,10}",
    ) {
        let title = format!("{head}{punct}{tail}");
        prop_assert!(!is_valid_title(&title));
    }

    #[test]
    fn local_layouts_round_trip(mins in 1i64..5_000_000) {
        let at = Local::now() + ChronoDuration::minutes(mins);
        let text = at.format("%Y-%m-%d %H:%M").to_string();
        let parsed = parse_datetime(&text).unwrap().with_timezone(&Local);
        prop_assert_eq!(parsed.format("%Y-%m-%d %H:%M").to_string(), text);
    }

    #[test]
    fn past_instants_never_pass_future_check(secs in 0i64..10_000_000) {
        let now = Utc::now();
        let at = (now - ChronoDuration::seconds(secs)).to_rfc3339();
        prop_assert!(matches!(
            parse_future_datetime(&at, now),
            Err(EventError::DateAlreadyPassed(_))
        ));
    }
}
