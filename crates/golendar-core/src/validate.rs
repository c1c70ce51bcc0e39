//! Text and date validation shared by events and reminders.
//!
//! Titles and reminder messages share one pattern: 3 to 50 characters of
//! Latin or Cyrillic letters, digits and spaces. Dates without an explicit
//! offset are read as local wall-clock time and stored as UTC.

use std::sync::LazyLock;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

use crate::error::{EventError, ReminderError};

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z\p{Cyrillic}0-9 ]{3,50}$").expect("valid title regex")
});

/// Layouts tried in order for inputs that carry no offset.
const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DISPLAY_LAYOUT: &str = "%a %Y/%m/%d - %H:%M";

pub fn is_valid_title(title: &str) -> bool {
    TITLE_RE.is_match(title)
}

pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Validate an event title.
pub fn validate_title(title: &str) -> Result<(), EventError> {
    if is_blank(title) {
        return Err(EventError::EmptyTitle);
    }
    if !is_valid_title(title) {
        return Err(EventError::InvalidTitle(title.to_string()));
    }
    Ok(())
}

/// Validate a reminder message. Same rules as titles, different error kind.
pub fn validate_message(message: &str) -> Result<(), ReminderError> {
    if is_blank(message) || !is_valid_title(message) {
        return Err(ReminderError::InvalidMessage(message.to_string()));
    }
    Ok(())
}

/// Parse a user-supplied date.
///
/// Accepts RFC 3339 (offset honoured), the layouts in [`NAIVE_LAYOUTS`]
/// interpreted in the local zone, and a bare `YYYY-MM-DD` meaning local
/// midnight.
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>, EventError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(invalid_date(input, "empty date"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(input, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| invalid_date(input, "unrecognised date format"))?;

    // DST gaps have no local instant; folds resolve to the earlier one.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| invalid_date(input, "time does not exist in the local zone"))
}

/// Parse a date and require it to be strictly after `now`.
pub fn parse_future_datetime(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, EventError> {
    let at = parse_datetime(input)?;
    if at <= now {
        return Err(EventError::DateAlreadyPassed(input.trim().to_string()));
    }
    Ok(at)
}

/// Local-time display form, e.g. `Mon 2026/10/19 - 14:30`.
pub fn format_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(DISPLAY_LAYOUT).to_string()
}

/// Compact duration text such as `1h2m3s`, `45s` or `250ms`.
///
/// Durations of a second or more are rounded to the nearest second.
pub fn format_duration(d: Duration) -> String {
    if d < Duration::from_secs(1) {
        return format!("{}ms", d.as_millis());
    }
    let total = (d.as_millis() + 500) / 1000;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    let mut out = String::new();
    if h > 0 {
        out.push_str(&format!("{h}h"));
    }
    if h > 0 || m > 0 {
        out.push_str(&format!("{m}m"));
    }
    out.push_str(&format!("{s}s"));
    out
}

fn invalid_date(input: &str, reason: &str) -> EventError {
    EventError::InvalidDate {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}
