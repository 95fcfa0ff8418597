//! Lenient parsing of the date-time strings found in DONKI records.
//!
//! DONKI mixes several shapes (`2024-01-01T00:00Z`, `2024-01-01T00:00:00Z`,
//! `2024-01-01T00:00:00.000+02:00`, plain dates). Everything is normalized to UTC and returned
//! without a timezone.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// ISO-8601 without a zone suffix, used whenever a timestamp is rendered as text.
pub const ISO_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
];

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub trait IntoNaiveUtc {
    fn into_naive_utc(self) -> NaiveDateTime;
}

impl IntoNaiveUtc for NaiveDateTime {
    fn into_naive_utc(self) -> NaiveDateTime {
        self
    }
}

impl IntoNaiveUtc for DateTime<Utc> {
    fn into_naive_utc(self) -> NaiveDateTime {
        self.naive_utc()
    }
}

impl IntoNaiveUtc for DateTime<FixedOffset> {
    fn into_naive_utc(self) -> NaiveDateTime {
        self.with_timezone(&Utc).naive_utc()
    }
}

/// Parses a date-time string into a timezone-naive UTC timestamp.
///
/// Strings without a zone are assumed to be UTC already. A bare date maps to midnight.
/// Returns `None` when the value is not a recognizable date-time.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.into_naive_utc());
    }

    if let Some(naive) = value
        .strip_suffix('Z')
        .or_else(|| value.strip_suffix('z'))
    {
        return parse_naive(naive);
    }

    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
        .map(IntoNaiveUtc::into_naive_utc)
        .or_else(|| parse_naive(value))
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(IntoNaiveUtc::into_naive_utc)
}

/// Whether a string contains a `<digit>T<digit>` date/time separator.
///
/// Only columns with at least one such value are considered for timestamp conversion.
pub fn has_datetime_separator(value: &str) -> bool {
    value
        .as_bytes()
        .windows(3)
        .any(|w| w[0].is_ascii_digit() && w[1] == b'T' && w[2].is_ascii_digit())
}
