use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Years a leave bound may fall in.
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1900..=9999;

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses a form date bound.
///
/// Accepts a plain date (taken as midnight) or a date-time with minute or
/// second precision, `T` or space separated. Seconds are dropped so timed
/// leave stays at minute resolution.
pub fn parse_bound(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(truncate_to_minute)
}

pub fn in_supported_range(dt: NaiveDateTime) -> bool {
    SUPPORTED_YEARS.contains(&dt.year())
}

fn truncate_to_minute(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_second(0).and_then(|d| d.with_nanosecond(0)).unwrap_or(dt)
}
