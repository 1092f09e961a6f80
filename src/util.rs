use chrono::{DateTime, Timelike, Utc};
use num_bigint::BigInt;

pub const SECONDS_PER_DAY: i64 = 86400;

const SECONDS_PER_YEAR: i64 = 31_536_000;
const SECONDS_PER_HOUR: i64 = 3600;

/// Truncate a commit timestamp to its UTC calendar day.
pub fn day_bucket(timestamp: i64) -> i64 {
    timestamp - timestamp.rem_euclid(SECONDS_PER_DAY)
}

pub fn short_day(timestamp: i64) -> String {
    match DateTime::<Utc>::from_timestamp(timestamp, 0) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => timestamp.to_string(),
    }
}

pub fn long_date(timestamp: i64) -> String {
    match DateTime::<Utc>::from_timestamp(timestamp, 0) {
        Some(dt) => dt.format("%A %B %d, %Y").to_string(),
        None => timestamp.to_string(),
    }
}

pub fn weekday_name(timestamp: i64) -> String {
    match DateTime::<Utc>::from_timestamp(timestamp, 0) {
        Some(dt) => dt.format("%A").to_string(),
        None => String::new(),
    }
}

pub fn hour_of_day(timestamp: i64) -> u32 {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.hour())
        .unwrap_or(0)
}

/// Render a duration in seconds as "1y 12d 5h 3m 20s", omitting empty units.
pub fn format_duration(duration: &BigInt) -> String {
    let mut remaining = duration.clone();
    let zero = BigInt::from(0);
    if remaining <= zero {
        return "0".to_string();
    }

    let mut out = String::new();
    for (unit, label) in [
        (SECONDS_PER_YEAR, "y"),
        (SECONDS_PER_DAY, "d"),
        (SECONDS_PER_HOUR, "h"),
        (60, "m"),
    ] {
        let unit = BigInt::from(unit);
        if remaining >= unit {
            let n = &remaining / &unit;
            remaining = &remaining % &unit;
            out.push_str(&format!("{n}{label} "));
        }
    }

    if remaining > zero {
        out.push_str(&format!("{remaining}s"));
    }

    out.trim_end().to_string()
}

pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}
