//! Time utilities: parsing HH:MM, hour formatting, etc.

use crate::errors::{AppError, AppResult};
use chrono::NaiveTime;

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    let t = t.trim();
    NaiveTime::parse_from_str(t, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
        .ok()
}

/// Parse a mandatory clock time, failing with `InvalidTimeRange`.
pub fn require_time(field: &str, input: &str) -> AppResult<NaiveTime> {
    parse_time(input)
        .ok_or_else(|| AppError::InvalidTimeRange(format!("{}: '{}' is not HH:MM", field, input)))
}

pub fn parse_optional_time(field: &str, input: Option<&String>) -> AppResult<Option<NaiveTime>> {
    match input {
        Some(s) if !s.trim().is_empty() => require_time(field, s).map(Some),
        _ => Ok(None),
    }
}

pub fn format_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

/// Fractional hours rendered as `HHh MMm`, rounded to the minute.
pub fn format_hours(hours: f64) -> String {
    let mins = (hours * 60.0).round() as i64;
    let sign = if mins < 0 { "-" } else { "" };
    let m = mins.abs();
    format!("{}{:02}h {:02}m", sign, m / 60, m % 60)
}
