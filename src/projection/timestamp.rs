//! Iteration timestamp formatting.

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Rendered in place of a timestamp that cannot be represented.
pub const INVALID_DATE: &str = "Invalid Date";

/// Largest representable distance from the epoch, in milliseconds.
const MAX_TIME_MILLIS: f64 = 8.64e15;

/// Render epoch seconds as an ISO-8601 UTC string with millisecond precision.
///
/// Seconds are scaled to milliseconds and truncated toward zero. Years outside
/// `0..=9999` use the expanded `±YYYYYY` form. Non-finite or out-of-range
/// input yields [`INVALID_DATE`].
pub fn format_timestamp(seconds: f64) -> String {
    let millis = (seconds * 1000.0).trunc();
    if !millis.is_finite() || millis.abs() > MAX_TIME_MILLIS {
        return INVALID_DATE.to_string();
    }

    let Some(dt) = DateTime::<Utc>::from_timestamp_millis(millis as i64) else {
        return INVALID_DATE.to_string();
    };

    let year = dt.year();
    let year = if (0..=9999).contains(&year) {
        format!("{:04}", year)
    } else {
        let sign = if year < 0 { '-' } else { '+' };
        format!("{}{:06}", sign, year.unsigned_abs())
    };

    format!(
        "{}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        year,
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        dt.timestamp_subsec_millis()
    )
}
