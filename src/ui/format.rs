//! Human-readable durations and ages.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Format a duration for display: `500ms`, `5.3s`, `1.5m`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

/// How long before `now` a timestamp was, e.g. `3 days ago`.
pub fn format_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = now.signed_duration_since(timestamp).num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }

    let (value, unit) = if minutes < 60 {
        (minutes, "minute")
    } else if minutes < 60 * 24 {
        (minutes / 60, "hour")
    } else {
        (minutes / (60 * 24), "day")
    };

    if value == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", value, unit)
    }
}
