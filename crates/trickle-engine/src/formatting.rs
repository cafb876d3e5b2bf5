//! Human-readable times for log lines and `status` output

use chrono::{DateTime, Utc};

/// Whole seconds as "42s", "2m 05s" or "1h 02m 05s"
pub fn format_wait(secs: u64) -> String {
    match (secs / 3600, (secs % 3600) / 60, secs % 60) {
        (0, 0, s) => format!("{}s", s),
        (0, m, s) => format!("{}m {:02}s", m, s),
        (h, m, s) => format!("{}h {:02}m {:02}s", h, m, s),
    }
}

/// Epoch seconds as a UTC date and time
pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("@{}", secs))
}
