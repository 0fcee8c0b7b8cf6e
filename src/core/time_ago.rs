//! Coarse relative ages for list entries ("3 days ago").

use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Formats the age of `then` relative to `now` in the largest whole unit.
///
/// All divisions floor, so a timestamp in the future never yields a positive
/// unit and reads as "just now". Units are always plural.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_milliseconds().div_euclid(1000);

    let days = seconds.div_euclid(DAY);
    if days > 0 {
        return format!("{days} days ago");
    }
    let hours = seconds.div_euclid(HOUR);
    if hours > 0 {
        return format!("{hours} hours ago");
    }
    let minutes = seconds.div_euclid(MINUTE);
    if minutes > 0 {
        return format!("{minutes} minutes ago");
    }
    "just now".to_string()
}
