//! Session elapsed time.
//!
//! Never stored as a counter: every read recomputes `now - started_at`, so
//! backgrounding or a missed tick cannot make it drift.

use chrono::{DateTime, Utc};

/// Whole seconds elapsed since `started_at`, clamped at zero.
pub fn elapsed_secs(started_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - started_at).num_seconds().max(0) as u64
}

/// `MM:SS`, or `H:MM:SS` from one hour on.
pub fn format_elapsed(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Formatted elapsed duration of a session at `now`.
pub fn session_duration(started_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format_elapsed(elapsed_secs(started_at, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn formats_under_an_hour() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(65), "01:05");
        assert_eq!(format_elapsed(3599), "59:59");
    }

    #[test]
    fn formats_past_an_hour() {
        assert_eq!(format_elapsed(3600), "1:00:00");
        assert_eq!(format_elapsed(3 * 3600 + 7 * 60 + 9), "3:07:09");
    }

    #[test]
    fn recomputes_from_start_time() {
        let start = Utc::now();
        let later = start + Duration::seconds(754);
        assert_eq!(session_duration(start, later), "12:34");
    }

    #[test]
    fn clock_skew_clamps_to_zero() {
        let start = Utc::now();
        let earlier = start - Duration::seconds(30);
        assert_eq!(elapsed_secs(start, earlier), 0);
    }
}
