use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// `strftime` pattern for instants: `DD/MM/YYYY HH:MM:SS`.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// `strftime` pattern for calendar days: `DD/MM/YYYY`.
pub const DAY_FORMAT: &str = "%d/%m/%Y";

/// Format a number of seconds as `HH:MM:SS`.
///
/// Hours are not wrapped at 24; they grow past two digits when needed.
///
/// # Examples
///
/// ```
/// use focus_core::formatting::format_duration;
///
/// assert_eq!(format_duration(0), "00:00:00");
/// assert_eq!(format_duration(5400), "01:30:00");
/// assert_eq!(format_duration(90_061), "25:01:01");
/// assert_eq!(format_duration(360_000), "100:00:00");
/// ```
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Format an instant as `DD/MM/YYYY HH:MM:SS` in `tz`.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use focus_core::formatting::format_timestamp;
///
/// let ts = Utc.with_ymd_and_hms(2024, 1, 15, 8, 5, 9).unwrap();
/// assert_eq!(format_timestamp(ts, chrono_tz::UTC), "15/01/2024 08:05:09");
/// ```
pub fn format_timestamp(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(TIMESTAMP_FORMAT).to_string()
}

/// Like [`format_timestamp`], substituting the Unix epoch for a missing instant.
pub fn format_timestamp_or_epoch(instant: Option<DateTime<Utc>>, tz: Tz) -> String {
    format_timestamp(instant.unwrap_or(DateTime::<Utc>::UNIX_EPOCH), tz)
}

/// Format a calendar day as `DD/MM/YYYY`.
pub fn format_day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// Compact duration for narrow table cells.
///
/// * `< 1h` → `"45m"`
/// * whole hours → `"3h"`
/// * otherwise → `"3h 45m"`
///
/// Seconds are truncated.
pub fn format_compact(total_secs: u64) -> String {
    let total_mins = total_secs / 60;
    if total_mins < 60 {
        format!("{}m", total_mins)
    } else {
        let hours = total_mins / 60;
        let mins = total_mins % 60;
        if mins == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h {}m", hours, mins)
        }
    }
}

/// Hours with one decimal place, e.g. `"20.0 h"`.
pub fn format_hours(hours: f64) -> String {
    format!("{:.1} h", hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // ── format_duration ──────────────────────────────────────────────────────

    #[test]
    fn test_format_duration_zero() {
        assert_eq!(format_duration(0), "00:00:00");
    }

    #[test]
    fn test_format_duration_components() {
        assert_eq!(format_duration(59), "00:00:59");
        assert_eq!(format_duration(60), "00:01:00");
        assert_eq!(format_duration(3661), "01:01:01");
        assert_eq!(format_duration(10_800), "03:00:00");
    }

    #[test]
    fn test_format_duration_past_a_day() {
        assert_eq!(format_duration(86_400), "24:00:00");
        assert_eq!(format_duration(100 * 3600 + 59), "100:00:59");
    }

    // ── format_timestamp ─────────────────────────────────────────────────────

    #[test]
    fn test_format_timestamp_utc() {
        let ts = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 58).unwrap();
        assert_eq!(format_timestamp(ts, chrono_tz::UTC), "31/12/2023 23:59:58");
    }

    #[test]
    fn test_format_timestamp_converts_zone() {
        // 23:30 UTC is already the next day in Madrid (UTC+1 in winter).
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 23, 30, 0).unwrap();
        assert_eq!(
            format_timestamp(ts, chrono_tz::Europe::Madrid),
            "16/01/2024 00:30:00"
        );
    }

    #[test]
    fn test_format_timestamp_or_epoch() {
        assert_eq!(
            format_timestamp_or_epoch(None, chrono_tz::UTC),
            "01/01/1970 00:00:00"
        );
    }

    // ── format_day ───────────────────────────────────────────────────────────

    #[test]
    fn test_format_day_zero_padded() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
        assert_eq!(format_day(d), "03/02/2024");
    }

    // ── format_compact ───────────────────────────────────────────────────────

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(0), "0m");
        assert_eq!(format_compact(45 * 60 + 30), "45m");
        assert_eq!(format_compact(3 * 3600), "3h");
        assert_eq!(format_compact(3 * 3600 + 45 * 60), "3h 45m");
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(20.0), "20.0 h");
        assert_eq!(format_hours(1.26), "1.3 h");
    }
}
