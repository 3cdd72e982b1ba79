use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::warn;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Uses the `iana-time-zone` crate directly, no subprocess calls.
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Validate that `tz_name` is a recognised IANA timezone identifier.
pub fn validate_timezone(tz_name: &str) -> bool {
    tz_name.parse::<Tz>().is_ok()
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Timezone policy for calendar-day bucketing and display.
///
/// Usage is bucketed by the local date of each interval in this zone. The
/// default is the device zone (`"auto"`).
#[derive(Debug, Clone, Copy)]
pub struct TimezoneHandler {
    tz: Tz,
}

impl TimezoneHandler {
    /// Create a handler for an IANA timezone name.
    ///
    /// `"auto"` resolves to the system timezone. Unrecognised names fall back
    /// to UTC and log a warning.
    pub fn new(tz_name: &str) -> Self {
        let resolved = if tz_name.eq_ignore_ascii_case("auto") {
            get_system_timezone()
        } else {
            tz_name.to_string()
        };
        let tz = resolved.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: unrecognised timezone \"{}\", falling back to UTC",
                resolved
            );
            Tz::UTC
        });
        Self { tz }
    }

    pub fn from_tz(tz: Tz) -> Self {
        Self { tz }
    }

    /// Expose the configured timezone.
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Local calendar date of `instant`.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Today's date in this timezone, relative to `now`.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.local_date(now)
    }
}

impl Default for TimezoneHandler {
    fn default() -> Self {
        Self::new("auto")
    }
}
