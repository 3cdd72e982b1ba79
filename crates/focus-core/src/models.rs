use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::formatting::{format_day, format_duration};

/// Version label used when the platform does not report one.
pub const UNKNOWN_VERSION: &str = "Unknown version";

// ── AppFlags ─────────────────────────────────────────────────────────────────

/// Platform application flags, kept as the raw bitfield reported by the
/// package manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppFlags(pub u32);

impl AppFlags {
    /// Pre-installed, non-removable application.
    pub const SYSTEM: u32 = 1 << 0;
    /// Application that is an update to a pre-installed application.
    pub const UPDATED_SYSTEM_APP: u32 = 1 << 7;

    pub fn is_system(self) -> bool {
        self.0 & Self::SYSTEM != 0
    }

    pub fn is_updated_system_app(self) -> bool {
        self.0 & Self::UPDATED_SYSTEM_APP != 0
    }
}

// ── InstalledApp ─────────────────────────────────────────────────────────────

/// One installed application as reported by the device.
///
/// Timestamps are optional: the package manager may fail to return package
/// info for an application it just listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledApp {
    /// Unique package / bundle identifier.
    pub package_name: String,
    /// User-visible label.
    pub app_name: String,
    /// Icon reference (asset name or path), if the device exported one.
    #[serde(default)]
    pub icon: Option<String>,
    /// Version string, if known.
    #[serde(default)]
    pub version_name: Option<String>,
    /// First install instant (epoch milliseconds on the wire).
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub first_install_time: Option<DateTime<Utc>>,
    /// Last update instant (epoch milliseconds on the wire).
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_update_time: Option<DateTime<Utc>>,
    /// Raw platform flags.
    #[serde(default)]
    pub flags: AppFlags,
}

impl InstalledApp {
    /// Create a user-installed app with no optional metadata.
    pub fn new(package_name: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            app_name: app_name.into(),
            icon: None,
            version_name: None,
            first_install_time: None,
            last_update_time: None,
            flags: AppFlags::default(),
        }
    }

    /// Version string, or [`UNKNOWN_VERSION`] when missing or blank.
    pub fn version_or_unknown(&self) -> &str {
        match self.version_name.as_deref() {
            Some(v) if !v.trim().is_empty() => v,
            _ => UNKNOWN_VERSION,
        }
    }
}

// ── UsageInterval ────────────────────────────────────────────────────────────

/// One platform-reported slice of foreground usage for an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInterval {
    /// Package the interval belongs to.
    pub package_name: String,
    /// Last activity inside the interval.
    pub last_time_used: DateTime<Utc>,
    /// Foreground time in whole seconds.
    pub foreground_secs: u64,
}

impl UsageInterval {
    pub fn new(
        package_name: impl Into<String>,
        last_time_used: DateTime<Utc>,
        foreground_secs: u64,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            last_time_used,
            foreground_secs,
        }
    }
}

// ── DailyUsage ───────────────────────────────────────────────────────────────

/// Summed foreground time of one app on one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub duration_secs: u64,
}

impl DailyUsage {
    /// `DD/MM/YYYY`.
    pub fn formatted_date(&self) -> String {
        format_day(self.date)
    }

    /// `HH:MM:SS`.
    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration_secs)
    }
}

impl fmt::Display for DailyUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.formatted_date(), self.formatted_duration())
    }
}

// ── AppUsageSummary ──────────────────────────────────────────────────────────

/// Per-app output of the usage aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUsageSummary {
    pub package_name: String,
    pub app_name: String,
    /// Version string, [`UNKNOWN_VERSION`] when the platform had none.
    pub version_name: String,
    pub icon: Option<String>,
    /// `DD/MM/YYYY HH:MM:SS`, epoch zero when unknown.
    pub first_install_time: String,
    /// `DD/MM/YYYY HH:MM:SS`, epoch zero when unknown.
    pub last_update_time: String,
    /// `DD/MM/YYYY HH:MM:SS`, epoch zero when the app has no usage.
    pub last_used_time: String,
    /// Latest in-window activity, `None` without usage.
    pub last_used: Option<DateTime<Utc>>,
    /// Ascending by date.
    pub daily_usage: Vec<DailyUsage>,
    /// Sum of `daily_usage` durations.
    pub total_secs: u64,
}

impl AppUsageSummary {
    /// Window total as `HH:MM:SS`.
    pub fn formatted_total_usage(&self) -> String {
        format_duration(self.total_secs)
    }

    /// Daily entries rendered as `DD/MM/YYYY - HH:MM:SS`.
    pub fn formatted_daily_usage(&self) -> Vec<String> {
        self.daily_usage.iter().map(ToString::to_string).collect()
    }

    pub fn has_usage(&self) -> bool {
        !self.daily_usage.is_empty()
    }
}
