//! Per-app usage aggregation over a trailing window.
//!
//! Turns the platform's unordered usage intervals into one
//! [`AppUsageSummary`] per tracked installed app: daily totals keyed by local
//! calendar date, a window total and a last-used instant.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use focus_core::filters::{default_excluded_packages, is_tracked_app};
use focus_core::formatting::format_timestamp_or_epoch;
use focus_core::models::{AppUsageSummary, DailyUsage, InstalledApp, UsageInterval};
use focus_core::time_utils::TimezoneHandler;
use tracing::debug;

/// Default trailing window.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

// ── AggregationOptions ────────────────────────────────────────────────────────

/// Knobs for [`UsageAggregator`].
#[derive(Debug, Clone)]
pub struct AggregationOptions {
    /// Length of the trailing window ending at `now`.
    pub window: Duration,
    /// Packages dropped regardless of their flags.
    pub excluded_packages: HashSet<String>,
    /// Zone whose calendar days the usage is split into.
    pub timezone: TimezoneHandler,
}

impl AggregationOptions {
    pub fn with_window_days(mut self, days: i64) -> Self {
        self.window = Duration::days(days);
        self
    }

    pub fn with_timezone(mut self, timezone: TimezoneHandler) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_excluded_packages(mut self, excluded: HashSet<String>) -> Self {
        self.excluded_packages = excluded;
        self
    }
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self {
            window: Duration::days(DEFAULT_WINDOW_DAYS),
            excluded_packages: default_excluded_packages(),
            timezone: TimezoneHandler::default(),
        }
    }
}

// ── AppAccumulator ────────────────────────────────────────────────────────────

/// In-window usage collected for one package.
#[derive(Debug, Default)]
struct AppAccumulator {
    by_day: BTreeMap<NaiveDate, u64>,
    total_secs: u64,
    last_used: Option<DateTime<Utc>>,
}

impl AppAccumulator {
    fn add(&mut self, day: NaiveDate, interval: &UsageInterval) {
        *self.by_day.entry(day).or_insert(0) += interval.foreground_secs;
        self.total_secs += interval.foreground_secs;
        self.last_used = Some(match self.last_used {
            Some(prev) => prev.max(interval.last_time_used),
            None => interval.last_time_used,
        });
    }

    fn daily_usage(&self) -> Vec<DailyUsage> {
        self.by_day
            .iter()
            .map(|(&date, &duration_secs)| DailyUsage {
                date,
                duration_secs,
            })
            .collect()
    }
}

// ── UsageAggregator ───────────────────────────────────────────────────────────

/// Stateless aggregation of installed apps and usage intervals.
///
/// Every call allocates its own working maps and leaves the inputs
/// untouched, so one aggregator may be shared freely between callers.
#[derive(Debug, Clone, Default)]
pub struct UsageAggregator {
    options: AggregationOptions,
}

impl UsageAggregator {
    pub fn new(options: AggregationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AggregationOptions {
        &self.options
    }

    /// First instant included in the window ending at `now`.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.options.window
    }

    /// `true` when `instant` lies in `[now - window, now]`.
    pub fn in_window(&self, instant: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        instant >= self.window_start(now) && instant <= now
    }

    /// Build one summary per tracked app, in the order of `apps`.
    ///
    /// Intervals outside the window are dropped whole, never clipped. Apps
    /// without in-window usage still get a summary with no daily entries and
    /// a zero total.
    pub fn aggregate(
        &self,
        apps: &[InstalledApp],
        intervals: &[UsageInterval],
        now: DateTime<Utc>,
    ) -> Vec<AppUsageSummary> {
        let mut usage: HashMap<&str, AppAccumulator> = HashMap::new();
        let mut discarded = 0usize;

        for interval in intervals {
            if !self.in_window(interval.last_time_used, now) {
                discarded += 1;
                continue;
            }
            let day = self.options.timezone.local_date(interval.last_time_used);
            usage
                .entry(interval.package_name.as_str())
                .or_default()
                .add(day, interval);
        }

        let summaries: Vec<AppUsageSummary> = apps
            .iter()
            .filter(|app| is_tracked_app(app, &self.options.excluded_packages))
            .map(|app| self.summarize(app, usage.get(app.package_name.as_str())))
            .collect();

        debug!(
            apps_in = apps.len(),
            apps_out = summaries.len(),
            intervals = intervals.len(),
            discarded,
            "usage aggregated"
        );

        summaries
    }

    /// Build the summary of a single app from its accumulated usage.
    fn summarize(&self, app: &InstalledApp, acc: Option<&AppAccumulator>) -> AppUsageSummary {
        let tz = self.options.timezone.tz();
        let (daily_usage, total_secs, last_used) = match acc {
            Some(acc) => (acc.daily_usage(), acc.total_secs, acc.last_used),
            None => (Vec::new(), 0, None),
        };

        debug_assert_eq!(
            total_secs,
            daily_usage.iter().map(|d| d.duration_secs).sum::<u64>()
        );

        AppUsageSummary {
            package_name: app.package_name.clone(),
            app_name: app.app_name.clone(),
            version_name: app.version_or_unknown().to_string(),
            icon: app.icon.clone(),
            first_install_time: format_timestamp_or_epoch(app.first_install_time, tz),
            last_update_time: format_timestamp_or_epoch(app.last_update_time, tz),
            last_used_time: format_timestamp_or_epoch(last_used, tz),
            last_used,
            daily_usage,
            total_secs,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
