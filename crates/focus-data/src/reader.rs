//! Device snapshot loading for focus360.
//!
//! A snapshot is a directory exported from the phone that stands in for the
//! platform services:
//!
//! * `installed_apps.json`: array of installed-app descriptors
//! * `usage_stats.json`: array of raw usage records (epoch milliseconds)
//! * `usage_access.json`: `{"granted": true}` once usage access is allowed

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use focus_core::error::{FocusError, Result};
use focus_core::models::{InstalledApp, UsageInterval};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const INSTALLED_APPS_FILE: &str = "installed_apps.json";
pub const USAGE_STATS_FILE: &str = "usage_stats.json";
pub const USAGE_ACCESS_FILE: &str = "usage_access.json";

// ── UsageSource ───────────────────────────────────────────────────────────────

/// The platform services the analysis pipeline reads from.
pub trait UsageSource: Send + Sync {
    /// Whether the user granted access to usage statistics.
    fn is_usage_access_granted(&self) -> bool;

    /// Every installed application with its metadata.
    fn installed_apps(&self) -> Result<Vec<InstalledApp>>;

    /// Usage intervals whose last activity lies in `[start, end]`.
    fn usage_intervals(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<UsageInterval>>;
}

// ── Raw records ───────────────────────────────────────────────────────────────

/// One usage record as exported by the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUsageStat {
    pub package_name: String,
    /// Epoch milliseconds of the last activity.
    pub last_time_used: i64,
    /// Foreground time in milliseconds.
    #[serde(default)]
    pub total_time_in_foreground: i64,
}

impl RawUsageStat {
    /// Convert to a [`UsageInterval`], truncating milliseconds to whole seconds.
    ///
    /// Returns `None` when the timestamp is out of range.
    pub fn to_interval(&self) -> Option<UsageInterval> {
        let last_time_used = DateTime::from_timestamp_millis(self.last_time_used)?;
        let foreground_secs = u64::try_from(self.total_time_in_foreground).unwrap_or(0) / 1000;
        Some(UsageInterval::new(
            self.package_name.clone(),
            last_time_used,
            foreground_secs,
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
struct UsageAccess {
    #[serde(default)]
    granted: bool,
}

// ── SnapshotSource ────────────────────────────────────────────────────────────

/// [`UsageSource`] backed by a snapshot directory.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    dir: PathBuf,
}

impl SnapshotSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Snapshot directory given on the command line, or `~/.focus360/snapshot`.
    pub fn resolve(dir: Option<&Path>) -> Self {
        match dir {
            Some(d) => Self::new(d),
            None => Self::new(default_snapshot_dir()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<T> {
        if !self.dir.is_dir() {
            return Err(FocusError::SnapshotNotFound(self.dir.clone()));
        }
        let path = self.dir.join(name);
        let content = std::fs::read_to_string(&path).map_err(|source| FocusError::FileRead {
            path: path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl UsageSource for SnapshotSource {
    fn is_usage_access_granted(&self) -> bool {
        match self.read_json::<UsageAccess>(USAGE_ACCESS_FILE) {
            Ok(access) => access.granted,
            Err(FocusError::SnapshotNotFound(dir)) => {
                warn!(
                    "snapshot directory {} does not exist; check --snapshot-dir",
                    dir.display()
                );
                false
            }
            Err(e) => {
                debug!(error = %e, "usage access not readable; treating as not granted");
                false
            }
        }
    }

    fn installed_apps(&self) -> Result<Vec<InstalledApp>> {
        let apps: Vec<InstalledApp> = self.read_json(INSTALLED_APPS_FILE)?;
        debug!(count = apps.len(), "loaded installed apps");
        Ok(apps)
    }

    fn usage_intervals(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<UsageInterval>> {
        let raw: Vec<RawUsageStat> = self.read_json(USAGE_STATS_FILE)?;
        let total = raw.len();

        let mut skipped = 0usize;
        let intervals: Vec<UsageInterval> = raw
            .iter()
            .filter_map(|r| {
                let interval = r.to_interval();
                if interval.is_none() {
                    skipped += 1;
                }
                interval
            })
            .filter(|i| i.last_time_used >= start && i.last_time_used <= end)
            .collect();

        if skipped > 0 {
            warn!(skipped, "usage records with out-of-range timestamps were skipped");
        }
        debug!(
            total,
            kept = intervals.len(),
            "loaded usage intervals from {}",
            self.dir.display()
        );
        Ok(intervals)
    }
}

/// `~/.focus360/snapshot`.
pub fn default_snapshot_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".focus360")
        .join("snapshot")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
