//! Main analysis pipeline for focus360.
//!
//! Checks usage access, fetches installed apps and usage intervals from a
//! [`UsageSource`], and runs the [`UsageAggregator`] over them.

use chrono::{DateTime, Utc};
use focus_core::error::{FocusError, Result};
use focus_core::models::AppUsageSummary;
use tracing::{info, warn};

use crate::aggregator::{AggregationOptions, UsageAggregator};
use crate::reader::UsageSource;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the report.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReportMetadata {
    /// Reference instant the window ends at.
    pub generated_at: DateTime<Utc>,
    /// Window length in whole days.
    pub window_days: i64,
    /// Installed apps returned by the source.
    pub apps_listed: usize,
    /// Usage intervals returned by the source.
    pub intervals_loaded: usize,
    /// Set when the source failed and the pipeline continued with no data.
    pub source_error: Option<String>,
}

/// The complete output of [`analyze_usage`].
#[derive(Debug, Clone)]
pub struct UsageReport {
    /// One summary per tracked app, in source order.
    pub summaries: Vec<AppUsageSummary>,
    pub metadata: ReportMetadata,
}

impl UsageReport {
    /// Sum of every app's window total.
    pub fn total_secs(&self) -> u64 {
        self.summaries.iter().map(|s| s.total_secs).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    pub fn find(&self, package_name: &str) -> Option<&AppUsageSummary> {
        self.summaries.iter().find(|s| s.package_name == package_name)
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full pipeline.
///
/// 1. Refuse with [`FocusError::PermissionDenied`] when usage access is off.
/// 2. Fetch installed apps and in-window usage; a failed fetch is logged and
///    treated as an empty list.
/// 3. Aggregate.
pub fn analyze_usage(
    source: &dyn UsageSource,
    options: &AggregationOptions,
    now: DateTime<Utc>,
) -> Result<UsageReport> {
    if !source.is_usage_access_granted() {
        warn!("usage access not granted");
        return Err(FocusError::PermissionDenied);
    }

    let aggregator = UsageAggregator::new(options.clone());
    let start = aggregator.window_start(now);
    let mut source_error = None;

    let apps = source.installed_apps().unwrap_or_else(|e| {
        warn!(error = %e, "failed to list installed apps; continuing with none");
        source_error = Some(e.to_string());
        Vec::new()
    });

    let intervals = source.usage_intervals(start, now).unwrap_or_else(|e| {
        warn!(error = %e, "failed to load usage intervals; continuing with none");
        source_error.get_or_insert_with(|| e.to_string());
        Vec::new()
    });

    let summaries = aggregator.aggregate(&apps, &intervals, now);

    info!(
        apps = summaries.len(),
        intervals = intervals.len(),
        "usage analysis complete"
    );

    Ok(UsageReport {
        metadata: ReportMetadata {
            generated_at: now,
            window_days: options.window.num_days(),
            apps_listed: apps.len(),
            intervals_loaded: intervals.len(),
            source_error,
        },
        summaries,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
