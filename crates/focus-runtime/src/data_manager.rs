//! TTL-cached data manager for the refresh runtime.
//!
//! Wraps [`analyze_usage`] with a time-to-live cache and the usage-access
//! gate. Callers use [`DataManager::get_data`] to obtain either a fresh or
//! cached [`UsageReport`], or learn that usage access has to be granted first.
//! Fetches are not retried. Source failures arrive inside the report as
//! `metadata.source_error` and surface through [`DataManager::last_error`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use focus_data::aggregator::AggregationOptions;
use focus_data::analysis::{analyze_usage, UsageReport};
use focus_data::reader::UsageSource;

/// Default cache TTL in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;

// ── DataState ─────────────────────────────────────────────────────────────────

/// Result of [`DataManager::get_data`].
#[derive(Debug, Clone, Copy)]
pub enum DataState<'a> {
    /// Usage access is off; nothing can be shown until it is granted.
    PermissionRequired,
    Ready(&'a UsageReport),
}

impl<'a> DataState<'a> {
    pub fn report(self) -> Option<&'a UsageReport> {
        match self {
            DataState::Ready(report) => Some(report),
            DataState::PermissionRequired => None,
        }
    }

    pub fn is_permission_required(&self) -> bool {
        matches!(self, DataState::PermissionRequired)
    }
}

// ── DataManager ───────────────────────────────────────────────────────────────

/// TTL-cached wrapper around the analysis pipeline.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use focus_data::aggregator::AggregationOptions;
/// use focus_data::reader::SnapshotSource;
/// use focus_runtime::data_manager::{DataManager, DataState};
///
/// let source = Arc::new(SnapshotSource::new("/sdcard/focus360"));
/// let mut mgr = DataManager::new(source, AggregationOptions::default(), Duration::from_secs(30));
/// if let DataState::Ready(report) = mgr.get_data(false) {
///     println!("apps: {}", report.summaries.len());
/// }
/// ```
pub struct DataManager {
    source: Arc<dyn UsageSource>,
    options: AggregationOptions,
    cache_ttl: Duration,
    cache: Option<UsageReport>,
    cache_timestamp: Option<Instant>,
    last_error: Option<String>,
}

impl DataManager {
    pub fn new(
        source: Arc<dyn UsageSource>,
        options: AggregationOptions,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            source,
            options,
            cache_ttl,
            cache: None,
            cache_timestamp: None,
            last_error: None,
        }
    }

    pub fn options(&self) -> &AggregationOptions {
        &self.options
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Current data with the window ending now.
    pub fn get_data(&mut self, force_refresh: bool) -> DataState<'_> {
        self.get_data_at(force_refresh, Utc::now())
    }

    /// Current data with the window ending at `now`.
    ///
    /// Usage access is checked on every call, cached or not. When access has
    /// been revoked the cache is dropped.
    pub fn get_data_at(&mut self, force_refresh: bool, now: DateTime<Utc>) -> DataState<'_> {
        if !self.source.is_usage_access_granted() {
            if self.cache.is_some() {
                tracing::info!("usage access revoked; dropping cached report");
                self.invalidate_cache();
            }
            return DataState::PermissionRequired;
        }

        if force_refresh || !self.is_cache_valid() {
            self.refresh(now);
        } else {
            tracing::debug!("returning cached usage report");
        }

        match self.cache.as_ref() {
            Some(report) => DataState::Ready(report),
            None => DataState::PermissionRequired,
        }
    }

    /// Discard the current cache, forcing the next [`get_data`](Self::get_data) to fetch.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        self.cache_timestamp = None;
        tracing::debug!("cache invalidated");
    }

    /// Age of the current cache entry, or `None` if nothing has been fetched.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache_timestamp.map(|ts| ts.elapsed())
    }

    /// Description of the last fetch error, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn is_cache_valid(&self) -> bool {
        match (self.cache.as_ref(), self.cache_timestamp) {
            (Some(_), Some(ts)) => ts.elapsed() < self.cache_ttl,
            _ => false,
        }
    }

    fn refresh(&mut self, now: DateTime<Utc>) {
        match analyze_usage(self.source.as_ref(), &self.options, now) {
            Ok(report) => {
                tracing::debug!(
                    apps = report.summaries.len(),
                    total_secs = report.total_secs(),
                    "usage report cache updated"
                );
                self.last_error = report.metadata.source_error.clone();
                self.cache = Some(report);
                self.cache_timestamp = Some(Instant::now());
            }
            // Only the permission gate fails here; access was revoked
            // between the check above and the fetch.
            Err(e) => {
                tracing::info!(error = %e, "usage report unavailable");
                self.invalidate_cache();
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
