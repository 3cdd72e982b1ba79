//! Async refresh orchestrator.
//!
//! Owns a [`DataManager`] inside a tokio task and sends a [`RefreshUpdate`]
//! through an `mpsc` channel on every interval tick or manual refresh
//! request, so the TUI event loop never shares mutable state with it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use focus_data::aggregator::AggregationOptions;
use focus_data::analysis::UsageReport;
use focus_data::reader::UsageSource;
use tokio::sync::mpsc;
use tokio::time;

use crate::data_manager::DataManager;

// ── Public types ──────────────────────────────────────────────────────────────

/// One snapshot forwarded to the presentation layer.
#[derive(Debug, Clone)]
pub enum RefreshUpdate {
    /// Usage access is not granted (checked on every refresh).
    PermissionRequired { checked_at: DateTime<Utc> },
    Report {
        report: UsageReport,
        /// Set when the last fetch failed and the report is stale or empty.
        error: Option<String>,
    },
}

impl RefreshUpdate {
    /// `None` for the report means usage access is not granted.
    fn new(report: Option<UsageReport>, error: Option<String>) -> Self {
        match report {
            None => RefreshUpdate::PermissionRequired {
                checked_at: Utc::now(),
            },
            Some(report) => RefreshUpdate::Report { report, error },
        }
    }
}

// ── RefreshOrchestrator ───────────────────────────────────────────────────────

/// Background refresh coordinator.
pub struct RefreshOrchestrator {
    source: Arc<dyn UsageSource>,
    options: AggregationOptions,
    update_interval: Duration,
}

impl RefreshOrchestrator {
    pub fn new(
        source: Arc<dyn UsageSource>,
        options: AggregationOptions,
        update_interval_secs: u64,
    ) -> Self {
        Self {
            source,
            options,
            update_interval: Duration::from_secs(update_interval_secs.max(1)),
        }
    }

    /// Spawn the refresh loop.
    ///
    /// Returns the update receiver and a [`RefreshHandle`] for manual
    /// refreshes and shutdown. Must be called inside a tokio runtime.
    pub fn start(self) -> (mpsc::Receiver<RefreshUpdate>, RefreshHandle) {
        let (tx, rx) = mpsc::channel(16);
        let (refresh_tx, refresh_rx) = mpsc::channel(4);

        let handle = tokio::spawn(async move {
            self.refresh_loop(tx, refresh_rx).await;
        });

        (
            rx,
            RefreshHandle {
                handle,
                refresh_tx,
            },
        )
    }

    // ── Private implementation ────────────────────────────────────────────

    /// Immediate fetch, then one per tick or request. Exits once the update
    /// receiver or the [`RefreshHandle`] is dropped.
    async fn refresh_loop(
        self,
        tx: mpsc::Sender<RefreshUpdate>,
        mut refresh_rx: mpsc::Receiver<()>,
    ) {
        // Half the interval so every tick sees an expired cache.
        let mut data_manager = DataManager::new(
            Arc::clone(&self.source),
            self.options.clone(),
            self.update_interval / 2,
        );

        if !Self::fetch_and_send(&mut data_manager, &tx, true).await {
            return;
        }

        let mut interval = time::interval(self.update_interval);
        interval.tick().await;

        loop {
            let force = tokio::select! {
                _ = interval.tick() => false,
                request = refresh_rx.recv() => match request {
                    Some(()) => {
                        tracing::debug!("manual refresh requested");
                        true
                    }
                    None => {
                        tracing::debug!("refresh handle dropped; exiting loop");
                        break;
                    }
                },
            };

            if tx.is_closed() {
                tracing::debug!("refresh channel closed; exiting loop");
                break;
            }

            if !Self::fetch_and_send(&mut data_manager, &tx, force).await {
                break;
            }
        }
    }

    /// Returns `false` when the receiver is gone.
    async fn fetch_and_send(
        data_manager: &mut DataManager,
        tx: &mpsc::Sender<RefreshUpdate>,
        force: bool,
    ) -> bool {
        let report = data_manager.get_data(force).report().cloned();
        let error = data_manager.last_error().map(str::to_string);
        let update = RefreshUpdate::new(report, error);

        if let Err(e) = tx.send(update).await {
            tracing::warn!(error = %e, "failed to send refresh update; receiver dropped");
            return false;
        }
        true
    }
}

// ── RefreshHandle ─────────────────────────────────────────────────────────────

/// Handle to the background refresh task. Dropping it stops the loop.
pub struct RefreshHandle {
    handle: tokio::task::JoinHandle<()>,
    refresh_tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Ask for an immediate refresh that bypasses the cache.
    ///
    /// Requests made while one is already queued are coalesced.
    pub fn request_refresh(&self) {
        if self.refresh_tx.try_send(()).is_err() {
            tracing::debug!("refresh already pending");
        }
    }

    /// Immediately abort the refresh loop.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
