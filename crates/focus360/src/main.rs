mod bootstrap;
mod output;

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use focus_core::error::FocusError;
use focus_core::settings::Settings;
use focus_core::time_utils::TimezoneHandler;
use focus_data::aggregator::AggregationOptions;
use focus_data::analysis::analyze_usage;
use focus_data::controls::ControlStore;
use focus_data::ranking::IconCatalog;
use focus_data::reader::SnapshotSource;
use focus_runtime::orchestrator::RefreshOrchestrator;
use focus_ui::app::{App, ViewMode};

use crate::output::ReportPrinter;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    let log_file = match (&settings.log_file, settings.output.as_str()) {
        (Some(path), _) => Some(path.clone()),
        // Keep the alternate screen clean.
        (None, "tui") => Some(bootstrap::default_log_file()),
        (None, _) => None,
    };
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("focus360 v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Output: {}, Timezone: {}, Window: {} days",
        settings.view,
        settings.output,
        settings.timezone,
        settings.window_days
    );

    let mut controls = ControlStore::open(
        settings
            .controls_file
            .clone()
            .unwrap_or_else(ControlStore::default_path),
    );

    if !settings.set.is_empty() {
        // --set is only accepted together with --app.
        let package = settings.app.as_deref().unwrap_or_default();
        for assignment in &settings.set {
            let key = controls.apply_assignment(package, assignment)?;
            tracing::info!(package, %key, "control set from command line");
        }
        println!("{}", output::controls_json(&controls.load_controls(package))?);
        return Ok(());
    }

    let timezone = TimezoneHandler::new(&settings.timezone);
    let options = AggregationOptions::default()
        .with_window_days(i64::from(settings.window_days))
        .with_timezone(timezone);
    let source = SnapshotSource::resolve(settings.snapshot_dir.as_deref());
    let icons = settings
        .icons_dir
        .as_deref()
        .map(IconCatalog::scan)
        .unwrap_or_default();

    let mut view = ViewMode::from_name(&settings.view);
    if view == ViewMode::Detail && settings.app.is_none() {
        tracing::warn!("--view detail without --app; showing the most-used ranking");
        view = ViewMode::Top;
    }

    match settings.output.as_str() {
        "plain" | "json" => {
            let report = match analyze_usage(&source, &options, Utc::now()) {
                Ok(report) => report,
                Err(e @ FocusError::PermissionDenied) => {
                    eprint!("{}", output::permission_message(source.dir()));
                    return Err(e.into());
                }
                Err(e) => return Err(e.into()),
            };
            let printer = ReportPrinter {
                report: &report,
                icons: &icons,
                controls: &controls,
                timezone,
                top_n: usize::from(settings.top),
                app: settings.app.as_deref(),
                now: report.metadata.generated_at,
            };
            let text = if settings.output == "json" {
                printer.json(view)?
            } else {
                printer.plain(view)?
            };
            println!("{}", text);
        }

        _ => {
            tracing::info!("Starting TUI from snapshot {}", source.dir().display());

            let snapshot_dir = source.dir().to_path_buf();
            let orchestrator = RefreshOrchestrator::new(
                Arc::new(source),
                options,
                u64::from(settings.refresh_rate),
            );
            let (rx, handle) = orchestrator.start();

            let mut app = App::new(
                &settings.theme,
                view,
                timezone,
                usize::from(settings.top),
                i64::from(settings.window_days),
                controls,
            )
            .with_icons(icons)
            .with_snapshot_dir(&snapshot_dir);
            if view == ViewMode::Detail {
                if let Some(package) = settings.app.as_deref() {
                    app = app.with_detail(package);
                }
            }

            tokio::select! {
                result = app.run(rx, handle) => {
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down");
                    focus_ui::app::restore_terminal()?;
                }
            }
        }
    }

    Ok(())
}
