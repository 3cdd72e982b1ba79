//! Non-interactive output: plain text and JSON renderings of a usage report.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use focus_core::calculations::{daily_limit_status, hours_used_on, usage_on, usage_progress};
use focus_core::formatting::{format_duration, format_hours};
use focus_core::models::AppUsageSummary;
use focus_core::time_utils::TimezoneHandler;
use focus_data::analysis::UsageReport;
use focus_data::controls::{AppControls, ControlKey, ControlStore};
use focus_data::ranking::{app_list_with_icons, top_by_usage, IconCatalog};
use focus_ui::app::ViewMode;
use focus_ui::detail_view::limit_summary;
use focus_ui::permission_view::{grant_steps, missing_snapshot_notice, PERMISSION_TITLE};

// ── JSON records ───────────────────────────────────────────────────────────────

/// One app as exposed to JSON consumers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUsageRecord<'a> {
    pub package_name: &'a str,
    pub app_name: &'a str,
    pub version_name: &'a str,
    pub first_install_time: &'a str,
    pub last_update_time: &'a str,
    pub last_used_time: &'a str,
    /// `DD/MM/YYYY - HH:MM:SS` per day.
    pub formatted_hours_used_by_day: Vec<String>,
    pub formatted_total_usage: String,
}

impl<'a> From<&'a AppUsageSummary> for AppUsageRecord<'a> {
    fn from(s: &'a AppUsageSummary) -> Self {
        Self {
            package_name: &s.package_name,
            app_name: &s.app_name,
            version_name: &s.version_name,
            first_install_time: &s.first_install_time,
            last_update_time: &s.last_update_time,
            last_used_time: &s.last_used_time,
            formatted_hours_used_by_day: s.formatted_daily_usage(),
            formatted_total_usage: s.formatted_total_usage(),
        }
    }
}

/// Controls keyed by their stored names.
#[derive(Debug, Serialize)]
struct ControlsRecord<'a> {
    #[serde(rename = "autoLock")]
    auto_lock: bool,
    #[serde(rename = "silentNotif")]
    focus_mode: bool,
    #[serde(rename = "hideLauncher")]
    smart_alerts: bool,
    #[serde(rename = "pauseBg")]
    forced_break: bool,
    #[serde(rename = "dailyLimit")]
    daily_limit: &'a str,
}

impl<'a> From<&'a AppControls> for ControlsRecord<'a> {
    fn from(c: &'a AppControls) -> Self {
        Self {
            auto_lock: c.auto_lock,
            focus_mode: c.focus_mode,
            smart_alerts: c.smart_alerts,
            forced_break: c.forced_break,
            daily_limit: &c.daily_limit,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailRecord<'a> {
    #[serde(flatten)]
    app: AppUsageRecord<'a>,
    controls: ControlsRecord<'a>,
}

// ── ReportPrinter ──────────────────────────────────────────────────────────────

/// Renders a report for one view without the TUI.
pub struct ReportPrinter<'a> {
    pub report: &'a UsageReport,
    pub icons: &'a IconCatalog,
    pub controls: &'a ControlStore,
    pub timezone: TimezoneHandler,
    pub top_n: usize,
    /// Package shown by the detail view.
    pub app: Option<&'a str>,
    pub now: DateTime<Utc>,
}

impl<'a> ReportPrinter<'a> {
    fn detail_summary(&self) -> Result<&'a AppUsageSummary> {
        let package = self
            .app
            .ok_or_else(|| anyhow!("the detail view needs --app <PACKAGE>"))?;
        self.report
            .find(package)
            .ok_or_else(|| anyhow!("app '{}' is not tracked", package))
    }

    pub fn json(&self, view: ViewMode) -> Result<String> {
        let json = match view {
            ViewMode::Apps => {
                let records: Vec<AppUsageRecord> =
                    self.report.summaries.iter().map(AppUsageRecord::from).collect();
                serde_json::to_string_pretty(&records)?
            }
            ViewMode::Top => {
                let records: Vec<AppUsageRecord> = top_by_usage(&self.report.summaries, self.top_n)
                    .into_iter()
                    .map(AppUsageRecord::from)
                    .collect();
                serde_json::to_string_pretty(&records)?
            }
            ViewMode::Detail => {
                let summary = self.detail_summary()?;
                let controls = self.controls.load_controls(&summary.package_name);
                serde_json::to_string_pretty(&DetailRecord {
                    app: AppUsageRecord::from(summary),
                    controls: ControlsRecord::from(&controls),
                })?
            }
        };
        Ok(json)
    }

    pub fn plain(&self, view: ViewMode) -> Result<String> {
        let mut out = String::new();
        let tz = self.timezone.tz();
        let days = self.report.metadata.window_days;

        match view {
            ViewMode::Apps => {
                writeln!(
                    out,
                    "Installed apps ({}) - last {} days - {}",
                    self.report.summaries.len(),
                    days,
                    tz.name()
                )?;
                for (i, item) in app_list_with_icons(&self.report.summaries, self.icons)
                    .iter()
                    .enumerate()
                {
                    writeln!(
                        out,
                        "{:>3}. {:<28} {:<20} {}",
                        i + 1,
                        item.app_name,
                        item.icon.label(),
                        format_duration(item.total_secs)
                    )?;
                }
            }
            ViewMode::Top => {
                let today = self.timezone.today(self.now);
                let hours = hours_used_on(&self.report.summaries, today);
                writeln!(
                    out,
                    "Today: {} of 24 h ({:.0}%)",
                    format_hours(hours),
                    usage_progress(hours) * 100.0
                )?;
                let top = top_by_usage(&self.report.summaries, self.top_n);
                writeln!(out, "Top {} most used - last {} days", top.len(), days)?;
                for (i, s) in top.iter().enumerate() {
                    writeln!(
                        out,
                        "{:>3}. {:<28} {}",
                        i + 1,
                        s.app_name,
                        s.formatted_total_usage()
                    )?;
                }
            }
            ViewMode::Detail => {
                let s = self.detail_summary()?;
                let controls = self.controls.load_controls(&s.package_name);
                let used_today = usage_on(s, self.timezone.today(self.now));
                let status = daily_limit_status(used_today, controls.daily_limit_minutes());

                writeln!(out, "{} ({})", s.app_name, s.package_name)?;
                writeln!(out, "  Version:    {}", s.version_name)?;
                writeln!(out, "  Installed:  {}", s.first_install_time)?;
                writeln!(out, "  Updated:    {}", s.last_update_time)?;
                writeln!(out, "  Last used:  {}", s.last_used_time)?;
                writeln!(out, "  Total:      {}", s.formatted_total_usage())?;
                writeln!(out, "  Daily usage:")?;
                if s.daily_usage.is_empty() {
                    writeln!(out, "    (none)")?;
                }
                for line in s.formatted_daily_usage() {
                    writeln!(out, "    {}", line)?;
                }
                writeln!(out, "  Controls:")?;
                for key in ControlKey::TOGGLES {
                    let on = controls.toggle(key).unwrap_or(false);
                    writeln!(
                        out,
                        "    [{}] {}",
                        if on { "x" } else { " " },
                        key.label()
                    )?;
                }
                let limit = if controls.daily_limit.is_empty() {
                    "-"
                } else {
                    controls.daily_limit.as_str()
                };
                writeln!(
                    out,
                    "    {}: {} ({})",
                    ControlKey::DailyLimit.label(),
                    limit,
                    limit_summary(status)
                )?;
            }
        }

        Ok(out)
    }
}

/// Text shown instead of a report while usage access is not granted.
pub fn permission_message(snapshot_dir: &Path) -> String {
    let dir = snapshot_dir.display().to_string();
    let mut out = String::new();
    let _ = writeln!(out, "{}", PERMISSION_TITLE);
    if let Some(notice) = missing_snapshot_notice(&dir) {
        let _ = writeln!(out, "{}", notice);
    }
    for step in grant_steps(&dir) {
        let _ = writeln!(out, "  {}", step);
    }
    out
}

/// Controls as pretty JSON, printed after `--set`.
pub fn controls_json(controls: &AppControls) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ControlsRecord::from(controls))?)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use chrono_tz::Tz;
    use focus_core::models::DailyUsage;
    use focus_data::analysis::ReportMetadata;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn summary(pkg: &str, name: &str, days: &[(u32, u64)]) -> AppUsageSummary {
        let daily_usage: Vec<DailyUsage> = days
            .iter()
            .map(|&(d, secs)| DailyUsage {
                date: NaiveDate::from_ymd_opt(2024, 6, d).unwrap(),
                duration_secs: secs,
            })
            .collect();
        AppUsageSummary {
            package_name: pkg.to_string(),
            app_name: name.to_string(),
            version_name: "Unknown version".to_string(),
            icon: None,
            first_install_time: "01/01/1970 00:00:00".to_string(),
            last_update_time: "01/01/1970 00:00:00".to_string(),
            last_used_time: "15/06/2024 11:00:00".to_string(),
            last_used: None,
            total_secs: daily_usage.iter().map(|d| d.duration_secs).sum(),
            daily_usage,
        }
    }

    fn report() -> UsageReport {
        UsageReport {
            summaries: vec![
                summary("com.a", "Atlas", &[(14, 600)]),
                summary("com.b", "Books", &[(13, 3600), (15, 7200)]),
                summary("com.c", "Camera", &[]),
            ],
            metadata: ReportMetadata {
                generated_at: now(),
                window_days: 7,
                apps_listed: 3,
                intervals_loaded: 3,
                source_error: None,
            },
        }
    }

    fn with_printer<T>(app: Option<&str>, f: impl FnOnce(&ReportPrinter, &TempDir) -> T) -> T {
        let tmp = TempDir::new().unwrap();
        let controls = ControlStore::open(tmp.path().join("controls.json"));
        let icons = IconCatalog::default();
        let report = report();
        let printer = ReportPrinter {
            report: &report,
            icons: &icons,
            controls: &controls,
            timezone: TimezoneHandler::from_tz(Tz::UTC),
            top_n: 2,
            app,
            now: now(),
        };
        f(&printer, &tmp)
    }

    #[test]
    fn test_json_apps_uses_camel_case_keys() {
        let json = with_printer(None, |p, _| p.json(ViewMode::Apps).unwrap());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let books = &value[1];
        assert_eq!(books["packageName"], "com.b");
        assert_eq!(books["versionName"], "Unknown version");
        assert_eq!(books["formattedTotalUsage"], "03:00:00");
        assert_eq!(
            books["formattedHoursUsedByDay"],
            serde_json::json!(["13/06/2024 - 01:00:00", "15/06/2024 - 02:00:00"])
        );
        assert_eq!(value.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_json_top_is_limited_and_ordered() {
        let json = with_printer(None, |p, _| p.json(ViewMode::Top).unwrap());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let names: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["appName"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Books", "Atlas"]);
    }

    #[test]
    fn test_json_detail_includes_controls() {
        let json = with_printer(Some("com.a"), |p, _| p.json(ViewMode::Detail).unwrap());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["appName"], "Atlas");
        assert_eq!(value["controls"]["autoLock"], false);
        assert_eq!(value["controls"]["dailyLimit"], "");
    }

    #[test]
    fn test_detail_requires_tracked_app() {
        with_printer(None, |p, _| assert!(p.plain(ViewMode::Detail).is_err()));
        with_printer(Some("com.zzz"), |p, _| {
            let err = p.json(ViewMode::Detail).unwrap_err();
            assert!(err.to_string().contains("com.zzz"));
        });
    }

    #[test]
    fn test_plain_top() {
        let text = with_printer(None, |p, _| p.plain(ViewMode::Top).unwrap());
        assert!(text.starts_with("Today: 2.0 h of 24 h (8%)"));
        assert!(text.contains("Top 2 most used - last 7 days"));
        assert!(text.contains("Books"));
        assert!(!text.contains("Camera"));
    }

    #[test]
    fn test_plain_apps_lists_every_app() {
        let text = with_printer(None, |p, _| p.plain(ViewMode::Apps).unwrap());
        assert!(text.contains("Installed apps (3) - last 7 days - UTC"));
        assert!(text.contains("Camera"));
        assert!(text.contains("default"));
    }

    #[test]
    fn test_plain_detail() {
        let text = with_printer(Some("com.b"), |p, _| p.plain(ViewMode::Detail).unwrap());
        assert!(text.contains("Books (com.b)"));
        assert!(text.contains("15/06/2024 - 02:00:00"));
        assert!(text.contains("[ ] Auto-lock"));
        assert!(text.contains("Daily limit (min): - (no limit)"));
    }

    #[test]
    fn test_controls_json() {
        let controls = AppControls {
            focus_mode: true,
            daily_limit: "45".to_string(),
            ..AppControls::default()
        };
        let value: serde_json::Value =
            serde_json::from_str(&controls_json(&controls).unwrap()).unwrap();
        assert_eq!(value["silentNotif"], true);
        assert_eq!(value["dailyLimit"], "45");
    }

    #[test]
    fn test_permission_message_names_snapshot_and_access_file() {
        let tmp = TempDir::new().unwrap();
        let text = permission_message(tmp.path());
        assert!(text.starts_with("Usage access required"));
        assert!(text.contains(&tmp.path().display().to_string()));
        assert!(text.contains("usage_access.json"));
        assert!(!text.contains("Snapshot directory not found"));
    }

    #[test]
    fn test_permission_message_flags_missing_snapshot_dir() {
        let text = permission_message(Path::new("/nonexistent/focus-snap"));
        assert!(text.contains("Snapshot directory not found: /nonexistent/focus-snap"));
    }
}
