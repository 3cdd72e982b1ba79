//! Single-app screen: metadata, per-day usage and the app's controls.

use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use focus_core::calculations::{daily_limit_status, usage_on, LimitStatus};
use focus_core::formatting::{format_compact, format_duration};
use focus_core::models::AppUsageSummary;
use focus_data::controls::{AppControls, ControlKey};

use crate::components::usage_bar::{BarConfig, UsageBar};
use crate::themes::Theme;

/// Everything the detail screen shows.
pub struct DetailViewData<'a> {
    pub summary: &'a AppUsageSummary,
    pub controls: &'a AppControls,
    /// Local calendar date of "now", for the limit check.
    pub today: NaiveDate,
    /// Limit text being typed, `None` when not editing.
    pub limit_input: Option<&'a str>,
}

/// Human-readable limit state, e.g. `"25m left today"`.
pub fn limit_summary(status: LimitStatus) -> String {
    match status {
        LimitStatus::NoLimit => "no limit".to_string(),
        LimitStatus::Within { remaining_secs } => {
            format!("{} left today", format_compact(remaining_secs))
        }
        LimitStatus::Exceeded { over_secs } => {
            format!("exceeded by {}", format_compact(over_secs))
        }
    }
}

pub fn render_detail_view(frame: &mut Frame, area: Rect, data: &DetailViewData, theme: &Theme) {
    let [info_area, days_area] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(area);

    render_info(frame, info_area, data, theme);
    render_daily_usage(frame, days_area, data.summary, theme);
}

fn field<'a>(label: &'a str, value: String, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<14}", label), theme.label),
        Span::styled(value, theme.value),
    ])
}

fn render_info(frame: &mut Frame, area: Rect, data: &DetailViewData, theme: &Theme) {
    let s = data.summary;
    let used_today = usage_on(s, data.today);
    let status = daily_limit_status(used_today, data.controls.daily_limit_minutes());

    let mut lines = vec![
        field("Package", s.package_name.clone(), theme),
        field("Version", s.version_name.clone(), theme),
        field("Installed", s.first_install_time.clone(), theme),
        field("Updated", s.last_update_time.clone(), theme),
        field("Last used", s.last_used_time.clone(), theme),
        field("Total", s.formatted_total_usage(), theme),
        field("Today", format_duration(used_today), theme),
        Line::from(""),
        Line::from(Span::styled("Controls", theme.table_header)),
    ];

    for (i, key) in ControlKey::TOGGLES.iter().enumerate() {
        let on = data.controls.toggle(*key).unwrap_or(false);
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", i + 1), theme.dim),
            Span::styled(if on { "[x] " } else { "[ ] " }, theme.toggle_style(on)),
            Span::styled(format!("{:<14}", key.label()), theme.text),
            Span::styled(key.description(), theme.dim),
        ]));
    }

    let limit_line = match data.limit_input {
        Some(input) => Line::from(vec![
            Span::styled(" l ", theme.dim),
            Span::styled(format!("{}: ", ControlKey::DailyLimit.label()), theme.text),
            Span::styled(format!("{}_", input), theme.warning),
            Span::styled("  Enter to save, Esc to cancel", theme.dim),
        ]),
        None => {
            let value = if data.controls.daily_limit.is_empty() {
                "-".to_string()
            } else {
                data.controls.daily_limit.clone()
            };
            Line::from(vec![
                Span::styled(" l ", theme.dim),
                Span::styled(format!("{}: ", ControlKey::DailyLimit.label()), theme.text),
                Span::styled(value, theme.value),
                Span::styled(format!("  ({})", limit_summary(status)), theme.limit_style(status)),
            ])
        }
    };
    lines.push(limit_line);

    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.table_border)
                    .title(format!(" {} ", s.app_name)),
            ),
        area,
    );
}

fn render_daily_usage(frame: &mut Frame, area: Rect, summary: &AppUsageSummary, theme: &Theme) {
    let header = Row::new(
        ["Date", "Usage", ""]
            .into_iter()
            .map(|h| Cell::from(h).style(theme.table_header)),
    );

    let max_secs = summary
        .daily_usage
        .iter()
        .map(|d| d.duration_secs)
        .max()
        .unwrap_or(0);
    let bar_config = BarConfig::default().with_width(12);

    let rows: Vec<Row> = summary
        .daily_usage
        .iter()
        .map(|d| {
            Row::new(vec![
                Cell::from(d.formatted_date()),
                Cell::from(d.formatted_duration()),
                Cell::from(
                    UsageBar::new(d.duration_secs, max_secs, theme)
                        .with_config(bar_config)
                        .to_line(),
                ),
            ])
        })
        .collect();

    let title = if summary.has_usage() {
        " Daily usage "
    } else {
        " Daily usage (none in window) "
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(11),
            Constraint::Length(10),
            Constraint::Min(bar_config.width),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.table_border)
            .title(title),
    )
    .style(theme.text);

    frame.render_widget(table, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use focus_core::models::DailyUsage;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn summary() -> AppUsageSummary {
        AppUsageSummary {
            package_name: "com.example.chess".to_string(),
            app_name: "Chess".to_string(),
            version_name: "4.2.0".to_string(),
            icon: None,
            first_install_time: "01/01/2024 10:00:00".to_string(),
            last_update_time: "02/06/2024 08:30:00".to_string(),
            last_used_time: "14/06/2024 21:15:00".to_string(),
            last_used: None,
            daily_usage: vec![
                DailyUsage {
                    date: date(13),
                    duration_secs: 1200,
                },
                DailyUsage {
                    date: date(14),
                    duration_secs: 2700,
                },
            ],
            total_secs: 3900,
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_limit_summary() {
        assert_eq!(limit_summary(LimitStatus::NoLimit), "no limit");
        assert_eq!(
            limit_summary(LimitStatus::Within {
                remaining_secs: 1500
            }),
            "25m left today"
        );
        assert_eq!(
            limit_summary(LimitStatus::Exceeded { over_secs: 3900 }),
            "exceeded by 1h 5m"
        );
    }

    #[test]
    fn test_render_detail_view() {
        let mut terminal = Terminal::new(TestBackend::new(140, 24)).unwrap();
        let theme = Theme::dark();
        let s = summary();
        let controls = AppControls {
            auto_lock: true,
            daily_limit: "30".to_string(),
            ..AppControls::default()
        };
        let data = DetailViewData {
            summary: &s,
            controls: &controls,
            today: date(14),
            limit_input: None,
        };

        terminal
            .draw(|frame| render_detail_view(frame, frame.area(), &data, &theme))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Chess"));
        assert!(text.contains("4.2.0"));
        assert!(text.contains("[x] Auto-lock"));
        assert!(text.contains("[ ] Focus mode"));
        assert!(text.contains("13/06/2024"));
        assert!(text.contains("00:45:00"));
        assert!(text.contains("exceeded by 15m"));
    }

    #[test]
    fn test_render_detail_view_while_editing_limit() {
        let mut terminal = Terminal::new(TestBackend::new(140, 24)).unwrap();
        let theme = Theme::light();
        let s = summary();
        let controls = AppControls::default();
        let data = DetailViewData {
            summary: &s,
            controls: &controls,
            today: date(15),
            limit_input: Some("12"),
        };

        terminal
            .draw(|frame| render_detail_view(frame, frame.area(), &data, &theme))
            .unwrap();
        assert!(buffer_text(&terminal).contains("12_"));
    }
}
