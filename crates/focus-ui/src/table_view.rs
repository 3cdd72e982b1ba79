//! List views for the focus360 TUI: every tracked app with its icon, and the
//! most-used ranking with usage bars.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use focus_core::formatting;
use focus_core::models::AppUsageSummary;
use focus_data::ranking::AppListItem;

use crate::components::usage_bar::{BarConfig, DayGauge, UsageBar};
use crate::themes::Theme;

const NAME_WIDTH: usize = 24;

/// Cut `text` to at most `max_width` terminal columns, ending with `…` when
/// anything was dropped. Wide characters count double.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn row_style(theme: &Theme, index: usize) -> ratatui::style::Style {
    if index % 2 == 0 {
        theme.table_row
    } else {
        theme.table_row_alt
    }
}

fn table_state(selected: usize, len: usize) -> TableState {
    let selected = if len == 0 {
        None
    } else {
        Some(selected.min(len - 1))
    };
    TableState::default().with_selected(selected)
}

// ── Apps view ─────────────────────────────────────────────────────────────────

/// All tracked apps with icon and window total, in source order.
pub fn render_apps_table(
    frame: &mut Frame,
    area: Rect,
    items: &[AppListItem],
    selected: usize,
    window_days: i64,
    theme: &Theme,
) {
    let total_header = format!("Last {} days", window_days);
    let header = Row::new(
        ["#", "App", "Icon", "Package", total_header.as_str()]
            .into_iter()
            .map(|h| Cell::from(h.to_string()).style(theme.table_header)),
    )
    .height(1);

    let rows: Vec<Row> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let icon_style = if item.icon.is_placeholder() {
                theme.dim
            } else {
                theme.info
            };
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(truncate_to_width(&item.app_name, NAME_WIDTH)),
                Cell::from(Span::styled(
                    truncate_to_width(&item.icon.label(), 18),
                    icon_style,
                )),
                Cell::from(Span::styled(
                    truncate_to_width(&item.package_name, 36),
                    theme.dim,
                )),
                Cell::from(formatting::format_duration(item.total_secs)),
            ])
            .style(row_style(theme, i))
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(NAME_WIDTH as u16 + 1),
        Constraint::Length(19),
        Constraint::Min(20),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" Installed apps ({}) ", items.len())),
        )
        .style(theme.text)
        .row_highlight_style(theme.selected);

    let mut state = table_state(selected, items.len());
    frame.render_stateful_widget(table, area, &mut state);
}

// ── Top view ──────────────────────────────────────────────────────────────────

/// Today's usage gauge above the most-used ranking.
pub fn render_top_view(
    frame: &mut Frame,
    area: Rect,
    top: &[&AppUsageSummary],
    hours_today: f64,
    selected: usize,
    theme: &Theme,
) {
    let [gauge_area, list_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

    let gauge = DayGauge::new(hours_today, theme).to_line();
    frame.render_widget(
        Paragraph::new(gauge).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Today "),
        ),
        gauge_area,
    );

    let max_secs = top.first().map(|s| s.total_secs).unwrap_or(0);
    let header = Row::new(
        ["#", "App", "Usage", "Total"]
            .into_iter()
            .map(|h| Cell::from(h).style(theme.table_header)),
    )
    .height(1);

    let bar_config = BarConfig::default().with_width(24);
    let rows: Vec<Row> = top
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(truncate_to_width(&s.app_name, NAME_WIDTH)),
                Cell::from(
                    UsageBar::new(s.total_secs, max_secs, theme)
                        .with_config(bar_config)
                        .to_line(),
                ),
                Cell::from(s.formatted_total_usage()),
            ])
            .style(row_style(theme, i))
        })
        .collect();

    let total: u64 = top.iter().map(|s| s.total_secs).sum();
    let mut all_rows = rows;
    all_rows.push(
        Row::new(vec![
            Cell::from(""),
            Cell::from("TOTAL"),
            Cell::from(format!("{} apps", top.len())),
            Cell::from(formatting::format_duration(total)),
        ])
        .style(theme.table_total),
    );

    let widths = [
        Constraint::Length(4),
        Constraint::Length(NAME_WIDTH as u16 + 1),
        Constraint::Length(bar_config.width + 10),
        Constraint::Length(12),
    ];

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" Top {} most used ", top.len())),
        )
        .style(theme.text)
        .row_highlight_style(theme.selected);

    let mut state = table_state(selected, top.len());
    frame.render_stateful_widget(table, list_area, &mut state);
}

// ── Placeholders ──────────────────────────────────────────────────────────────

/// Shown before the first report arrives or when nothing is tracked.
pub fn render_no_data(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Export a fresh snapshot from the device and press 'r'.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" focus360 "),
        ),
        area,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use focus_data::ranking::IconRef;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::path::PathBuf;

    fn summary(name: &str, total_secs: u64) -> AppUsageSummary {
        AppUsageSummary {
            package_name: format!("com.example.{}", name.to_lowercase()),
            app_name: name.to_string(),
            version_name: "1.0".to_string(),
            icon: None,
            first_install_time: String::new(),
            last_update_time: String::new(),
            last_used_time: String::new(),
            last_used: None,
            daily_usage: Vec::new(),
            total_secs,
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
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("Maps", 10), "Maps");
        assert_eq!(truncate_to_width("Google Maps", 6), "Googl…");
        assert_eq!(truncate_to_width("日本語アプリ", 5), "日本…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    #[test]
    fn test_table_state_clamps_selection() {
        assert_eq!(table_state(9, 3).selected(), Some(2));
        assert_eq!(table_state(0, 0).selected(), None);
    }

    #[test]
    fn test_render_apps_table() {
        let mut terminal = Terminal::new(TestBackend::new(110, 12)).unwrap();
        let theme = Theme::dark();
        let items = vec![
            AppListItem {
                package_name: "com.spotify.music".to_string(),
                app_name: "Spotify".to_string(),
                icon: IconRef::File(PathBuf::from("/icons/spotify.png")),
                total_secs: 5400,
            },
            AppListItem {
                package_name: "com.duolingo".to_string(),
                app_name: "Duolingo".to_string(),
                icon: IconRef::Placeholder(None),
                total_secs: 0,
            },
        ];

        terminal
            .draw(|frame| render_apps_table(frame, frame.area(), &items, 1, 7, &theme))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Installed apps (2)"));
        assert!(text.contains("spotify.png"));
        assert!(text.contains("01:30:00"));
        assert!(text.contains("default"));
    }

    #[test]
    fn test_render_top_view() {
        let mut terminal = Terminal::new(TestBackend::new(90, 14)).unwrap();
        let theme = Theme::light();
        let a = summary("YouTube", 7200);
        let b = summary("Chrome", 3600);
        let top = vec![&a, &b];

        terminal
            .draw(|frame| render_top_view(frame, frame.area(), &top, 3.0, 0, &theme))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Top 2 most used"));
        assert!(text.contains("YouTube"));
        assert!(text.contains("03:00:00"));
        assert!(text.contains("3.0 h of 24 h"));
    }

    #[test]
    fn test_render_top_view_empty_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| render_top_view(frame, frame.area(), &[], 0.0, 0, &theme))
            .unwrap();
    }

    #[test]
    fn test_render_no_data() {
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| render_no_data(frame, frame.area(), "No apps tracked", &theme))
            .unwrap();
        assert!(buffer_text(&terminal).contains("No apps tracked"));
    }
}
