//! Gate screen shown while usage access is not granted.

use std::path::Path;

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use focus_data::reader::USAGE_ACCESS_FILE;

use crate::themes::Theme;

pub const PERMISSION_TITLE: &str = "Usage access required";

/// Steps to grant access, shared by the gate screen and text output.
pub fn grant_steps(snapshot_dir: &str) -> [String; 3] {
    [
        "1. On the device open Settings > Apps > Special app access > Usage access.".to_string(),
        "2. Enable access for focus360 and export a new snapshot.".to_string(),
        format!(
            "3. Copy it to {} ({} must contain {{\"granted\": true}}).",
            snapshot_dir, USAGE_ACCESS_FILE
        ),
    ]
}

/// Warning line when `snapshot_dir` does not exist, so a wrong
/// `--snapshot-dir` is not mistaken for missing access.
pub fn missing_snapshot_notice(snapshot_dir: &str) -> Option<String> {
    if Path::new(snapshot_dir).is_dir() {
        None
    } else {
        Some(format!("Snapshot directory not found: {}", snapshot_dir))
    }
}

pub fn render_permission_view(frame: &mut Frame, area: Rect, snapshot_dir: &str, theme: &Theme) {
    let mut text = vec![
        Line::from(""),
        Line::from(Span::styled(PERMISSION_TITLE, theme.warning)),
        Line::from(""),
    ];
    if let Some(notice) = missing_snapshot_notice(snapshot_dir) {
        text.push(Line::from(Span::styled(notice, theme.error)));
        text.push(Line::from(""));
    }
    text.push(Line::from(Span::styled(
        "focus360 needs permission to read app usage statistics.",
        theme.text,
    )));
    text.push(Line::from(""));
    for step in grant_steps(snapshot_dir) {
        text.push(Line::from(Span::styled(step, theme.label)));
    }
    text.push(Line::from(""));
    text.push(Line::from(Span::styled(
        "Access is checked again on every refresh. Press 'r' to check now, 'q' to quit.",
        theme.dim,
    )));

    frame.render_widget(
        Paragraph::new(Text::from(text))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.table_border)
                    .title(" Permission "),
            ),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tempfile::TempDir;

    fn rendered(snapshot_dir: &str) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 18)).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| render_permission_view(frame, frame.area(), snapshot_dir, &theme))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_render_permission_view() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().display().to_string();
        let text = rendered(&dir);
        assert!(text.contains("Usage access required"));
        assert!(text.contains(USAGE_ACCESS_FILE));
        assert!(!text.contains("Snapshot directory not found"));
    }

    #[test]
    fn test_missing_snapshot_dir_is_called_out() {
        let text = rendered("/nonexistent/focus-snap");
        assert!(text.contains("Snapshot directory not found"));
        assert!(text.contains("/nonexistent/focus-snap"));
    }

    #[test]
    fn test_grant_steps_name_directory_and_file() {
        let steps = grant_steps("/data/snap");
        assert!(steps[2].contains("/data/snap"));
        assert!(steps[2].contains("usage_access.json"));
    }
}
