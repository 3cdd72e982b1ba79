use crate::themes::Theme;
use ratatui::text::{Line, Span};

pub const TITLE: &str = "FOCUS360 SCREEN TIME";

/// Three-line dashboard header: title, separator, then
/// `[ timezone | last N days ]`.
pub struct Header<'a> {
    pub timezone: &'a str,
    pub window_days: i64,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(timezone: &'a str, window_days: i64, theme: &'a Theme) -> Self {
        Self {
            timezone,
            window_days,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let window = if self.window_days == 1 {
            "last day".to_string()
        } else {
            format!("last {} days", self.window_days)
        };

        vec![
            Line::from(vec![
                Span::styled("◉ ", self.theme.header_accent),
                Span::styled(TITLE, self.theme.header),
                Span::styled(" ◉", self.theme.header_accent),
            ]),
            Line::from(Span::styled("─".repeat(48), self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.timezone.to_string(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(window, self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
        ]
    }
}
