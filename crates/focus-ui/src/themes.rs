use focus_core::calculations::LimitStatus;
use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Detect the terminal background from `COLORFGBG` (`"fg;bg"`).
///
/// Background values 0 to 6 are dark, 7 to 15 light. Anything else is treated as
/// dark.
pub fn detect_background() -> BackgroundType {
    background_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

fn background_from_colorfgbg(value: Option<&str>) -> BackgroundType {
    value
        .and_then(|v| v.split(';').next_back())
        .and_then(|bg| bg.parse::<u8>().ok())
        .map(|bg| {
            if bg <= 6 {
                BackgroundType::Dark
            } else {
                BackgroundType::Light
            }
        })
        .unwrap_or(BackgroundType::Dark)
}

/// Every style used by the focus360 views.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub header_accent: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    // ── Bars ─────────────────────────────────────────────────────────────────
    pub progress_low: Style,
    pub progress_medium: Style,
    pub progress_high: Style,
    pub progress_empty: Style,
    pub progress_label: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    pub table_total: Style,
    pub selected: Style,

    // ── Controls ─────────────────────────────────────────────────────────────
    pub toggle_on: Style,
    pub toggle_off: Style,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            progress_low: Style::default().fg(Color::Green),
            progress_medium: Style::default().fg(Color::Yellow),
            progress_high: Style::default().fg(Color::Red),
            progress_empty: Style::default().fg(Color::DarkGray),
            progress_label: Style::default().fg(Color::Gray),

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_total: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            selected: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),

            toggle_on: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            toggle_off: Style::default().fg(Color::DarkGray),
        }
    }

    /// Dark text with strong accents for light terminals.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            progress_low: Style::default().fg(Color::Green),
            progress_medium: Style::default().fg(Color::Yellow),
            progress_high: Style::default().fg(Color::Red),
            progress_empty: Style::default().fg(Color::Gray),
            progress_label: Style::default().fg(Color::DarkGray),

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::Gray),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
            table_total: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            selected: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),

            toggle_on: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            toggle_off: Style::default().fg(Color::Gray),
        }
    }

    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// Theme by name; unknown names and `"auto"` detect the background.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Bar fill for a percentage: below 50 low, below 80 medium, else high.
    pub fn progress_style(&self, percentage: f64) -> Style {
        if percentage >= 80.0 {
            self.progress_high
        } else if percentage >= 50.0 {
            self.progress_medium
        } else {
            self.progress_low
        }
    }

    pub fn limit_style(&self, status: LimitStatus) -> Style {
        match status {
            LimitStatus::NoLimit => self.dim,
            LimitStatus::Within { .. } => self.success,
            LimitStatus::Exceeded { .. } => self.error,
        }
    }

    pub fn toggle_style(&self, on: bool) -> Style {
        if on {
            self.toggle_on
        } else {
            self.toggle_off
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_theme_creation() {
        let t = Theme::dark();
        assert_eq!(t.header.fg, Some(Color::Cyan));
        assert_eq!(t.success.fg, Some(Color::Green));
        assert_eq!(t.selected.bg, Some(Color::Cyan));
    }

    #[test]
    fn test_light_theme_creation() {
        let t = Theme::light();
        assert_eq!(t.header.fg, Some(Color::Blue));
        assert_eq!(t.text.fg, Some(Color::Black));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Theme::from_name("dark").header.fg, Some(Color::Cyan));
        assert_eq!(Theme::from_name("light").header.fg, Some(Color::Blue));
        assert!(Theme::from_name("auto").header.fg.is_some());
    }

    #[test]
    fn test_background_from_colorfgbg() {
        assert_eq!(background_from_colorfgbg(Some("15;0")), BackgroundType::Dark);
        assert_eq!(background_from_colorfgbg(Some("0;15")), BackgroundType::Light);
        assert_eq!(background_from_colorfgbg(Some("0;default")), BackgroundType::Dark);
        assert_eq!(background_from_colorfgbg(None), BackgroundType::Dark);
    }

    #[test]
    fn test_progress_style_thresholds() {
        let t = Theme::dark();
        assert_eq!(t.progress_style(0.0).fg, Some(Color::Green));
        assert_eq!(t.progress_style(49.9).fg, Some(Color::Green));
        assert_eq!(t.progress_style(50.0).fg, Some(Color::Yellow));
        assert_eq!(t.progress_style(80.0).fg, Some(Color::Red));
    }

    #[test]
    fn test_limit_style() {
        let t = Theme::dark();
        assert_eq!(t.limit_style(LimitStatus::NoLimit).fg, Some(Color::DarkGray));
        assert_eq!(
            t.limit_style(LimitStatus::Within { remaining_secs: 60 }).fg,
            Some(Color::Green)
        );
        assert_eq!(
            t.limit_style(LimitStatus::Exceeded { over_secs: 1 }).fg,
            Some(Color::Red)
        );
    }
}
