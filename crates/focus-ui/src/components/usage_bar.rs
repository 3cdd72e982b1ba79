use crate::themes::Theme;
use focus_core::calculations::{usage_progress, HOURS_PER_DAY};
use focus_core::formatting::{format_compact, format_hours};
use ratatui::style::Style;
use ratatui::text::{Line, Span};

/// Visual parameters of a horizontal bar.
#[derive(Debug, Clone, Copy)]
pub struct BarConfig {
    /// Columns taken by the bar itself, label excluded.
    pub width: u16,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            width: 30,
            filled_char: '\u{2588}', // █
            empty_char: '\u{2591}',  // ░
        }
    }
}

impl BarConfig {
    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    /// Filled and empty cell counts for a fraction in `[0, 1]`.
    fn split(&self, fraction: f64) -> (usize, usize) {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let filled = (fraction * f64::from(self.width)).round() as usize;
        let width = usize::from(self.width);
        (filled.min(width), width.saturating_sub(filled))
    }
}

fn bar_spans<'a>(config: &BarConfig, fraction: f64, fill: Style, theme: &Theme) -> Vec<Span<'a>> {
    let (filled, empty) = config.split(fraction);
    vec![
        Span::styled(
            std::iter::repeat(config.filled_char).take(filled).collect::<String>(),
            fill,
        ),
        Span::styled(
            std::iter::repeat(config.empty_char).take(empty).collect::<String>(),
            theme.progress_empty,
        ),
    ]
}

// ── UsageBar ─────────────────────────────────────────────────────────────────

/// An app's window usage relative to the heaviest app in the list.
pub struct UsageBar<'a> {
    pub secs: u64,
    /// Usage of the heaviest app; the bar is full at this value.
    pub max_secs: u64,
    pub theme: &'a Theme,
    pub config: BarConfig,
}

impl<'a> UsageBar<'a> {
    pub fn new(secs: u64, max_secs: u64, theme: &'a Theme) -> Self {
        Self {
            secs,
            max_secs,
            theme,
            config: BarConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BarConfig) -> Self {
        self.config = config;
        self
    }

    pub fn fraction(&self) -> f64 {
        if self.max_secs == 0 {
            0.0
        } else {
            self.secs as f64 / self.max_secs as f64
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let mut spans = bar_spans(&self.config, self.fraction(), self.theme.info, self.theme);
        spans.push(Span::styled(
            format!(" {}", format_compact(self.secs)),
            self.theme.progress_label,
        ));
        Line::from(spans)
    }
}

// ── DayGauge ─────────────────────────────────────────────────────────────────

/// Hours used today against the 24 hour day.
pub struct DayGauge<'a> {
    pub hours_used: f64,
    pub theme: &'a Theme,
    pub config: BarConfig,
}

impl<'a> DayGauge<'a> {
    pub fn new(hours_used: f64, theme: &'a Theme) -> Self {
        Self {
            hours_used,
            theme,
            config: BarConfig::default(),
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let progress = usage_progress(self.hours_used);
        let fill = self.theme.progress_style(progress * 100.0);
        let mut spans = bar_spans(&self.config, progress, fill, self.theme);
        spans.push(Span::styled(
            format!(
                " {} of {:.0} h",
                format_hours(self.hours_used.max(0.0)),
                HOURS_PER_DAY
            ),
            self.theme.progress_label,
        ));
        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn count(line: &Line, ch: char) -> usize {
        line.spans
            .iter()
            .map(|s| s.content.chars().filter(|c| *c == ch).count())
            .sum()
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_usage_bar_half() {
        let theme = Theme::dark();
        let bar =
            UsageBar::new(1800, 3600, &theme).with_config(BarConfig::default().with_width(10));
        let line = bar.to_line();
        assert_eq!(count(&line, '█'), 5);
        assert_eq!(count(&line, '░'), 5);
        assert!(text(&line).ends_with(" 30m"));
    }

    #[test]
    fn test_usage_bar_zero_max() {
        let theme = Theme::dark();
        let bar = UsageBar::new(0, 0, &theme);
        assert_eq!(bar.fraction(), 0.0);
        assert_eq!(count(&bar.to_line(), '█'), 0);
    }

    #[test]
    fn test_day_gauge_label_and_fill() {
        let theme = Theme::dark();
        let mut gauge = DayGauge::new(6.0, &theme);
        gauge.config = gauge.config.with_width(24);
        let line = gauge.to_line();
        assert_eq!(count(&line, '█'), 6);
        assert!(text(&line).ends_with(" 6.0 h of 24 h"));
    }

    #[test]
    fn test_day_gauge_clamps_over_a_day() {
        let theme = Theme::dark();
        let mut gauge = DayGauge::new(30.0, &theme);
        gauge.config = gauge.config.with_width(12);
        let line = gauge.to_line();
        assert_eq!(count(&line, '█'), 12);
        assert_eq!(count(&line, '░'), 0);
    }

    #[test]
    fn test_bar_split_nan() {
        assert_eq!(BarConfig::default().with_width(8).split(f64::NAN), (0, 8));
    }
}
