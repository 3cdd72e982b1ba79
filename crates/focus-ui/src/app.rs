//! Main application state and TUI event loop for focus360.
//!
//! [`App`] owns the theme, the current view, the last received report and the
//! per-app control store. Reports arrive from the refresh orchestrator over a
//! channel; key presses are translated by [`App::handle_key`].

use std::io;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use tokio::sync::mpsc;

use focus_core::calculations::hours_used_on;
use focus_core::models::AppUsageSummary;
use focus_core::time_utils::TimezoneHandler;
use focus_data::analysis::UsageReport;
use focus_data::controls::{sanitize_daily_limit, ControlKey, ControlStore, DAILY_LIMIT_MAX_LEN};
use focus_data::ranking::{app_list_with_icons, top_by_usage, IconCatalog};
use focus_runtime::orchestrator::{RefreshHandle, RefreshUpdate};

use crate::components::header::Header;
use crate::detail_view::{self, DetailViewData};
use crate::permission_view;
use crate::table_view;
use crate::themes::Theme;

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which screen the TUI is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Every tracked app with icon and window total.
    Apps,
    /// Most-used ranking and today's gauge.
    Top,
    /// One app's usage and controls.
    Detail,
}

impl ViewMode {
    /// `"apps"`, `"top"` or `"detail"`; anything else is `Top`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "apps" => ViewMode::Apps,
            "detail" => ViewMode::Detail,
            _ => ViewMode::Top,
        }
    }
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    None,
    Refresh,
    Quit,
}

/// Leave raw mode and the alternate screen.
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    pub theme: Theme,
    pub view_mode: ViewMode,
    /// List view to return to from the detail screen.
    list_view: ViewMode,
    pub timezone: TimezoneHandler,
    pub top_n: usize,
    pub window_days: i64,
    snapshot_dir: String,
    icons: IconCatalog,
    controls: ControlStore,
    /// Most recent report, `None` until the first one arrives.
    pub report: Option<UsageReport>,
    pub permission_required: bool,
    selected: usize,
    detail_package: Option<String>,
    /// Daily-limit text being typed in the detail view.
    limit_input: Option<String>,
    status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        theme_name: &str,
        view_mode: ViewMode,
        timezone: TimezoneHandler,
        top_n: usize,
        window_days: i64,
        controls: ControlStore,
    ) -> Self {
        let list_view = match view_mode {
            ViewMode::Apps => ViewMode::Apps,
            _ => ViewMode::Top,
        };
        Self {
            theme: Theme::from_name(theme_name),
            view_mode: if view_mode == ViewMode::Detail {
                list_view
            } else {
                view_mode
            },
            list_view,
            timezone,
            top_n: top_n.max(1),
            window_days,
            snapshot_dir: String::new(),
            icons: IconCatalog::default(),
            controls,
            report: None,
            permission_required: false,
            selected: 0,
            detail_package: None,
            limit_input: None,
            status: None,
            should_quit: false,
        }
    }

    pub fn with_icons(mut self, icons: IconCatalog) -> Self {
        self.icons = icons;
        self
    }

    pub fn with_snapshot_dir(mut self, dir: &Path) -> Self {
        self.snapshot_dir = dir.display().to_string();
        self
    }

    /// Start on the detail screen of `package`.
    pub fn with_detail(mut self, package: impl Into<String>) -> Self {
        self.detail_package = Some(package.into());
        self.view_mode = ViewMode::Detail;
        self
    }

    pub fn detail_package(&self) -> Option<&str> {
        self.detail_package.as_deref()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the TUI until `q` / Ctrl+C, consuming updates from `rx`.
    ///
    /// Keys are polled with a 250 ms timeout on the current thread; updates
    /// are drained with `try_recv` between polls.
    pub async fn run(
        mut self,
        mut rx: mpsc::Receiver<RefreshUpdate>,
        refresh: RefreshHandle,
    ) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        match self.handle_key(key) {
                            AppAction::Quit => break Ok(()),
                            AppAction::Refresh => refresh.request_refresh(),
                            AppAction::None => {}
                        }
                    }
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            loop {
                match rx.try_recv() {
                    Ok(update) => self.update_from_refresh(update),
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        self.should_quit = true;
                        break;
                    }
                }
            }

            if self.should_quit {
                break Ok(());
            }
        };

        refresh.abort();
        restore_terminal()?;
        terminal.show_cursor()?;

        result
    }

    // ── State updates ─────────────────────────────────────────────────────────

    pub fn update_from_refresh(&mut self, update: RefreshUpdate) {
        match update {
            RefreshUpdate::PermissionRequired { .. } => {
                self.permission_required = true;
                self.report = None;
                self.status = None;
            }
            RefreshUpdate::Report { report, error } => {
                self.permission_required = false;
                self.status = error.map(|e| format!("Last refresh failed: {}", e));
                self.report = Some(report);
                let len = self.visible_packages().len();
                if len > 0 && self.selected >= len {
                    self.selected = len - 1;
                }
            }
        }
    }

    /// Translate one key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return AppAction::Quit;
        }

        if self.limit_input.is_some() {
            self.handle_limit_key(key.code);
            return AppAction::None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
                AppAction::Quit
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.status = Some("Refreshing...".to_string());
                AppAction::Refresh
            }
            KeyCode::Tab => {
                self.list_view = match self.list_view {
                    ViewMode::Apps => ViewMode::Top,
                    _ => ViewMode::Apps,
                };
                self.view_mode = self.list_view;
                self.selected = 0;
                AppAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                AppAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.visible_packages().len();
                if self.selected + 1 < len {
                    self.selected += 1;
                }
                AppAction::None
            }
            KeyCode::Enter if self.view_mode != ViewMode::Detail => {
                let package = self
                    .visible_packages()
                    .get(self.selected)
                    .map(|p| p.to_string());
                if let Some(package) = package {
                    self.detail_package = Some(package);
                    self.view_mode = ViewMode::Detail;
                }
                AppAction::None
            }
            KeyCode::Esc if self.view_mode == ViewMode::Detail => {
                self.view_mode = self.list_view;
                AppAction::None
            }
            KeyCode::Char(c @ '1'..='4') if self.view_mode == ViewMode::Detail => {
                let index = c as usize - '1' as usize;
                self.toggle_control(ControlKey::TOGGLES[index]);
                AppAction::None
            }
            KeyCode::Char('l') if self.view_mode == ViewMode::Detail => {
                if let Some(package) = self.detail_package.as_deref() {
                    self.limit_input = Some(self.controls.load_controls(package).daily_limit);
                }
                AppAction::None
            }
            _ => AppAction::None,
        }
    }

    fn handle_limit_key(&mut self, code: KeyCode) {
        let Some(input) = self.limit_input.as_mut() else {
            return;
        };
        match code {
            KeyCode::Char(c) if c.is_ascii_digit() && input.len() < DAILY_LIMIT_MAX_LEN => {
                input.push(c);
            }
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Esc => {
                self.limit_input = None;
            }
            KeyCode::Enter => {
                let value = sanitize_daily_limit(input);
                self.limit_input = None;
                if let Some(package) = self.detail_package.clone() {
                    match self
                        .controls
                        .save_string(&package, ControlKey::DailyLimit, &value)
                    {
                        Ok(()) => {
                            tracing::info!(package = %package, limit = %value, "daily limit saved");
                            self.status = Some("Daily limit saved".to_string());
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "failed to save daily limit");
                            self.status = Some(format!("Could not save: {}", e));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn toggle_control(&mut self, key: ControlKey) {
        let Some(package) = self.detail_package.clone() else {
            return;
        };
        match self.controls.toggle(&package, key) {
            Ok(on) => {
                tracing::info!(package = %package, control = %key, on, "control toggled");
                self.status = Some(format!(
                    "{} {}",
                    key.label(),
                    if on { "enabled" } else { "disabled" }
                ));
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to toggle control");
                self.status = Some(format!("Could not save: {}", e));
            }
        }
    }

    /// Package names of the list currently on screen, in display order.
    fn visible_packages(&self) -> Vec<&str> {
        let Some(report) = self.report.as_ref() else {
            return Vec::new();
        };
        match self.list_view {
            ViewMode::Apps => report
                .summaries
                .iter()
                .map(|s| s.package_name.as_str())
                .collect(),
            _ => top_by_usage(&report.summaries, self.top_n)
                .into_iter()
                .map(|s| s.package_name.as_str())
                .collect(),
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let [header_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let tz_name = self.timezone.tz().name().to_string();
        frame.render_widget(
            Paragraph::new(Header::new(&tz_name, self.window_days, &self.theme).to_lines()),
            header_area,
        );

        self.render_body(frame, body_area);
        frame.render_widget(Paragraph::new(self.footer_line()), footer_area);
    }

    fn render_body(&self, frame: &mut Frame, area: Rect) {
        if self.permission_required {
            permission_view::render_permission_view(frame, area, &self.snapshot_dir, &self.theme);
            return;
        }
        let Some(report) = self.report.as_ref() else {
            table_view::render_no_data(frame, area, "Loading usage data...", &self.theme);
            return;
        };

        match self.view_mode {
            ViewMode::Apps => {
                if report.is_empty() {
                    table_view::render_no_data(frame, area, "No tracked apps found", &self.theme);
                } else {
                    let items = app_list_with_icons(&report.summaries, &self.icons);
                    table_view::render_apps_table(
                        frame,
                        area,
                        &items,
                        self.selected,
                        self.window_days,
                        &self.theme,
                    );
                }
            }
            ViewMode::Top => {
                let top: Vec<&AppUsageSummary> = top_by_usage(&report.summaries, self.top_n);
                let today = self.timezone.today(Utc::now());
                let hours = hours_used_on(&report.summaries, today);
                table_view::render_top_view(frame, area, &top, hours, self.selected, &self.theme);
            }
            ViewMode::Detail => {
                let found = self
                    .detail_package
                    .as_deref()
                    .and_then(|p| report.find(p));
                match found {
                    Some(summary) => {
                        let controls = self.controls.load_controls(&summary.package_name);
                        let data = DetailViewData {
                            summary,
                            controls: &controls,
                            today: self.timezone.today(Utc::now()),
                            limit_input: self.limit_input.as_deref(),
                        };
                        detail_view::render_detail_view(frame, area, &data, &self.theme);
                    }
                    None => {
                        let message = format!(
                            "App not tracked: {}",
                            self.detail_package.as_deref().unwrap_or("-")
                        );
                        table_view::render_no_data(frame, area, &message, &self.theme);
                    }
                }
            }
        }
    }

    fn footer_line(&self) -> Line<'_> {
        if let Some(status) = self.status.as_deref() {
            return Line::from(Span::styled(status.to_string(), self.theme.info));
        }
        let hints = match self.view_mode {
            ViewMode::Detail => "1-4 toggle  l limit  Esc back  r refresh  q quit",
            _ => "↑/↓ select  Enter details  Tab switch list  r refresh  q quit",
        };
        Line::from(Span::styled(hints, self.theme.dim))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
