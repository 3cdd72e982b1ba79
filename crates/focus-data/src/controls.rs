//! Per-app behavioural controls and the key/value file that stores them.
//!
//! Every value lives under `{package}:{setting}`. Toggles are stored as JSON
//! text (`"true"` / `"false"`), the daily limit verbatim as a digit string.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use focus_core::error::{FocusError, Result};
use regex::Regex;
use tracing::{debug, warn};

/// Longest accepted daily-limit input, in characters.
pub const DAILY_LIMIT_MAX_LEN: usize = 4;

// ── ControlKey ────────────────────────────────────────────────────────────────

/// The settings an app can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKey {
    AutoLock,
    FocusMode,
    SmartAlerts,
    ForcedBreak,
    DailyLimit,
}

impl ControlKey {
    pub const ALL: [ControlKey; 5] = [
        ControlKey::AutoLock,
        ControlKey::FocusMode,
        ControlKey::SmartAlerts,
        ControlKey::ForcedBreak,
        ControlKey::DailyLimit,
    ];

    pub const TOGGLES: [ControlKey; 4] = [
        ControlKey::AutoLock,
        ControlKey::FocusMode,
        ControlKey::SmartAlerts,
        ControlKey::ForcedBreak,
    ];

    /// Suffix used in the store key.
    pub fn storage_name(self) -> &'static str {
        match self {
            ControlKey::AutoLock => "autoLock",
            ControlKey::FocusMode => "silentNotif",
            ControlKey::SmartAlerts => "hideLauncher",
            ControlKey::ForcedBreak => "pauseBg",
            ControlKey::DailyLimit => "dailyLimit",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ControlKey::AutoLock => "Auto-lock",
            ControlKey::FocusMode => "Focus mode",
            ControlKey::SmartAlerts => "Smart alerts",
            ControlKey::ForcedBreak => "Forced break",
            ControlKey::DailyLimit => "Daily limit (min)",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ControlKey::AutoLock => "Lock the app automatically after inactivity.",
            ControlKey::FocusMode => "Silence this app's notifications.",
            ControlKey::SmartAlerts => "Warn when usage looks excessive.",
            ControlKey::ForcedBreak => "Enforce a pause after heavy use.",
            ControlKey::DailyLimit => "Maximum minutes of use per day.",
        }
    }

    pub fn is_toggle(self) -> bool {
        !matches!(self, ControlKey::DailyLimit)
    }

    /// Full store key for `package`.
    pub fn store_key(self, package: &str) -> String {
        format!("{}:{}", package, self.storage_name())
    }
}

impl fmt::Display for ControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_name())
    }
}

impl FromStr for ControlKey {
    type Err = FocusError;

    /// Accepts the storage names and kebab-case aliases such as `focus-mode`.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let key = match lower.as_str() {
            "autolock" | "auto-lock" => ControlKey::AutoLock,
            "silentnotif" | "focus-mode" | "focusmode" => ControlKey::FocusMode,
            "hidelauncher" | "smart-alerts" | "smartalerts" => ControlKey::SmartAlerts,
            "pausebg" | "forced-break" | "forcedbreak" => ControlKey::ForcedBreak,
            "dailylimit" | "daily-limit" => ControlKey::DailyLimit,
            _ => {
                return Err(FocusError::InvalidSetting(format!(
                    "unknown control '{}'",
                    s.trim()
                )))
            }
        };
        Ok(key)
    }
}

// ── AppControls ───────────────────────────────────────────────────────────────

/// All controls of one app, with defaults for anything never saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppControls {
    pub auto_lock: bool,
    pub focus_mode: bool,
    pub smart_alerts: bool,
    pub forced_break: bool,
    /// Digits only, at most [`DAILY_LIMIT_MAX_LEN`] characters; empty when unset.
    pub daily_limit: String,
}

impl AppControls {
    pub fn toggle(&self, key: ControlKey) -> Option<bool> {
        match key {
            ControlKey::AutoLock => Some(self.auto_lock),
            ControlKey::FocusMode => Some(self.focus_mode),
            ControlKey::SmartAlerts => Some(self.smart_alerts),
            ControlKey::ForcedBreak => Some(self.forced_break),
            ControlKey::DailyLimit => None,
        }
    }

    fn toggle_mut(&mut self, key: ControlKey) -> Option<&mut bool> {
        match key {
            ControlKey::AutoLock => Some(&mut self.auto_lock),
            ControlKey::FocusMode => Some(&mut self.focus_mode),
            ControlKey::SmartAlerts => Some(&mut self.smart_alerts),
            ControlKey::ForcedBreak => Some(&mut self.forced_break),
            ControlKey::DailyLimit => None,
        }
    }

    /// The daily limit in minutes, `None` when empty.
    pub fn daily_limit_minutes(&self) -> Option<u32> {
        if self.daily_limit.is_empty() {
            None
        } else {
            self.daily_limit.parse().ok()
        }
    }
}

// ── Input helpers ─────────────────────────────────────────────────────────────

fn non_digit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^0-9]").expect("regex is valid"))
}

/// Keep only ASCII digits and cap the length at [`DAILY_LIMIT_MAX_LEN`].
///
/// ```
/// use focus_data::controls::sanitize_daily_limit;
///
/// assert_eq!(sanitize_daily_limit("1h 30"), "130");
/// assert_eq!(sanitize_daily_limit("123456"), "1234");
/// assert_eq!(sanitize_daily_limit("abc"), "");
/// ```
pub fn sanitize_daily_limit(text: &str) -> String {
    non_digit_re()
        .replace_all(text, "")
        .chars()
        .take(DAILY_LIMIT_MAX_LEN)
        .collect()
}

fn parse_toggle(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

// ── ControlStore ──────────────────────────────────────────────────────────────

/// String key/value store persisted as one JSON object.
///
/// Writes go straight to disk (temp file then rename).
#[derive(Debug, Clone)]
pub struct ControlStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl ControlStore {
    /// `~/.focus360/controls.json`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".focus360")
            .join("controls.json")
    }

    /// Open the store at `path`. A missing or unreadable file opens empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(error = %e, "controls file {} is corrupt; starting empty", path.display());
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        debug!(entries = values.len(), "opened controls store {}", path.display());
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        self.values.insert(key.into(), value.into());
        self.persist()
    }

    pub fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    /// Load a toggle; absent or unparseable values give `default`.
    pub fn load_bool(&self, package: &str, key: ControlKey, default: bool) -> bool {
        let full = key.store_key(package);
        match self.get(&full) {
            None => default,
            Some(raw) => serde_json::from_str::<bool>(raw).unwrap_or_else(|_| {
                warn!("ignoring non-boolean value {:?} stored under {}", raw, full);
                default
            }),
        }
    }

    pub fn load_string(&self, package: &str, key: ControlKey, default: &str) -> String {
        self.get(&key.store_key(package))
            .unwrap_or(default)
            .to_string()
    }

    pub fn save_bool(&mut self, package: &str, key: ControlKey, value: bool) -> Result<()> {
        let json = serde_json::to_string(&value)?;
        self.set(key.store_key(package), json)
    }

    pub fn save_string(&mut self, package: &str, key: ControlKey, value: &str) -> Result<()> {
        self.set(key.store_key(package), value)
    }

    pub fn load_controls(&self, package: &str) -> AppControls {
        AppControls {
            auto_lock: self.load_bool(package, ControlKey::AutoLock, false),
            focus_mode: self.load_bool(package, ControlKey::FocusMode, false),
            smart_alerts: self.load_bool(package, ControlKey::SmartAlerts, false),
            forced_break: self.load_bool(package, ControlKey::ForcedBreak, false),
            daily_limit: self.load_string(package, ControlKey::DailyLimit, ""),
        }
    }

    pub fn save_controls(&mut self, package: &str, controls: &AppControls) -> Result<()> {
        for key in ControlKey::TOGGLES {
            let value = controls.toggle(key).unwrap_or(false);
            self.values
                .insert(key.store_key(package), serde_json::to_string(&value)?);
        }
        self.values.insert(
            ControlKey::DailyLimit.store_key(package),
            sanitize_daily_limit(&controls.daily_limit),
        );
        self.persist()
    }

    /// Flip a toggle and return its new value.
    pub fn toggle(&mut self, package: &str, key: ControlKey) -> Result<bool> {
        let mut controls = self.load_controls(package);
        let slot = controls.toggle_mut(key).ok_or_else(|| {
            FocusError::InvalidSetting(format!("'{}' is not a toggle", key))
        })?;
        *slot = !*slot;
        let value = *slot;
        self.save_bool(package, key, value)?;
        Ok(value)
    }

    /// Apply a `KEY=VALUE` assignment for `package`.
    ///
    /// Toggles accept `true/false`, `on/off`, `yes/no` and `1/0`. The daily
    /// limit is sanitized to digits.
    pub fn apply_assignment(&mut self, package: &str, assignment: &str) -> Result<ControlKey> {
        let (raw_key, raw_value) = assignment.split_once('=').ok_or_else(|| {
            FocusError::InvalidSetting(format!("expected KEY=VALUE, got '{}'", assignment))
        })?;
        let key: ControlKey = raw_key.parse()?;

        if key.is_toggle() {
            let value = parse_toggle(raw_value).ok_or_else(|| {
                FocusError::InvalidSetting(format!(
                    "'{}' expects true or false, got '{}'",
                    key,
                    raw_value.trim()
                ))
            })?;
            self.save_bool(package, key, value)?;
        } else {
            self.save_string(package, key, &sanitize_daily_limit(raw_value))?;
        }
        debug!(package, %key, "control updated");
        Ok(key)
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
