use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Screen-time report and per-app controls for your installed apps
#[derive(Parser, Debug, Clone)]
#[command(
    name = "focus360",
    about = "Screen-time report and per-app controls for your installed apps",
    version
)]
pub struct Settings {
    /// View mode
    #[arg(long, default_value = "top", value_parser = ["apps", "top", "detail"])]
    pub view: String,

    /// Output mode
    #[arg(long, default_value = "tui", value_parser = ["tui", "plain", "json"])]
    pub output: String,

    /// Number of apps in the most-used ranking
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u16).range(1..=100))]
    pub top: u16,

    /// Trailing window in days (1-30)
    #[arg(long, default_value = "7", value_parser = clap::value_parser!(u32).range(1..=30))]
    pub window_days: u32,

    /// Timezone used to split usage into days (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Directory holding the exported device snapshot
    #[arg(long, env = "FOCUS360_SNAPSHOT_DIR")]
    pub snapshot_dir: Option<PathBuf>,

    /// Directory with app icon images
    #[arg(long)]
    pub icons_dir: Option<PathBuf>,

    /// Per-app controls file
    #[arg(long)]
    pub controls_file: Option<PathBuf>,

    /// Package name of the app to inspect or configure
    #[arg(long)]
    pub app: Option<String>,

    /// Change a control of --app, e.g. `autoLock=true` or `dailyLimit=90`
    #[arg(long = "set", value_name = "KEY=VALUE", requires = "app")]
    pub set: Vec<String>,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "auto"])]
    pub theme: String,

    /// Refresh rate in seconds (5-3600)
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u32).range(5..=3600))]
    pub refresh_rate: u32,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.focus360/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_dir: Option<PathBuf>,
}

impl LastUsedParams {
    /// `~/.focus360/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Same file under `base_dir` instead of the home directory.
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".focus360").join("last_used.json")
    }

    /// Read the default file; absent or corrupt files give empty params.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&Self::config_path())
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    pub fn clear() -> Result<(), std::io::Error> {
        Self::clear_at(&Self::config_path())
    }

    /// Remove the file at `path`; a missing file is not an error.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the command line, fill unset options from the last run and save
    /// the merged result for next time.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// [`Settings::load_with_last_used`] with explicit args and config file.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins. Output mode, --app and --set are per-invocation.
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "top") {
            if let Some(v) = last.top {
                settings.top = v;
            }
        }
        // NOTE: clap stores the arg id using the *field name* (underscores).
        if !is_arg_explicitly_set(&matches, "window_days") {
            if let Some(v) = last.window_days {
                settings.window_days = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "refresh_rate") {
            if let Some(v) = last.refresh_rate {
                settings.refresh_rate = v;
            }
        }
        if settings.snapshot_dir.is_none() {
            settings.snapshot_dir = last.snapshot_dir;
        }

        settings = Self::resolve_auto_values(settings);

        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// Turn `auto` into the system zone; `--debug` forces DEBUG logging.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = crate::time_utils::get_system_timezone();
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            view: Some(s.view.clone()),
            theme: Some(s.theme.clone()),
            timezone: Some(s.timezone.clone()),
            top: Some(s.top),
            window_days: Some(s.window_days),
            refresh_rate: Some(s.refresh_rate),
            snapshot_dir: s.snapshot_dir.clone(),
        }
    }
}

/// `true` only for values typed on the command line, not defaults or env.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            view: Some("apps".to_string()),
            theme: Some("dark".to_string()),
            timezone: Some("America/Bogota".to_string()),
            top: Some(10),
            window_days: Some(14),
            refresh_rate: Some(30),
            snapshot_dir: Some(PathBuf::from("/data/snap")),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.view, Some("apps".to_string()));
        assert_eq!(loaded.theme, Some("dark".to_string()));
        assert_eq!(loaded.timezone, Some("America/Bogota".to_string()));
        assert_eq!(loaded.top, Some(10));
        assert_eq!(loaded.window_days, Some(14));
        assert_eq!(loaded.refresh_rate, Some(30));
        assert_eq!(loaded.snapshot_dir, Some(PathBuf::from("/data/snap")));
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);

        let params = LastUsedParams {
            theme: Some("light".to_string()),
            ..Default::default()
        };
        params.save_to(&path).expect("save");
        assert!(path.exists());

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert!(LastUsedParams::load_from(&path).view.is_none());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();
        assert!(LastUsedParams::load_from(&path).view.is_none());
    }

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["focus360"]);

        assert_eq!(settings.view, "top");
        assert_eq!(settings.output, "tui");
        assert_eq!(settings.top, 5);
        assert_eq!(settings.window_days, 7);
        assert_eq!(settings.timezone, "auto");
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.refresh_rate, 60);
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.app.is_none());
        assert!(settings.set.is_empty());
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_cli_set_requires_app() {
        let res = Settings::try_parse_from(["focus360", "--set", "autoLock=true"]);
        assert!(res.is_err());

        let settings = Settings::parse_from([
            "focus360",
            "--app",
            "com.example.game",
            "--set",
            "autoLock=true",
            "--set",
            "dailyLimit=45",
        ]);
        assert_eq!(settings.app.as_deref(), Some("com.example.game"));
        assert_eq!(settings.set, vec!["autoLock=true", "dailyLimit=45"]);
    }

    #[test]
    fn test_settings_cli_window_range() {
        assert!(Settings::try_parse_from(["focus360", "--window-days", "0"]).is_err());
        assert!(Settings::try_parse_from(["focus360", "--window-days", "31"]).is_err());
        let s = Settings::parse_from(["focus360", "--window-days", "30"]);
        assert_eq!(s.window_days, 30);
    }

    #[test]
    fn test_load_with_last_used_merges_persisted_values() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let params = LastUsedParams {
            view: Some("apps".to_string()),
            timezone: Some("UTC".to_string()),
            top: Some(8),
            ..Default::default()
        };
        params.save_to(&config_path).expect("save");

        let settings = Settings::load_with_last_used_impl(vec!["focus360".into()], &config_path);
        assert_eq!(settings.view, "apps");
        assert_eq!(settings.timezone, "UTC");
        assert_eq!(settings.top, 8);
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let params = LastUsedParams {
            view: Some("apps".to_string()),
            timezone: Some("UTC".to_string()),
            ..Default::default()
        };
        params.save_to(&config_path).expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["focus360".into(), "--view".into(), "detail".into()],
            &config_path,
        );
        assert_eq!(settings.view, "detail");
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        LastUsedParams {
            theme: Some("dark".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        Settings::load_with_last_used_impl(
            vec!["focus360".into(), "--clear".into()],
            &config_path,
        );
        assert!(!config_path.exists());
    }

    #[test]
    fn test_load_with_last_used_resolves_auto_timezone_and_debug() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let settings = Settings::load_with_last_used_impl(
            vec!["focus360".into(), "--debug".into()],
            &config_path,
        );
        assert_ne!(settings.timezone, "auto");
        assert_eq!(settings.log_level, "DEBUG");
        assert!(config_path.exists(), "settings must be persisted after run");
    }
}
