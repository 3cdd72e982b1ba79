//! List transforms over aggregated summaries: most-used ranking and the app
//! list with resolved icons.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use focus_core::models::AppUsageSummary;
use regex::Regex;
use tracing::{debug, warn};

/// Icon key used when an app has no icon of its own.
pub const PLACEHOLDER_ICON: &str = "default";

const ICON_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "svg"];

// ── Ranking ───────────────────────────────────────────────────────────────────

/// The `n` apps with the most usage in the window, heaviest first.
///
/// Ties are broken by app name so the order is stable between refreshes.
pub fn top_by_usage(summaries: &[AppUsageSummary], n: usize) -> Vec<&AppUsageSummary> {
    let mut ranked: Vec<&AppUsageSummary> = summaries.iter().collect();
    ranked.sort_by(|a, b| {
        b.total_secs
            .cmp(&a.total_secs)
            .then_with(|| a.app_name.cmp(&b.app_name))
    });
    ranked.truncate(n);
    ranked
}

// ── Icons ─────────────────────────────────────────────────────────────────────

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("regex is valid"))
}

/// Icon lookup key for a display name: lowercase with all whitespace removed.
///
/// ```
/// use focus_data::ranking::normalize_app_name;
///
/// assert_eq!(normalize_app_name("Google Maps"), "googlemaps");
/// assert_eq!(normalize_app_name(" Tik\tTok "), "tiktok");
/// ```
pub fn normalize_app_name(name: &str) -> String {
    whitespace_re().replace_all(&name.to_lowercase(), "").into_owned()
}

/// Icon files keyed by normalized app name.
#[derive(Debug, Clone, Default)]
pub struct IconCatalog {
    icons: HashMap<String, PathBuf>,
}

impl IconCatalog {
    /// Scan `dir` recursively for image files.
    ///
    /// The file stem is the key, normalized like an app name, so
    /// `Google Maps.png` and `googlemaps.png` both match "Google Maps".
    /// When two files share a key the first in path order wins.
    pub fn scan(dir: &Path) -> Self {
        if !dir.exists() {
            warn!("Icon directory does not exist: {}", dir.display());
            return Self::default();
        }

        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ICON_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();

        let mut icons = HashMap::new();
        for path in files {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                icons.entry(normalize_app_name(stem)).or_insert(path);
            }
        }

        debug!(count = icons.len(), "icon catalog built from {}", dir.display());
        Self { icons }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, PathBuf)>) -> Self {
        Self {
            icons: entries
                .into_iter()
                .map(|(k, v)| (normalize_app_name(&k), v))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// Icon for `app_name`, falling back to the placeholder icon.
    pub fn resolve(&self, app_name: &str) -> IconRef {
        let key = normalize_app_name(app_name);
        if let Some(path) = self.icons.get(&key) {
            return IconRef::File(path.clone());
        }
        match self.icons.get(PLACEHOLDER_ICON) {
            Some(path) => IconRef::Placeholder(Some(path.clone())),
            None => IconRef::Placeholder(None),
        }
    }
}

/// Where an app's icon comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconRef {
    /// A matching icon file.
    File(PathBuf),
    /// No match; the placeholder file, if the catalog has one.
    Placeholder(Option<PathBuf>),
}

impl IconRef {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, IconRef::Placeholder(_))
    }

    /// Short label for text output: the icon's file name or `"default"`.
    pub fn label(&self) -> String {
        match self {
            IconRef::File(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| PLACEHOLDER_ICON.to_string()),
            IconRef::Placeholder(_) => PLACEHOLDER_ICON.to_string(),
        }
    }
}

// ── App list ──────────────────────────────────────────────────────────────────

/// One row of the installed-app list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppListItem {
    pub package_name: String,
    pub app_name: String,
    pub icon: IconRef,
    pub total_secs: u64,
}

/// Join summaries with their icons, keeping summary order.
pub fn app_list_with_icons(
    summaries: &[AppUsageSummary],
    catalog: &IconCatalog,
) -> Vec<AppListItem> {
    summaries
        .iter()
        .map(|s| AppListItem {
            package_name: s.package_name.clone(),
            app_name: s.app_name.clone(),
            icon: catalog.resolve(&s.app_name),
            total_secs: s.total_secs,
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
