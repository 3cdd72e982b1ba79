//! Which installed apps are worth reporting on.

use std::collections::HashSet;

use crate::models::InstalledApp;

/// Packages that are never reported, whatever their flags say.
pub const DEFAULT_EXCLUDED_PACKAGES: &[&str] = &[
    "com.google.android.safetycore",
    "com.google.android.contactkeys",
];

/// The default denylist as an owned set.
pub fn default_excluded_packages() -> HashSet<String> {
    DEFAULT_EXCLUDED_PACKAGES
        .iter()
        .map(|p| p.to_string())
        .collect()
}

/// `true` when `app` is user-installed and not denylisted.
///
/// Looks only at the descriptor; usage data plays no part.
pub fn is_tracked_app(app: &InstalledApp, excluded: &HashSet<String>) -> bool {
    !app.flags.is_system()
        && !app.flags.is_updated_system_app()
        && !excluded.contains(&app.package_name)
}
