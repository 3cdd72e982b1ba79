use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by focus360.
#[derive(Error, Debug)]
pub enum FocusError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The snapshot directory does not exist.
    #[error("Snapshot directory not found: {0}")]
    SnapshotNotFound(PathBuf),

    /// Usage access has not been granted to this tool.
    #[error("Usage access permission has not been granted")]
    PermissionDenied,

    /// The usage data source failed to answer a query.
    #[error("Usage data source unavailable: {0}")]
    SourceUnavailable(String),

    /// A per-app setting name or value was rejected.
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the focus crates.
pub type Result<T> = std::result::Result<T, FocusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = FocusError::FileRead {
            path: PathBuf::from("/snap/usage_stats.json"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/snap/usage_stats.json"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_snapshot_not_found() {
        let err = FocusError::SnapshotNotFound(PathBuf::from("/missing/dir"));
        assert_eq!(err.to_string(), "Snapshot directory not found: /missing/dir");
    }

    #[test]
    fn test_error_display_permission_denied() {
        let err = FocusError::PermissionDenied;
        assert_eq!(
            err.to_string(),
            "Usage access permission has not been granted"
        );
    }

    #[test]
    fn test_error_display_source_unavailable() {
        let err = FocusError::SourceUnavailable("service offline".to_string());
        assert_eq!(err.to_string(), "Usage data source unavailable: service offline");
    }

    #[test]
    fn test_error_display_invalid_setting() {
        let err = FocusError::InvalidSetting("unknown key 'volume'".to_string());
        assert_eq!(err.to_string(), "Invalid setting: unknown key 'volume'");
    }

    #[test]
    fn test_error_display_config() {
        let err = FocusError::Config("bad timezone".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad timezone");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: FocusError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: FocusError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
