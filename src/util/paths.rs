//! Path utilities for camweb data directories

use std::path::PathBuf;
use std::sync::OnceLock;

/// Global storage for custom data directory path
static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Initialize the data directory with an optional custom path.
/// Must be called early in main() before any other path functions are used.
/// If custom_path is None, uses the default ~/.camweb location.
pub fn init_data_dir(custom_path: Option<PathBuf>) {
    let path = custom_path.unwrap_or_else(default_data_dir);
    if DATA_DIR.set(path.clone()).is_err() {
        let existing = DATA_DIR
            .get()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        tracing::debug!(
            path = %path.display(),
            existing = %existing,
            "Data directory already initialized"
        );
    }
}

/// Get the default data directory path (~/.camweb)
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".camweb"))
        .unwrap_or_else(|| PathBuf::from(".camweb"))
}

/// Get the base camweb data directory.
/// Returns the custom path if set via init_data_dir(), otherwise ~/.camweb
pub fn data_dir() -> PathBuf {
    DATA_DIR.get().cloned().unwrap_or_else(default_data_dir)
}

/// Get the logs directory (~/.camweb/logs)
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Get the default log file path (~/.camweb/logs/camweb.log)
pub fn log_file_path() -> PathBuf {
    logs_dir().join("camweb.log")
}

/// Get the config file path (~/.camweb/config.toml)
pub fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

/// Default directory for captured media (~/recordings)
pub fn default_recordings_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join("recordings"))
        .unwrap_or_else(|| PathBuf::from("recordings"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_paths_live_under_data_dir() {
        let base = data_dir();
        assert!(logs_dir().starts_with(&base));
        assert_eq!(log_file_path().file_name().unwrap(), "camweb.log");
        assert_eq!(config_path(), base.join("config.toml"));
    }

    #[test]
    fn test_default_recordings_dir_name() {
        assert_eq!(
            default_recordings_dir().file_name().unwrap(),
            "recordings"
        );
    }
}
