//! XDG directory helpers for config/data locations.

use std::path::PathBuf;

/// Base directory for persistent data (store database, logs).
///
/// Uses `DRAFTS_DATA_DIR` if set, otherwise `$XDG_DATA_HOME/drafts-rs` or
/// `~/.local/share/drafts-rs`.
pub(crate) fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DRAFTS_DATA_DIR")
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }

    std::env::var("XDG_DATA_HOME")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".local")
                .join("share")
        })
        .join("drafts-rs")
}

/// Default store directory.
pub(crate) fn store_dir() -> PathBuf {
    data_dir().join("store")
}

/// Directory for rolling log files.
pub(crate) fn log_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Base directory for configuration.
///
/// Uses `DRAFTS_CONFIG_DIR` if set, otherwise `$XDG_CONFIG_HOME/drafts-rs` or
/// `~/.config/drafts-rs`.
pub(crate) fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DRAFTS_CONFIG_DIR")
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }

    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".config")
        })
        .join("drafts-rs")
}
