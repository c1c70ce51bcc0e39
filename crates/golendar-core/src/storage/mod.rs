mod config;
pub mod history;
pub mod json;

pub use config::{Config, LogConfig, NotificationsConfig, RemindersConfig, StorageConfig};
pub use history::{HistoryEntry, HistoryLog};
pub use json::JsonStorage;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the directory holding config, events, history and logs.
///
/// `GOLENDAR_DATA_DIR` wins when set. Otherwise `~/.config/golendar[-dev]/`,
/// with the `-dev` suffix selected by `GOLENDAR_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("GOLENDAR_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("GOLENDAR_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("golendar-dev")
            } else {
                base_dir.join("golendar")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
