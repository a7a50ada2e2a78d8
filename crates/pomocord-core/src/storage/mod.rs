mod settings;

pub use settings::{SettingKey, Settings, SettingsFormat, SettingsStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/pomocord[-dev]/` based on POMOCORD_ENV.
///
/// Set POMOCORD_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMOCORD_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomocord-dev")
    } else {
        base_dir.join("pomocord")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
