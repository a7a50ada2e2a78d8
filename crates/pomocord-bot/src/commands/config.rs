use std::io::Write;

use clap::Subcommand;
use pomocord_core::{SettingKey, Settings, SettingsStore};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a setting (focus, break, longbreak, interval, music_url, token)
    Get {
        /// Setting key
        key: String,
    },
    /// Set a setting
    Set {
        /// Setting key
        key: String,
        /// New value
        value: String,
    },
    /// List all settings (token masked)
    List,
    /// Reset settings to defaults
    Reset,
    /// Print the settings file path
    Path,
}

pub fn run(store: &SettingsStore, action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    execute(store, action, &mut std::io::stdout())
}

fn execute<W: Write>(
    store: &SettingsStore,
    action: ConfigAction,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let key: SettingKey = key.parse()?;
            let settings = store.load()?;
            let value = match key {
                SettingKey::Token => settings.redacted().token,
                other => settings.get(other),
            };
            writeln!(out, "{value}")?;
        }
        ConfigAction::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            let mut settings = store.load()?;
            store.update(&mut settings, key, &value)?;
            writeln!(out, "ok")?;
        }
        ConfigAction::List => {
            let settings = store.load()?.redacted();
            writeln!(out, "{}", serde_json::to_string_pretty(&settings)?)?;
        }
        ConfigAction::Reset => {
            store.save(&Settings::default())?;
            writeln!(out, "settings reset to defaults")?;
        }
        ConfigAction::Path => {
            writeln!(out, "{}", store.path().display())?;
        }
    }
    Ok(())
}
