//! Persisted bot settings.
//!
//! The settings file is a flat record with six required fields:
//! `focus`, `break`, `longbreak`, `interval`, `music_url` and `token`.
//! It is JSON (4-space indented) by default, or TOML when the file name
//! ends in `.toml`.
//!
//! Writes go to a sibling temporary file which is then renamed over the
//! target, so a concurrent reader never sees a half-written file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::data_dir;
use crate::error::{ConfigError, ValidationError};

const DEFAULT_TOKEN: &str = "YOURTOKEN";
const MUSIC_OFF: &str = "none";

/// Typed bot configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Focus phase length in minutes.
    pub focus: u64,
    /// Short break length in minutes.
    #[serde(rename = "break")]
    pub short_break: u64,
    /// Long break length in minutes.
    #[serde(rename = "longbreak")]
    pub long_break: u64,
    /// Focus phases between long breaks.
    pub interval: u64,
    /// Direct media link or search query. Empty means no music.
    pub music_url: String,
    /// Discord bot token.
    pub token: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus: 25,
            short_break: 5,
            long_break: 15,
            interval: 4,
            music_url: String::new(),
            token: DEFAULT_TOKEN.to_string(),
        }
    }
}

/// The keys that may be changed at runtime, each mapped to a typed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Focus,
    Break,
    LongBreak,
    Interval,
    MusicUrl,
    Token,
}

impl SettingKey {
    pub const ALL: [SettingKey; 6] = [
        SettingKey::Focus,
        SettingKey::Break,
        SettingKey::LongBreak,
        SettingKey::Interval,
        SettingKey::MusicUrl,
        SettingKey::Token,
    ];

    /// Keys accepted by the chat `set` command. The token is deliberately
    /// left out: it is only editable from the local CLI.
    pub const CHAT: [SettingKey; 5] = [
        SettingKey::Focus,
        SettingKey::Break,
        SettingKey::LongBreak,
        SettingKey::Interval,
        SettingKey::MusicUrl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::Focus => "focus",
            SettingKey::Break => "break",
            SettingKey::LongBreak => "longbreak",
            SettingKey::Interval => "interval",
            SettingKey::MusicUrl => "music_url",
            SettingKey::Token => "token",
        }
    }

    /// Parse a key restricted to `allowed`, reporting the allowed list on failure.
    pub fn parse_in(raw: &str, allowed: &[SettingKey]) -> Result<Self, ValidationError> {
        allowed
            .iter()
            .copied()
            .find(|k| k.as_str() == raw)
            .ok_or_else(|| ValidationError::UnknownKey {
                key: raw.to_string(),
                valid: allowed
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl FromStr for SettingKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_in(s, &Self::ALL)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Settings {
    /// Current value of `key` as text.
    pub fn get(&self, key: SettingKey) -> String {
        match key {
            SettingKey::Focus => self.focus.to_string(),
            SettingKey::Break => self.short_break.to_string(),
            SettingKey::LongBreak => self.long_break.to_string(),
            SettingKey::Interval => self.interval.to_string(),
            SettingKey::MusicUrl => self.music_url.clone(),
            SettingKey::Token => self.token.clone(),
        }
    }

    /// Validate `value` for `key` and assign it.
    ///
    /// On error `self` is left untouched.
    pub fn apply(&mut self, key: SettingKey, value: &str) -> Result<(), ValidationError> {
        match key {
            SettingKey::Focus => self.focus = parse_positive(key, value)?,
            SettingKey::Break => self.short_break = parse_positive(key, value)?,
            SettingKey::LongBreak => self.long_break = parse_positive(key, value)?,
            SettingKey::Interval => self.interval = parse_positive(key, value)?,
            SettingKey::MusicUrl => self.music_url = parse_music(value),
            SettingKey::Token => self.token = value.trim().to_string(),
        }
        Ok(())
    }

    /// Copy with the token hidden, for anything shown to users.
    pub fn redacted(&self) -> Self {
        Self {
            token: mask_token(&self.token),
            ..self.clone()
        }
    }

    /// Long-break interval, never below one.
    pub fn effective_interval(&self) -> u64 {
        self.interval.max(1)
    }
}

/// `none` clears the music source.
fn parse_music(value: &str) -> String {
    let value = value.trim();
    if value.eq_ignore_ascii_case(MUSIC_OFF) {
        String::new()
    } else {
        value.to_string()
    }
}

fn parse_positive(key: SettingKey, value: &str) -> Result<u64, ValidationError> {
    let n: u64 = value
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber {
            key: key.to_string(),
            value: value.to_string(),
        })?;
    if n == 0 {
        return Err(ValidationError::NotPositive {
            key: key.to_string(),
        });
    }
    Ok(n)
}

fn mask_token(token: &str) -> String {
    let len = token.chars().count();
    if len == 0 {
        String::new()
    } else if len <= 4 {
        "****".to_string()
    } else {
        let tail: String = token.chars().skip(len - 4).collect();
        format!("****{tail}")
    }
}

/// On-disk encoding, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Json,
    Toml,
}

impl SettingsFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => SettingsFormat::Toml,
            _ => SettingsFormat::Json,
        }
    }

    fn encode(self, settings: &Settings) -> Result<String, String> {
        match self {
            SettingsFormat::Json => {
                let mut buf = Vec::new();
                let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
                let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
                settings.serialize(&mut ser).map_err(|e| e.to_string())?;
                buf.push(b'\n');
                String::from_utf8(buf).map_err(|e| e.to_string())
            }
            SettingsFormat::Toml => toml::to_string_pretty(settings).map_err(|e| e.to_string()),
        }
    }

    fn decode(self, content: &str) -> Result<Settings, String> {
        match self {
            SettingsFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            SettingsFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// Loads and saves [`Settings`] at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    format: SettingsFormat,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = SettingsFormat::from_path(&path);
        Self { path, format }
    }

    /// Store at `~/.config/pomocord[-dev]/settings.json`.
    pub fn at_default_location() -> Result<Self, ConfigError> {
        Ok(Self::new(data_dir()?.join("settings.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> SettingsFormat {
        self.format
    }

    /// Load from disk, writing and returning the defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// or if the defaults cannot be written.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => self
                .format
                .decode(&content)
                .map_err(|message| ConfigError::ParseFailed {
                    path: self.path.clone(),
                    message,
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let settings = Settings::default();
                self.save(&settings)?;
                tracing::info!(path = %self.path.display(), "wrote default settings");
                Ok(settings)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: self.path.clone(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk via write-then-rename.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be encoded or written.
    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        let save_err = |message: String| ConfigError::SaveFailed {
            path: self.path.clone(),
            message,
        };

        let content = self.format.encode(settings).map_err(save_err)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| save_err(e.to_string()))?;
        }

        let tmp = self.temp_path();
        std::fs::write(&tmp, content).map_err(|e| save_err(e.to_string()))?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(save_err(e.to_string()));
        }
        Ok(())
    }

    /// Validate and persist a single key change.
    ///
    /// `settings` is only updated after the new record has been written,
    /// so a rejected value or a failed write leaves both memory and disk
    /// as they were.
    pub fn update(
        &self,
        settings: &mut Settings,
        key: SettingKey,
        value: &str,
    ) -> crate::error::Result<()> {
        let mut next = settings.clone();
        next.apply(key, value)?;
        self.save(&next)?;
        *settings = next;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "settings".to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}
