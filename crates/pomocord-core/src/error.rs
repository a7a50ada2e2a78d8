//! Core error types for pomocord-core.
//!
//! Every fallible operation in the library returns [`CoreError`] or one of
//! the narrower enums it wraps. The command surface converts all of them to
//! user-facing text; only [`ConfigError`] at startup is treated as fatal by
//! the binary.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomocord-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings file errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rejected `set` input
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Chat command could not be parsed
    #[error("{0}")]
    Command(#[from] CommandError),

    /// Failure reported by the chat/voice/audio adapters
    #[error("{0}")]
    Platform(#[from] PlatformError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings-file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the settings file
    #[error("Failed to load settings from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to write the settings file
    #[error("Failed to save settings to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// File exists but is not valid settings
    #[error("Failed to parse settings at {path}: {message}")]
    ParseFailed { path: PathBuf, message: String },

    /// The data directory could not be created
    #[error("Failed to prepare settings directory {path}: {message}")]
    DataDir { path: PathBuf, message: String },
}

/// Validation errors for `set key value`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("'{value}' is not a number; {key} needs a whole number")]
    NotANumber { key: String, value: String },

    #[error("{key} must be at least 1")]
    NotPositive { key: String },

    #[error("Unknown key '{key}'. Valid keys: {valid}")]
    UnknownKey { key: String, valid: String },
}

/// Chat command parse errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing argument for {command}: expected {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
}

/// Errors raised by the platform adapters (Discord, voice, media).
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Posting a message failed
    #[error("Failed to send message: {0}")]
    Message(String),

    /// Joining or leaving a voice channel failed
    #[error("Voice connection error: {0}")]
    Voice(String),

    /// Changing a participant's mute state failed
    #[error("Failed to update member {user}: {message}")]
    Member { user: u64, message: String },

    /// Media resolution or playback failed
    #[error("Playback error: {0}")]
    Media(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
