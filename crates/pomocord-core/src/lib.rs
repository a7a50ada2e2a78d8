//! # Pomocord Core Library
//!
//! Business logic for a Pomodoro timer bot that lives in a voice channel.
//! The library knows nothing about Discord: every side effect (posting a
//! message, joining voice, muting a member, playing a track) goes through
//! the async traits in [`platform`], and the bot binary supplies the
//! serenity/songbird implementations.
//!
//! ## Architecture
//!
//! - **Storage**: typed [`Settings`] persisted as JSON or TOML
//! - **Session**: the single in-memory [`Session`] guarded by a mutex
//! - **Voice / Media**: membership mute control and music playback
//! - **Timer**: the focus -> break cycle engine, run as one background task
//! - **Commands**: chat command parsing and the [`Pomodoro`] service
//!
//! ## Key Components
//!
//! - [`Pomodoro`]: start/stop/leave/set/status operations
//! - [`CycleEngine`]: the phase loop
//! - [`SettingsStore`]: settings persistence

pub mod commands;
pub mod error;
pub mod events;
pub mod media;
pub mod platform;
pub mod pomodoro;
pub mod session;
pub mod storage;
pub mod timer;
pub mod voice;

pub use commands::Command;
pub use error::{CommandError, ConfigError, CoreError, PlatformError, ValidationError};
pub use events::Event;
pub use media::MediaSource;
pub use platform::{Announcer, AudioBackend, AudioHandle, Participant, Platform, Playback, VoiceGateway};
pub use pomodoro::{Pomodoro, StatusSnapshot};
pub use session::{Session, SharedSession};
pub use storage::{SettingKey, Settings, SettingsFormat, SettingsStore};
pub use timer::{BreakKind, CycleEngine, Phase};
