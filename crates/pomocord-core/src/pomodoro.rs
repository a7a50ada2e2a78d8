//! The command-facing service.
//!
//! [`Pomodoro`] owns the settings and the session and exposes the five
//! operations the chat layer needs. Every operation reports back through
//! the [`Platform`] it is given; [`Pomodoro::dispatch`] turns any error
//! into a chat message so nothing escapes to the gateway loop.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::commands::Command;
use crate::error::{CommandError, Result};
use crate::events::Event;
use crate::media;
use crate::platform::Platform;
use crate::session::{Session, SharedSession};
use crate::storage::{SettingKey, Settings, SettingsStore};
use crate::timer::{focus_until_long_break, CycleEngine, Phase};
use crate::voice;

/// Read-only view for `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    /// Settings with the token masked.
    pub settings: Settings,
    pub running: bool,
    pub phase: Phase,
    pub phase_since: Option<DateTime<Utc>>,
    pub focus_count: u64,
    pub until_long_break: u64,
    pub in_voice: bool,
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.settings;
        writeln!(f, "\u{1F4CB} **Settings**")?;
        writeln!(f, "Focus Time: {} min", s.focus)?;
        writeln!(f, "Break Time: {} min", s.short_break)?;
        writeln!(f, "Long Break Time: {} min", s.long_break)?;
        writeln!(f, "Interval: {}", s.interval)?;
        writeln!(f, "Music URL: {}", s.music_url)?;
        writeln!(f)?;
        writeln!(f, "\u{1F552} **State**")?;
        writeln!(f, "Running: {}", if self.running { "yes" } else { "no" })?;
        match self.phase_since {
            Some(since) => writeln!(
                f,
                "Phase: {} (since {} UTC)",
                self.phase.label(),
                since.format("%H:%M")
            )?,
            None => writeln!(f, "Phase: {}", self.phase.label())?,
        }
        write!(
            f,
            "Focus count: {} ({} until long break)",
            self.focus_count, self.until_long_break
        )
    }
}

#[derive(Clone)]
pub struct Pomodoro {
    store: Arc<SettingsStore>,
    settings: Arc<RwLock<Settings>>,
    session: SharedSession,
    prefix: String,
}

impl Pomodoro {
    pub fn new(store: SettingsStore, settings: Settings) -> Self {
        Self {
            store: Arc::new(store),
            settings: Arc::new(RwLock::new(settings)),
            session: Session::shared(),
            prefix: "!".to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Parse and run a chat message. Returns false if it was not a command.
    pub async fn handle_message(&self, platform: &Platform, text: &str) -> bool {
        match Command::parse(&self.prefix, text) {
            Some(parsed) => {
                self.dispatch(platform, parsed).await;
                true
            }
            None => false,
        }
    }

    /// Run a parsed command, reporting any error in chat.
    pub async fn dispatch(&self, platform: &Platform, parsed: Result<Command, CommandError>) {
        let outcome = match parsed {
            Ok(command) => {
                tracing::info!(?command, "command");
                self.execute(platform, command).await
            }
            Err(e) => Err(e.into()),
        };
        if let Err(e) = outcome {
            tracing::warn!(error = %e, "command failed");
            platform.announce(&Event::error(&e)).await;
        }
    }

    pub async fn execute(&self, platform: &Platform, command: Command) -> Result<()> {
        match command {
            Command::Start => self.start(platform).await,
            Command::Stop => self.stop(platform).await,
            Command::Leave => self.leave_voice(platform).await,
            Command::Set { key, value } => self.update_setting(platform, &key, &value).await,
            Command::Status => {
                let snapshot = self.status().await;
                platform.announce(&Event::Status(snapshot)).await;
                Ok(())
            }
            Command::Help => {
                platform
                    .announce(&Event::Help {
                        prefix: self.prefix.clone(),
                    })
                    .await;
                Ok(())
            }
        }
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Start the cycle if idle. A second start is answered with a notice.
    pub async fn start(&self, platform: &Platform) -> Result<()> {
        let mut session = self.session.lock().await;
        let Some(token) = session.begin() else {
            platform.announce(&Event::AlreadyRunning).await;
            return Ok(());
        };
        platform.announce(&Event::CycleStarted).await;

        let engine = CycleEngine::new(
            Arc::clone(&self.settings),
            Arc::clone(&self.session),
            platform.clone(),
            token,
        );
        tokio::spawn(engine.run());
        Ok(())
    }

    /// Halt the cycle, stop music and unmute everyone.
    pub async fn stop(&self, platform: &Platform) -> Result<()> {
        let mut session = self.session.lock().await;
        let was_running = session.halt();
        media::stop(&mut session).await;
        if let Some(link) = session.voice.clone() {
            if let Err(e) = voice::unmute_all(link.gateway.as_ref(), link.channel).await {
                tracing::warn!(error = %e, "unmute on stop failed");
            }
        }
        tracing::info!(was_running, "timer stopped");
        platform.announce(&Event::CycleStopped).await;
        Ok(())
    }

    /// Unmute everyone and disconnect. No-op without a voice connection.
    pub async fn leave_voice(&self, platform: &Platform) -> Result<()> {
        let mut session = self.session.lock().await;
        let Some(link) = session.voice.take() else {
            tracing::debug!("leave requested without a voice connection");
            return Ok(());
        };
        media::stop(&mut session).await;
        if let Err(e) = voice::unmute_all(link.gateway.as_ref(), link.channel).await {
            tracing::warn!(error = %e, "unmute on leave failed");
        }
        link.gateway.disconnect().await?;
        platform.announce(&Event::LeftVoice).await;
        Ok(())
    }

    /// Validate, persist and apply one setting.
    ///
    /// A new `music_url` takes effect at once when a cycle is running.
    pub async fn update_setting(&self, platform: &Platform, key: &str, value: &str) -> Result<()> {
        let key = SettingKey::parse_in(key, &SettingKey::CHAT)?;
        let new_value = {
            let mut settings = self.settings.write().await;
            self.store.update(&mut settings, key, value)?;
            settings.get(key)
        };
        tracing::info!(%key, "setting updated");
        platform
            .announce(&Event::SettingUpdated {
                key: key.to_string(),
                value: new_value.clone(),
            })
            .await;

        if key == SettingKey::MusicUrl {
            let mut session = self.session.lock().await;
            if session.is_running() {
                media::stop(&mut session).await;
                media::play(&mut session, platform, &new_value).await;
            }
        }
        Ok(())
    }

    /// Snapshot of settings and session. Never mutates.
    pub async fn status(&self) -> StatusSnapshot {
        let settings = self.settings.read().await.redacted();
        let session = self.session.lock().await;
        StatusSnapshot {
            running: session.is_running(),
            phase: session.phase(),
            phase_since: session.phase_since(),
            focus_count: session.focus_count(),
            until_long_break: focus_until_long_break(
                session.focus_count(),
                settings.effective_interval(),
            ),
            in_voice: session.voice_channel().is_some(),
            settings,
        }
    }
}
