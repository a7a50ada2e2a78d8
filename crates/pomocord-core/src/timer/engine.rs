//! Focus/break cycle engine.
//!
//! The engine is one long-lived tokio task per run. It alternates focus
//! and break phases until its cancellation token fires.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Focus -> ShortBreak -> Focus -> ... -> LongBreak -> Focus -> ...
//!   ^                                                                  |
//!   +------------------------------ stop ------------------------------+
//! ```
//!
//! Phase actions (announce, join, mute, play) run with the session lock
//! held; the lock is released while sleeping. Settings are re-read at the
//! start of every phase.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::phase::{minutes, BreakKind, Phase};
use crate::events::Event;
use crate::media;
use crate::platform::Platform;
use crate::session::{Session, SharedSession, VoiceLink};
use crate::storage::Settings;
use crate::voice;

pub struct CycleEngine {
    settings: Arc<RwLock<Settings>>,
    session: SharedSession,
    platform: Platform,
    token: CancellationToken,
}

impl CycleEngine {
    pub fn new(
        settings: Arc<RwLock<Settings>>,
        session: SharedSession,
        platform: Platform,
        token: CancellationToken,
    ) -> Self {
        Self {
            settings,
            session,
            platform,
            token,
        }
    }

    /// Run phases until cancelled.
    pub async fn run(self) {
        tracing::info!("cycle started");
        loop {
            if !self.focus_phase().await {
                break;
            }
            if !self.break_phase().await {
                break;
            }
        }
        tracing::info!("cycle finished");
    }

    async fn focus_phase(&self) -> bool {
        let duration = {
            let mut session = self.session.lock().await;
            if self.token.is_cancelled() {
                return false;
            }
            let settings = self.settings.read().await.clone();

            session.enter(Phase::Focus);
            self.platform
                .announce(&Event::FocusStarted {
                    minutes: settings.focus,
                    at: Utc::now(),
                })
                .await;
            self.join_and_mute(&mut session).await;
            media::play(&mut session, &self.platform, &settings.music_url).await;
            settings.focus
        };

        if !self.sleep(duration).await {
            return false;
        }

        let mut session = self.session.lock().await;
        if self.token.is_cancelled() {
            return false;
        }
        media::stop(&mut session).await;
        self.platform
            .announce(&Event::FocusEnded { at: Utc::now() })
            .await;
        let completed = session.complete_focus();
        tracing::info!(completed, "focus phase complete");
        true
    }

    async fn break_phase(&self) -> bool {
        let (kind, duration) = {
            let mut session = self.session.lock().await;
            if self.token.is_cancelled() {
                return false;
            }
            let settings = self.settings.read().await.clone();

            let kind = BreakKind::after(session.focus_count(), settings.effective_interval());
            let duration = kind.duration_min(&settings);
            session.enter(kind.phase());
            self.platform
                .announce(&Event::BreakStarted {
                    kind,
                    minutes: duration,
                    at: Utc::now(),
                })
                .await;
            self.unmute(&session).await;
            (kind, duration)
        };

        if !self.sleep(duration).await {
            return false;
        }

        let _session = self.session.lock().await;
        if self.token.is_cancelled() {
            return false;
        }
        self.platform
            .announce(&Event::BreakEnded {
                kind,
                at: Utc::now(),
            })
            .await;
        true
    }

    /// Sleep for `min` minutes. Returns false if cancelled first.
    async fn sleep(&self, min: u64) -> bool {
        tokio::select! {
            _ = self.token.cancelled() => false,
            _ = tokio::time::sleep(minutes(min)) => !self.token.is_cancelled(),
        }
    }

    /// Stay in the current voice channel, or join the requester's if not
    /// connected, and mute its humans.
    async fn join_and_mute(&self, session: &mut Session) {
        let gateway = &self.platform.voice;
        let target = match session.voice_channel() {
            Some(channel) => Some(channel),
            None => gateway.requester_channel().await,
        };
        let Some(channel) = target else {
            self.platform.announce(&Event::NotInVoice).await;
            return;
        };

        if session.voice_channel() != Some(channel) {
            if let Err(e) = gateway.connect(channel).await {
                tracing::warn!(channel, error = %e, "failed to join voice");
                self.platform.announce(&Event::error(&e)).await;
                return;
            }
            session.voice = Some(VoiceLink {
                channel,
                gateway: Arc::clone(gateway),
            });
            tracing::info!(channel, "joined voice");
        }

        match voice::mute_all(gateway.as_ref(), channel).await {
            Ok(report) if !report.is_clean() => {
                self.platform
                    .announce(&Event::MembersNotUpdated {
                        count: report.failed.len(),
                    })
                    .await;
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(channel, error = %e, "could not list voice members"),
        }
    }

    async fn unmute(&self, session: &Session) {
        let Some(link) = &session.voice else {
            return;
        };
        match voice::unmute_all(link.gateway.as_ref(), link.channel).await {
            Ok(report) if !report.is_clean() => {
                self.platform
                    .announce(&Event::MembersNotUpdated {
                        count: report.failed.len(),
                    })
                    .await;
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(channel = link.channel, error = %e, "could not list voice members"),
        }
    }
}
