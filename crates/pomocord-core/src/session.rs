//! In-memory session state.
//!
//! There is exactly one [`Session`] per process. It is shared behind a
//! `tokio::sync::Mutex` between the cycle engine and the command handlers,
//! and every mutation happens while that lock is held.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::platform::{AudioHandle, ChannelId, VoiceGateway};
use crate::timer::Phase;

/// Voice connection owned by the session.
#[derive(Clone)]
pub struct VoiceLink {
    pub channel: ChannelId,
    pub gateway: Arc<dyn VoiceGateway>,
}

impl std::fmt::Debug for VoiceLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceLink")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct Session {
    focus_count: u64,
    phase: Phase,
    phase_since: Option<DateTime<Utc>>,
    cancel: Option<CancellationToken>,
    pub(crate) voice: Option<VoiceLink>,
    pub(crate) audio: Option<Box<dyn AudioHandle>>,
}

pub type SharedSession = Arc<Mutex<Session>>;

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedSession {
        Arc::new(Mutex::new(Self::new()))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn focus_count(&self) -> u64 {
        self.focus_count
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn phase_since(&self) -> Option<DateTime<Utc>> {
        self.phase_since
    }

    pub fn is_running(&self) -> bool {
        self.cancel.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    pub fn voice_channel(&self) -> Option<ChannelId> {
        self.voice.as_ref().map(|l| l.channel)
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Begin a new run. Returns the token the engine must watch, or
    /// `None` if a run is already active.
    pub(crate) fn begin(&mut self) -> Option<CancellationToken> {
        if self.is_running() {
            return None;
        }
        let token = CancellationToken::new();
        self.cancel = Some(token.clone());
        self.focus_count = 0;
        Some(token)
    }

    /// Cancel the active run, if any. Returns whether one was running.
    pub(crate) fn halt(&mut self) -> bool {
        let was_running = self.is_running();
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        self.enter(Phase::Idle);
        was_running
    }

    pub(crate) fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.phase_since = match phase {
            Phase::Idle => None,
            _ => Some(Utc::now()),
        };
    }

    pub(crate) fn complete_focus(&mut self) -> u64 {
        self.focus_count += 1;
        self.focus_count
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("focus_count", &self.focus_count)
            .field("phase", &self.phase)
            .field("running", &self.is_running())
            .field("voice", &self.voice)
            .field("audio", &self.audio.is_some())
            .finish()
    }
}
