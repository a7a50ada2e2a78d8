//! Seams between the core and the chat platform.
//!
//! The bot binary implements these traits on top of serenity and songbird;
//! tests implement them with in-memory recorders.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PlatformError;
use crate::events::Event;
use crate::media::MediaSource;

/// Raw voice channel id.
pub type ChannelId = u64;
/// Raw user id.
pub type UserId = u64;

/// A member currently connected to a voice channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: UserId,
    pub name: String,
    /// Bots are never muted or unmuted.
    pub is_bot: bool,
    /// Server-side mute state.
    pub muted: bool,
}

/// Text channel the bot answers in.
#[async_trait]
pub trait Announcer: Send + Sync {
    /// Post plain text.
    async fn say(&self, text: &str) -> Result<(), PlatformError>;

    /// Post an event. Implementations may override this to keep the typed event.
    async fn announce(&self, event: &Event) -> Result<(), PlatformError> {
        self.say(&event.to_string()).await
    }
}

/// Voice connection and member control for one guild.
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    /// Voice channel the user who issued the command is sitting in.
    async fn requester_channel(&self) -> Option<ChannelId>;

    /// Join (or move to) `channel`.
    async fn connect(&self, channel: ChannelId) -> Result<(), PlatformError>;

    /// Leave voice. Succeeds if not connected.
    async fn disconnect(&self) -> Result<(), PlatformError>;

    async fn participants(&self, channel: ChannelId) -> Result<Vec<Participant>, PlatformError>;

    async fn set_muted(&self, user: UserId, muted: bool) -> Result<(), PlatformError>;
}

/// Resolves media and starts it on the current voice connection.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    async fn play(&self, source: &MediaSource) -> Result<Playback, PlatformError>;
}

/// A started track.
#[async_trait]
pub trait AudioHandle: Send + Sync {
    async fn is_playing(&self) -> bool;

    async fn stop(&self) -> Result<(), PlatformError>;
}

/// Result of a successful [`AudioBackend::play`].
pub struct Playback {
    /// Title reported by the resolver, if any.
    pub title: Option<String>,
    pub handle: Box<dyn AudioHandle>,
}

impl std::fmt::Debug for Playback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Playback")
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// Everything a command needs to act on the platform.
///
/// Built per incoming command; the cycle engine keeps the one from `start`.
#[derive(Clone)]
pub struct Platform {
    pub chat: Arc<dyn Announcer>,
    pub voice: Arc<dyn VoiceGateway>,
    pub audio: Arc<dyn AudioBackend>,
}

impl Platform {
    pub fn new(
        chat: Arc<dyn Announcer>,
        voice: Arc<dyn VoiceGateway>,
        audio: Arc<dyn AudioBackend>,
    ) -> Self {
        Self { chat, voice, audio }
    }

    /// Post an event, logging instead of failing when the send fails.
    pub async fn announce(&self, event: &Event) {
        tracing::debug!(?event, "announce");
        if let Err(e) = self.chat.announce(event).await {
            tracing::warn!(error = %e, "failed to post message");
        }
    }
}
