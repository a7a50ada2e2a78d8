use std::sync::Arc;

use async_trait::async_trait;
use pomocord_core::{Participant, PlatformError, VoiceGateway};
use serenity::builder::EditMember;
use serenity::cache::Cache;
use serenity::http::Http;
use serenity::model::id::{ChannelId, GuildId, UserId};
use songbird::error::JoinError;
use songbird::Songbird;

/// Voice control for the guild a command came from.
pub struct GuildVoice {
    cache: Arc<Cache>,
    http: Arc<Http>,
    manager: Arc<Songbird>,
    guild: GuildId,
    requester: UserId,
}

impl GuildVoice {
    pub fn new(
        cache: Arc<Cache>,
        http: Arc<Http>,
        manager: Arc<Songbird>,
        guild: GuildId,
        requester: UserId,
    ) -> Self {
        Self {
            cache,
            http,
            manager,
            guild,
            requester,
        }
    }
}

#[async_trait]
impl VoiceGateway for GuildVoice {
    async fn requester_channel(&self) -> Option<u64> {
        let guild = self.cache.guild(self.guild)?;
        guild
            .voice_states
            .get(&self.requester)
            .and_then(|state| state.channel_id)
            .map(|channel| channel.get())
    }

    async fn connect(&self, channel: u64) -> Result<(), PlatformError> {
        self.manager
            .join(self.guild, ChannelId::new(channel))
            .await
            .map(|_| ())
            .map_err(|e| PlatformError::Voice(e.to_string()))
    }

    async fn disconnect(&self) -> Result<(), PlatformError> {
        match self.manager.remove(self.guild).await {
            Ok(()) | Err(JoinError::NoCall) => Ok(()),
            Err(e) => Err(PlatformError::Voice(e.to_string())),
        }
    }

    async fn participants(&self, channel: u64) -> Result<Vec<Participant>, PlatformError> {
        let guild = self
            .cache
            .guild(self.guild)
            .ok_or_else(|| PlatformError::Voice(format!("guild {} not in cache", self.guild)))?;
        let channel = ChannelId::new(channel);

        Ok(guild
            .voice_states
            .values()
            .filter(|state| state.channel_id == Some(channel))
            .map(|state| {
                let member = guild.members.get(&state.user_id);
                Participant {
                    id: state.user_id.get(),
                    name: member
                        .map(|m| m.display_name().to_string())
                        .unwrap_or_default(),
                    is_bot: member.map(|m| m.user.bot).unwrap_or(false),
                    muted: state.mute,
                }
            })
            .collect())
    }

    async fn set_muted(&self, user: u64, muted: bool) -> Result<(), PlatformError> {
        self.guild
            .edit_member(&*self.http, UserId::new(user), EditMember::new().mute(muted))
            .await
            .map(|_| ())
            .map_err(|e| PlatformError::Member {
                user,
                message: e.to_string(),
            })
    }
}
