//! serenity/songbird adapters for the core platform traits.

mod audio;
mod chat;
mod voice;

use std::sync::Arc;

use pomocord_core::{Command, Platform, Pomodoro};
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;

pub use audio::SongbirdAudio;
pub use chat::ChannelChat;
pub use voice::GuildVoice;

/// Gateway event handler. Turns prefixed guild messages into core commands.
pub struct Handler {
    pomodoro: Pomodoro,
    http_client: reqwest::Client,
}

impl Handler {
    pub fn new(pomodoro: Pomodoro) -> Self {
        Self {
            pomodoro,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!(user = %ready.user.name, guilds = ready.guilds.len(), "connected to Discord");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(guild_id) = msg.guild_id else {
            return;
        };
        let Some(parsed) = Command::parse(self.pomodoro.prefix(), &msg.content) else {
            return;
        };
        let Some(manager) = songbird::get(&ctx).await else {
            tracing::error!("songbird voice client is not registered");
            return;
        };

        let platform = Platform::new(
            Arc::new(ChannelChat::new(Arc::clone(&ctx.http), msg.channel_id)),
            Arc::new(GuildVoice::new(
                Arc::clone(&ctx.cache),
                Arc::clone(&ctx.http),
                Arc::clone(&manager),
                guild_id,
                msg.author.id,
            )),
            Arc::new(SongbirdAudio::new(
                manager,
                guild_id,
                self.http_client.clone(),
            )),
        );

        tracing::debug!(guild = %guild_id, author = %msg.author.name, content = %msg.content, "command received");
        self.pomodoro.dispatch(&platform, parsed).await;
    }
}
