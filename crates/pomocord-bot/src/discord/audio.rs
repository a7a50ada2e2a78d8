use std::sync::Arc;

use async_trait::async_trait;
use pomocord_core::{AudioBackend, AudioHandle, MediaSource, PlatformError, Playback};
use serenity::model::id::GuildId;
use songbird::input::{Compose, YoutubeDl};
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::Songbird;

/// Resolves media through yt-dlp and plays it on the guild's songbird call.
pub struct SongbirdAudio {
    manager: Arc<Songbird>,
    guild: GuildId,
    http_client: reqwest::Client,
}

impl SongbirdAudio {
    pub fn new(manager: Arc<Songbird>, guild: GuildId, http_client: reqwest::Client) -> Self {
        Self {
            manager,
            guild,
            http_client,
        }
    }
}

#[async_trait]
impl AudioBackend for SongbirdAudio {
    async fn play(&self, source: &MediaSource) -> Result<Playback, PlatformError> {
        let call = self
            .manager
            .get(self.guild)
            .ok_or_else(|| PlatformError::Media("not connected to a voice channel".into()))?;

        let mut input = match source {
            MediaSource::Url(url) => YoutubeDl::new(self.http_client.clone(), url.to_string()),
            MediaSource::Search(query) => {
                YoutubeDl::new_search(self.http_client.clone(), query.clone())
            }
        };

        // Resolving metadata runs yt-dlp, so an unavailable video fails here
        // instead of producing a silent track.
        let metadata = input
            .aux_metadata()
            .await
            .map_err(|e| PlatformError::Media(e.to_string()))?;

        let handle = call.lock().await.play_input(input.into());
        Ok(Playback {
            title: metadata.title,
            handle: Box::new(SongbirdTrack(handle)),
        })
    }
}

struct SongbirdTrack(TrackHandle);

#[async_trait]
impl AudioHandle for SongbirdTrack {
    async fn is_playing(&self) -> bool {
        match self.0.get_info().await {
            Ok(state) => matches!(state.playing, PlayMode::Play | PlayMode::Pause),
            Err(_) => false,
        }
    }

    async fn stop(&self) -> Result<(), PlatformError> {
        self.0
            .stop()
            .map_err(|e| PlatformError::Media(e.to_string()))
    }
}
