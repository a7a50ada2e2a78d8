//! Background music for focus phases.
//!
//! Playback failures never escape this module: they are logged and
//! announced, and the focus phase carries on in silence.

use std::fmt;

use url::Url;

use crate::events::Event;
use crate::platform::Platform;
use crate::session::Session;

/// What `music_url` points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// An absolute http(s) link.
    Url(Url),
    /// Anything else is handed to the resolver as a search query.
    Search(String),
}

impl MediaSource {
    /// Classify a raw setting. Returns `None` for an empty value.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Some(MediaSource::Url(url)),
            _ => Some(MediaSource::Search(raw.to_string())),
        }
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::Url(url) => write!(f, "{url}"),
            MediaSource::Search(q) => write!(f, "{q}"),
        }
    }
}

/// Start `raw` on the session's voice connection.
///
/// No-op when `raw` is empty, when there is no voice connection, or when
/// a track is already playing.
pub async fn play(session: &mut Session, platform: &Platform, raw: &str) {
    let Some(source) = MediaSource::parse(raw) else {
        return;
    };
    if session.voice.is_none() {
        tracing::debug!(%source, "not in voice, skipping playback");
        return;
    }
    if let Some(handle) = &session.audio {
        if handle.is_playing().await {
            tracing::debug!(%source, "already playing");
            return;
        }
    }

    match platform.audio.play(&source).await {
        Ok(playback) => {
            tracing::info!(%source, title = ?playback.title, "playback started");
            session.audio = Some(playback.handle);
            platform
                .announce(&Event::MusicStarted {
                    title: playback.title,
                    source: source.to_string(),
                })
                .await;
        }
        Err(e) => {
            tracing::warn!(%source, error = %e, "playback failed");
            session.audio = None;
            platform
                .announce(&Event::MusicFailed {
                    source: source.to_string(),
                    reason: e.to_string(),
                })
                .await;
        }
    }
}

/// Halt the current track, if any.
pub async fn stop(session: &mut Session) {
    let Some(handle) = session.audio.take() else {
        return;
    };
    if !handle.is_playing().await {
        return;
    }
    if let Err(e) = handle.stop().await {
        tracing::warn!(error = %e, "failed to stop playback");
    }
}
