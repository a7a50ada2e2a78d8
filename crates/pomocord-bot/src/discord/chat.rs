use std::sync::Arc;

use async_trait::async_trait;
use pomocord_core::{Announcer, PlatformError};
use serenity::http::Http;
use serenity::model::id::ChannelId;

/// Posts to the text channel a command came from.
pub struct ChannelChat {
    http: Arc<Http>,
    channel: ChannelId,
}

impl ChannelChat {
    pub fn new(http: Arc<Http>, channel: ChannelId) -> Self {
        Self { http, channel }
    }
}

#[async_trait]
impl Announcer for ChannelChat {
    async fn say(&self, text: &str) -> Result<(), PlatformError> {
        self.channel
            .say(&*self.http, text)
            .await
            .map(|_| ())
            .map_err(|e| PlatformError::Message(e.to_string()))
    }
}
