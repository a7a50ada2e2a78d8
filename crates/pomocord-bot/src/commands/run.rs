use pomocord_core::{Pomodoro, SettingsStore};
use serenity::prelude::*;
use songbird::SerenityInit;

use crate::discord::Handler;

const PLACEHOLDER_TOKEN: &str = "YOURTOKEN";

/// Load settings, connect to Discord and serve commands until the gateway closes.
pub fn run(
    store: SettingsStore,
    prefix: String,
    token: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    // A corrupt settings file is fatal here, before anything connects.
    let settings = store.load()?;
    let token = token.unwrap_or_else(|| settings.token.clone());
    if token.trim().is_empty() || token == PLACEHOLDER_TOKEN {
        return Err(format!(
            "no bot token configured; run `pomocord config set token <TOKEN>` or set POMOCORD_TOKEN (settings: {})",
            store.path().display()
        )
        .into());
    }

    tracing::info!(settings = %store.path().display(), %prefix, "starting bot");
    let pomodoro = Pomodoro::new(store, settings).with_prefix(prefix);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(serve(token, pomodoro))
}

async fn serve(token: String, pomodoro: Pomodoro) -> Result<(), Box<dyn std::error::Error>> {
    let intents = GatewayIntents::non_privileged()
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS;

    let mut client = Client::builder(&token, intents)
        .event_handler(Handler::new(pomodoro))
        .register_songbird()
        .await?;

    client.start().await?;
    Ok(())
}
