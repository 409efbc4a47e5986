use std::sync::Arc;

use serenity::{
    all::{Client, GatewayIntents},
    http::Http,
};
use tokio::sync::Notify;

use crate::server::{bot::handler::Handler, config::Config, error::AppError};

/// Builds the Discord client without connecting to the gateway.
///
/// The client's HTTP handle is returned separately so other tasks can post messages
/// while the gateway connection is owned by `start_bot`.
///
/// # Arguments
/// - `config` - Application configuration carrying the bot token
/// - `ready` - Readiness signal passed to the event handler
///
/// # Returns
/// - `Ok((Client, Arc<Http>))` - Client ready to start and its shared HTTP client
/// - `Err(AppError::DiscordErr)` - The client could not be built
pub async fn init_bot(config: &Config, ready: Arc<Notify>) -> Result<(Client, Arc<Http>), AppError> {
    let intents = GatewayIntents::GUILDS;

    let client = Client::builder(&config.discord_token, intents)
        .event_handler(Handler::new(ready))
        .await?;

    let http = client.http.clone();

    Ok((client, http))
}

/// Starts the Discord bot in a blocking manner
///
/// This function connects the client to the gateway. It should be called from within a
/// tokio::spawn task since it will block until the bot shuts down.
///
/// # Arguments
/// - `client` - Client built by `init_bot`
///
/// # Returns
/// - `Ok(())` if the bot ran until its shards were shut down
/// - `Err(AppError)` if connecting to the gateway fails
pub async fn start_bot(mut client: Client) -> Result<(), AppError> {
    tracing::info!("Starting Discord bot...");

    client.start().await?;

    Ok(())
}
