mod server;

use std::sync::Arc;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::server::{
    bot, config::Config, error::AppError, scheduler::activity_poller, startup,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let http_client = startup::setup_reqwest_client()?;
    let ready = Arc::new(Notify::new());
    let cancel = CancellationToken::new();

    tracing::info!("Starting packbot");

    // Initialize Discord bot and extract HTTP client
    let (bot_client, discord_http) = bot::start::init_bot(&config, ready.clone()).await?;
    let shard_manager = bot_client.shard_manager.clone();

    let poller = match config.poller {
        Some(poller_config) => {
            let poller_cancel = cancel.clone();
            Some(tokio::spawn(activity_poller::start_poller(
                poller_config,
                http_client,
                discord_http,
                ready,
                poller_cancel,
            )))
        }
        None => {
            tracing::info!("Activity poller not configured");
            None
        }
    };

    // Start Discord bot in a separate task
    let mut bot_task = tokio::spawn(async move {
        if let Err(e) = bot::start::start_bot(bot_client).await {
            tracing::error!("Discord bot error: {}", e);
        }
    });

    let bot_finished = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Shutdown requested");
            false
        }
        _ = &mut bot_task => {
            tracing::warn!("Discord bot stopped, shutting down");
            true
        }
    };

    cancel.cancel();
    if let Some(poller) = poller {
        if let Err(e) = poller.await {
            tracing::error!("Activity poller task failed: {}", e);
        }
    }

    shard_manager.shutdown_all().await;
    if !bot_finished {
        if let Err(e) = bot_task.await {
            tracing::error!("Discord bot task failed: {}", e);
        }
    }

    tracing::info!("Shutdown complete");

    Ok(())
}
