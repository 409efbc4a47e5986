//! Activity notification service for Discord message delivery.
//!
//! This module provides the `NotificationSink` seam used by the activity poller and its
//! Discord implementation, `DiscordNotifier`. Notices are built by the `builder` module
//! and converted into embeds here, right before posting.
//!
//! Delivery is fire-and-forget from the poller's point of view: a failed post is
//! reported back as a `NotifyError`, logged by the caller, and never rolls back cursor
//! progress.

pub mod builder;

use std::sync::Arc;

use serenity::{
    all::{ChannelId, CreateEmbed, CreateEmbedFooter, CreateMessage, Timestamp},
    async_trait,
    http::Http,
};

use crate::server::{
    error::notify::NotifyError,
    model::notice::ActivityNotice,
};

/// Destination for formatted activity notices.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Verifies the destination is reachable before a polling pass.
    ///
    /// A failure makes the poller skip the whole pass without fetching or touching any
    /// cursor, so nothing is lost while the channel is unavailable.
    async fn prepare(&self) -> Result<(), NotifyError> {
        Ok(())
    }

    /// Delivers one notice.
    async fn deliver(&self, notice: &ActivityNotice) -> Result<(), NotifyError>;
}

#[async_trait]
impl<T: NotificationSink + ?Sized> NotificationSink for Arc<T> {
    async fn prepare(&self) -> Result<(), NotifyError> {
        (**self).prepare().await
    }

    async fn deliver(&self, notice: &ActivityNotice) -> Result<(), NotifyError> {
        (**self).deliver(notice).await
    }
}

/// Posts activity notices as embeds to a single Discord channel.
pub struct DiscordNotifier {
    /// Discord HTTP client shared with the bot
    http: Arc<Http>,
    /// Channel receiving every notice
    channel_id: ChannelId,
}

impl DiscordNotifier {
    /// Creates a new DiscordNotifier instance.
    ///
    /// # Arguments
    /// - `http` - Arc-wrapped Discord HTTP client for API requests
    /// - `channel_id` - Target channel for activity notices
    ///
    /// # Returns
    /// - `DiscordNotifier` - New notifier instance
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self { http, channel_id }
    }
}

#[async_trait]
impl NotificationSink for DiscordNotifier {
    async fn prepare(&self) -> Result<(), NotifyError> {
        self.http
            .get_channel(self.channel_id)
            .await
            .map(|_| ())
            .map_err(|e| NotifyError::ChannelUnavailable {
                channel_id: self.channel_id.get(),
                source: Box::new(e),
            })
    }

    async fn deliver(&self, notice: &ActivityNotice) -> Result<(), NotifyError> {
        let message = CreateMessage::new().embed(build_embed(notice));

        self.channel_id
            .send_message(&self.http, message)
            .await
            .map(|_| ())
            .map_err(|e| NotifyError::NotificationFailed {
                channel_id: self.channel_id.get(),
                event_id: notice.event_id.clone(),
                source: Box::new(e),
            })
    }
}

/// Converts a notice into a Discord embed.
///
/// Timestamps Discord cannot represent are dropped rather than failing the post.
pub fn build_embed(notice: &ActivityNotice) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&notice.title)
        .description(&notice.description)
        .color(notice.color)
        .footer(CreateEmbedFooter::new(&notice.footer));

    if let Some(timestamp) = notice
        .timestamp
        .and_then(|ts| Timestamp::from_unix_timestamp(ts.timestamp()).ok())
    {
        embed = embed.timestamp(timestamp);
    }

    for field in &notice.fields {
        embed = embed.field(&field.name, &field.value, field.inline);
    }

    embed
}
