use thiserror::Error;

/// Errors raised while delivering activity notices to Discord.
///
/// Delivery is best-effort. The poller logs these and keeps going; they never block
/// subsequent notices or cursor advancement.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The target channel could not be fetched, so no notice can be posted this cycle.
    #[error("Unable to access channel {channel_id}: {source}")]
    ChannelUnavailable {
        channel_id: u64,
        #[source]
        source: Box<serenity::Error>,
    },

    /// Posting one notice to the channel failed.
    #[error("Failed to post activity {event_id} to channel {channel_id}: {source}")]
    NotificationFailed {
        channel_id: u64,
        event_id: String,
        #[source]
        source: Box<serenity::Error>,
    },
}
