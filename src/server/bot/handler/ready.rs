//! Ready event handler for bot initialization.
//!
//! This module handles the `ready` event which is fired when the bot successfully
//! connects to Discord's gateway and completes the initial handshake. Besides logging
//! the connection, it releases the activity poller, which must not post before the
//! bot is logged in.
//!
//! The event fires again after every reconnect. `Notify::notify_one` stores at most
//! one permit, so repeated ready events never queue up extra wake-ups.

use serenity::all::{ActivityData, Context, Ready};
use tokio::sync::Notify;

const STATUS_TEXT: &str = "Watching the panel";

/// Handles the ready event when the bot connects to Discord.
///
/// # Arguments
/// - `ctx` - Discord context for setting activity status
/// - `ready` - Ready event data containing bot user information
/// - `notify` - Readiness signal shared with the activity poller
pub async fn handle_ready(ctx: Context, ready: Ready, notify: &Notify) {
    tracing::info!(
        "{} is connected to Discord ({} guilds)",
        ready.user.name,
        ready.guilds.len()
    );

    ctx.set_activity(Some(ActivityData::custom(STATUS_TEXT)));

    notify.notify_one();
}
