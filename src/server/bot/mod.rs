//! Discord bot integration.
//!
//! This module owns the gateway connection of the bot. The gateway itself handles no
//! commands; its job is to log in, report readiness and keep the shared HTTP client alive
//! so the activity poller can post notices through it without maintaining a second
//! connection to Discord.
//!
//! The bot is initialized at startup and runs in a separate tokio task. Shutdown is driven
//! from `main` through the client's shard manager.
//!
//! # Gateway Intents
//!
//! The bot requires only the `GUILDS` intent, which carries the channel information
//! needed to resolve the activity channel.

pub mod handler;
pub mod start;
