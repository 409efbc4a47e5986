//! Bot backend and the panel activity poller.
//!
//! This module contains the complete implementation of the bot: configuration, the
//! Discord gateway connection, and the background poller that mirrors game-panel
//! activity into a Discord channel.
//!
//! # Architecture
//!
//! - **Scheduler Layer** (`scheduler/`) - Poll cycle driver and its wiring at startup
//! - **Service Layer** (`service/`) - Panel API client, server discovery and notice delivery
//! - **Data Layer** (`data/`) - Durable cursor storage in the shared state document
//! - **Model Layer** (`model/`) - Activity entries, cursors and formatted notices
//! - **Error Layer** (`error/`) - Application error types
//!
//! # Infrastructure
//!
//! - **Configuration** (`config`) - Environment-based configuration
//! - **Startup** (`startup`) - Initialization of shared clients
//! - **Bot** (`bot/`) - Discord gateway connection and ready signalling
//! - **Utilities** (`util/`) - Parsing helpers for configuration and payloads
//!
//! # Poll Flow
//!
//! 1. **Startup** resolves the tracked servers once and waits for the bot to be ready
//! 2. **Scheduler** ticks on a fixed cadence and walks the servers in order
//! 3. **Service** fetches each server's recent activity from the panel
//! 4. **Scheduler** diffs the page against the stored cursor
//! 5. **Service** formats and posts every unseen entry, oldest first
//! 6. **Data** persists the advanced cursor before the next server is polled

pub mod bot;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod service;
pub mod startup;
pub mod util;
