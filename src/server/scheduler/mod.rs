//! Background jobs.
//!
//! - **Activity poller** (`activity_poller`) - relays panel activity into a Discord channel

pub mod activity_poller;

#[cfg(test)]
mod test;
