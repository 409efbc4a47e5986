//! Service layer for panel access, server discovery and activity notifications.
//!
//! Services sit between the scheduler and the external APIs:
//!
//! - **Panel** (`panel`) - Activity feed and server listing requests against the game panel
//! - **Discovery** (`discovery`) - One-time resolution of the tracked server list
//! - **Activity notification** (`activity_notification`) - Notice formatting and Discord delivery

pub mod activity_notification;
pub mod discovery;
pub mod panel;

#[cfg(test)]
mod test;
