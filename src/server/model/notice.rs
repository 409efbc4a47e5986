//! Formatted activity notices handed to the notification sink.

use chrono::{DateTime, Utc};

/// A single embed field of an activity notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Platform-neutral rendering of one activity event.
///
/// Built by the notification builder and converted to a Discord embed by the sink, so the
/// formatting rules can be tested without a Discord connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityNotice {
    /// Id of the event this notice renders, used for delivery logging.
    pub event_id: String,
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<NoticeField>,
    pub timestamp: Option<DateTime<Utc>>,
    pub footer: String,
}

