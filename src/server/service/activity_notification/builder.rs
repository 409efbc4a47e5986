//! Activity notice builder utilities.
//!
//! This module turns an `ActivityEvent` into an `ActivityNotice`: the title, colored
//! description, ordered fields and footer that make up the posted embed. The properties
//! bag is condensed into a short human readable "Details" field.

use serde_json::{Map, Value};

use crate::server::{
    model::{
        activity::ActivityEvent,
        notice::{ActivityNotice, NoticeField},
    },
    util::parse::truncate_chars,
};

pub const NOTICE_TITLE: &str = "Pterodactyl Activity";
pub const NOTICE_FOOTER: &str = "panel activity";
/// Blue embed color used for every activity notice.
pub const NOTICE_COLOR: u32 = 0x3498DB;

const RAW_PROPERTIES_LIMIT: usize = 300;
/// Discord rejects embed field values longer than this.
const FIELD_VALUE_LIMIT: usize = 1024;

/// Builds the notice for one activity event.
///
/// Fields appear in a fixed order: `Event`, `Actor`, `Server`, `IP`, `Details`. Optional
/// fields are omitted when the event carries no value for them.
///
/// # Arguments
/// - `event` - Parsed activity entry
/// - `fallback_server_name` - Display name of the tracked server, used when the entry
///   does not name its subject
///
/// # Returns
/// - `ActivityNotice` - Notice ready for delivery
pub fn build_activity_notice(event: &ActivityEvent, fallback_server_name: &str) -> ActivityNotice {
    let mut fields = vec![field("Event", &event.event_type, true)];

    if let Some(actor) = &event.actor {
        fields.push(field("Actor", actor, true));
    }

    let server_name = event.subject.as_deref().unwrap_or(fallback_server_name);
    if !server_name.is_empty() {
        fields.push(field("Server", server_name, false));
    }

    if let Some(ip) = &event.ip {
        fields.push(field("IP", ip, true));
    }

    if let Some(details) = summarize_properties(&event.properties) {
        fields.push(field("Details", &details, false));
    }

    ActivityNotice {
        event_id: event.id.clone(),
        title: NOTICE_TITLE.to_string(),
        description: event.description.clone(),
        color: NOTICE_COLOR,
        fields,
        timestamp: event.timestamp,
        footer: NOTICE_FOOTER.to_string(),
    }
}

/// Condenses an activity properties bag into display lines.
///
/// Known keys (`command`, `file`, `directory` + `files`, `schedule`) each produce one
/// line. `identifier` is only shown when nothing else matched. Bags with none of these
/// keys are rendered as compact JSON, truncated to 300 characters.
///
/// # Returns
/// - `Some(String)` - Newline separated summary
/// - `None` - Properties bag is empty
pub fn summarize_properties(properties: &Map<String, Value>) -> Option<String> {
    if properties.is_empty() {
        return None;
    }

    let mut lines = Vec::new();

    if let Some(command) = text(properties, "command") {
        lines.push(format!("Command: `{}`", command));
    }

    if let Some(file) = text(properties, "file") {
        lines.push(format!("File: `{}`", file));
    }

    if let (Some(directory), Some(files)) = (
        text(properties, "directory"),
        properties.get("files").and_then(Value::as_array),
    ) {
        lines.push(format!(
            "Deleted {} item(s) from `{}`",
            files.len(),
            directory
        ));
    }

    if let Some(schedule) = text(properties, "schedule") {
        lines.push(format!("Schedule: `{}`", schedule));
    }

    if lines.is_empty() {
        if let Some(identifier) = text(properties, "identifier") {
            lines.push(format!("Identifier: `{}`", identifier));
        }
    }

    if lines.is_empty() {
        let raw = Value::Object(properties.clone()).to_string();
        lines.push(truncate_chars(&raw, RAW_PROPERTIES_LIMIT));
    }

    Some(lines.join("\n"))
}

fn field(name: &str, value: &str, inline: bool) -> NoticeField {
    NoticeField {
        name: name.to_string(),
        value: truncate_chars(value, FIELD_VALUE_LIMIT),
        inline,
    }
}

/// Reads a truthy scalar property as display text.
fn text(properties: &Map<String, Value>, key: &str) -> Option<String> {
    match properties.get(key)? {
        Value::String(value) if !value.is_empty() => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}
