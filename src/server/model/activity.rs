//! Domain models for panel servers and their activity feed entries.
//!
//! Activity entries arrive as loosely shaped JSON from the panel API. They are parsed
//! defensively into `ActivityEvent` at the client boundary so the poller only ever sees
//! a fixed shape; unrecognized fields are ignored rather than rejected.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::server::util::parse::parse_time;

/// A game server whose activity feed is monitored.
///
/// Resolved once at startup, from configuration or from the application API listing,
/// and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedServer {
    /// Short panel identifier used in client API paths (e.g. `sb4`).
    pub identifier: String,
    /// Human readable name shown when the entry carries no subject of its own.
    pub display_name: String,
}

impl TrackedServer {
    /// Creates a tracked server whose display name is its identifier.
    pub fn from_identifier(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self {
            display_name: identifier.clone(),
            identifier,
        }
    }
}

/// One entry of a server's activity log.
///
/// `id` is the sole identity. Feed pages list entries newest-first and that position is
/// the only ordering the poller relies on; `timestamp` is display-only.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEvent {
    pub id: String,
    /// Event label such as `server:power.start`.
    pub event_type: String,
    pub description: String,
    pub actor: Option<String>,
    pub ip: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    /// Name of the server the entry refers to, when the payload carries one.
    pub subject: Option<String>,
    /// Free-form properties bag from the panel.
    pub properties: Map<String, Value>,
}

impl ActivityEvent {
    /// Parses a raw feed entry.
    ///
    /// Reads fields from `attributes` when present, otherwise from the entry itself, and
    /// falls back through the alternative keys the panel has used over time.
    ///
    /// # Arguments
    /// - `item` - One element of the `data` array of an activity response
    ///
    /// # Returns
    /// - `Some(ActivityEvent)` - Entry parsed
    /// - `None` - Entry has no usable id and cannot take part in cursor tracking
    pub fn from_payload(item: &Value) -> Option<Self> {
        let attributes = item.get("attributes").unwrap_or(item);
        let id = value_as_text(attributes.get("id")).or_else(|| value_as_text(item.get("id")))?;

        let empty = Map::new();
        let properties = attributes
            .get("properties")
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let relationships = attributes
            .get("relationships")
            .or_else(|| item.get("relationships"))
            .filter(|value| value.is_object());

        let event_type = first_text(attributes, &["event", "action"])
            .unwrap_or_else(|| "Activity".to_string());
        let description = first_text(attributes, &["description"])
            .or_else(|| first_text_in(properties, &["description", "action"]))
            .unwrap_or_else(|| "Activity event".to_string());
        let ip = first_text(attributes, &["ip"]).or_else(|| first_text_in(properties, &["ip"]));

        let timestamp = ["timestamp", "updated_at", "created_at"]
            .iter()
            .filter_map(|key| attributes.get(*key).and_then(Value::as_str))
            .find(|raw| !raw.is_empty())
            .and_then(|raw| parse_time(Some(raw)));

        let actor = relationships
            .and_then(|rel| relation_attributes(rel, "actor"))
            .and_then(|actor| first_text(actor, &["username", "email", "id"]))
            .or_else(|| first_text(attributes, &["actor"]));

        let subject = relationships
            .and_then(|rel| relation_attributes(rel, "subject"))
            .and_then(|subject| first_text(subject, &["name", "hostname"]))
            .or_else(|| first_text_in(properties, &["server", "subject"]));

        Some(Self {
            id,
            event_type,
            description,
            actor,
            ip,
            timestamp,
            subject,
            properties: properties.clone(),
        })
    }
}

fn relation_attributes<'a>(relationships: &'a Value, name: &str) -> Option<&'a Value> {
    relationships.get(name)?.get("attributes")
}

/// Returns the first key whose value is a non-empty string or a number, as text.
fn first_text(value: &Value, keys: &[&str]) -> Option<String> {
    value.as_object().and_then(|map| first_text_in(map, keys))
}

fn first_text_in(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| value_as_text(map.get(*key)))
}

fn value_as_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
