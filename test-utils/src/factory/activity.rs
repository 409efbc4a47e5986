//! Activity log entry factory.
//!
//! Builds JSON entries shaped like the panel's client API `activity_log` objects, the
//! way they appear in the `data` array of an activity response.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::factory::helpers::next_id;

/// Factory for activity log entries with customizable fields.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::factory::activity::ActivityFactory;
///
/// let entry = ActivityFactory::new()
///     .id("105")
///     .event("server:power.start")
///     .actor("sylv")
///     .build();
/// ```
pub struct ActivityFactory {
    id: Option<String>,
    event: String,
    description: String,
    ip: Option<String>,
    timestamp: DateTime<Utc>,
    actor: Option<String>,
    properties: Map<String, Value>,
}

impl ActivityFactory {
    /// Creates a new ActivityFactory with default values.
    ///
    /// Defaults:
    /// - id: auto-incremented counter value
    /// - event: `"server:console.command"`
    /// - description: `"Activity {id}"`
    /// - timestamp: now
    ///
    /// # Returns
    /// - `ActivityFactory` - New factory instance with defaults
    pub fn new() -> Self {
        let id = next_id();
        Self {
            id: Some(id.to_string()),
            event: "server:console.command".to_string(),
            description: format!("Activity {}", id),
            ip: None,
            timestamp: Utc::now(),
            actor: None,
            properties: Map::new(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Removes the id so the entry cannot be tracked.
    pub fn without_id(mut self) -> Self {
        self.id = None;
        self
    }

    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = event.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Sets the actor, rendered as a `relationships.actor` user object.
    pub fn actor(mut self, username: impl Into<String>) -> Self {
        self.actor = Some(username.into());
        self
    }

    /// Adds one entry to the properties bag.
    ///
    /// # Arguments
    /// - `key` - Property name, such as `command` or `file`
    /// - `value` - Any JSON value
    ///
    /// # Returns
    /// - `Self` - Factory instance for method chaining
    pub fn property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Builds the activity entry.
    ///
    /// # Returns
    /// - `Value` - `activity_log` object with `attributes`
    pub fn build(self) -> Value {
        let mut attributes = json!({
            "event": self.event,
            "description": self.description,
            "timestamp": self.timestamp.to_rfc3339(),
            "properties": self.properties,
        });

        if let Some(id) = self.id {
            attributes["id"] = json!(id);
        }
        if let Some(ip) = self.ip {
            attributes["ip"] = json!(ip);
        }
        if let Some(username) = self.actor {
            attributes["relationships"] = json!({
                "actor": { "object": "user", "attributes": { "username": username } }
            });
        }

        json!({ "object": "activity_log", "attributes": attributes })
    }
}

impl Default for ActivityFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates an activity entry with the given id and default values.
///
/// Shorthand for `ActivityFactory::new().id(id).build()`.
pub fn create_activity(id: impl Into<String>) -> Value {
    ActivityFactory::new().id(id).build()
}

/// Creates a newest-first page of default entries, one per id.
///
/// # Arguments
/// - `ids` - Entry ids, newest first
///
/// # Returns
/// - `Vec<Value>` - Entries in the given order
pub fn create_activity_page(ids: &[&str]) -> Vec<Value> {
    ids.iter().map(|id| create_activity(*id)).collect()
}
