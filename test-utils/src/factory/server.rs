//! Application API server entry factory.

use serde_json::{json, Value};

use crate::factory::helpers::next_id;

/// Factory for server listing entries returned by `/api/application/servers`.
pub struct ServerFactory {
    id: u64,
    identifier: Option<String>,
    name: Option<String>,
}

impl ServerFactory {
    /// Creates a new ServerFactory with default values.
    ///
    /// Defaults:
    /// - identifier: `"srv{id}"`
    /// - name: `"Server {id}"`
    ///
    /// # Returns
    /// - `ServerFactory` - New factory instance with defaults
    pub fn new() -> Self {
        let id = next_id();
        Self {
            id,
            identifier: Some(format!("srv{}", id)),
            name: Some(format!("Server {}", id)),
        }
    }

    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn without_identifier(mut self) -> Self {
        self.identifier = None;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn without_name(mut self) -> Self {
        self.name = None;
        self
    }

    /// Builds the server listing entry.
    pub fn build(self) -> Value {
        let mut attributes = json!({ "id": self.id });
        if let Some(identifier) = self.identifier {
            attributes["identifier"] = json!(identifier);
        }
        if let Some(name) = self.name {
            attributes["name"] = json!(name);
        }

        json!({ "object": "server", "attributes": attributes })
    }
}

impl Default for ServerFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a server entry with the given identifier and name.
pub fn create_server(identifier: impl Into<String>, name: impl Into<String>) -> Value {
    ServerFactory::new().identifier(identifier).name(name).build()
}
