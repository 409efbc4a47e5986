//! Durable storage of activity poller cursors.
//!
//! This module provides the `CursorStore` for persisting the per-server `last_id` of the
//! activity poller in a JSON state document. The document may be shared with other
//! subsystems, so the store only ever rewrites its own section and keeps every other key
//! it finds, at every nesting level:
//!
//! ```json
//! { "pterodactyl": { "servers": { "sb4": { "last_id": "105" } } } }
//! ```
//!
//! Writes go to a sibling temporary file which is synced and renamed over the target, so
//! a reader never observes a half-written document.

use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use serde_json::{Map, Value};

use crate::server::{
    error::state::StateError,
    model::cursor::{Cursor, CursorMap},
};

/// Top-level key of the poller's section in the state document.
pub const STATE_SECTION: &str = "pterodactyl";
const SERVERS_KEY: &str = "servers";
const LAST_ID_KEY: &str = "last_id";

/// Store providing load and save operations for poller cursors.
///
/// Only the poll cycle driver writes through this store, so no locking is performed
/// beyond the atomic rename.
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    /// Creates a new CursorStore backed by the given state file.
    ///
    /// # Arguments
    /// - `path` - Location of the JSON state document; it need not exist yet
    ///
    /// # Returns
    /// - `CursorStore` - New store instance
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads all persisted cursors.
    ///
    /// Missing, unreadable or corrupt state is treated as "no prior state" and yields an
    /// empty mapping; the condition is logged but never returned as an error. Entries
    /// whose `last_id` is `null`, absent or not a scalar load as cold cursors.
    ///
    /// # Returns
    /// - `CursorMap` - Cursors keyed by server identifier, possibly empty
    pub fn load(&self) -> CursorMap {
        let raw = match self.read_raw() {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    "Unable to read state file {}, treating as empty: {}",
                    self.path.display(),
                    e
                );
                None
            }
        };
        let Some(document) = raw.and_then(|raw| self.parse_document(&raw)) else {
            return CursorMap::new();
        };

        let Some(servers) = document
            .get(STATE_SECTION)
            .and_then(|section| section.get(SERVERS_KEY))
            .and_then(Value::as_object)
        else {
            return CursorMap::new();
        };

        servers
            .iter()
            .map(|(identifier, entry)| {
                let last_id = match entry.get(LAST_ID_KEY) {
                    Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
                    Some(Value::Number(id)) => Some(id.to_string()),
                    _ => None,
                };
                (identifier.clone(), Cursor { last_id })
            })
            .collect()
    }

    /// Persists the full cursor mapping.
    ///
    /// Re-reads the current document so keys written by other subsystems since the last
    /// load survive, merges every cursor's `last_id` into its server entry, and atomically
    /// replaces the file. Server entries that are not in `cursors` are left untouched. A
    /// corrupt document is replaced; a document that exists but cannot be read is never
    /// overwritten.
    ///
    /// # Arguments
    /// - `cursors` - Complete cursor mapping owned by the poller
    ///
    /// # Returns
    /// - `Ok(())` - Document written and renamed into place
    /// - `Err(StateError::Io)` - Reading the existing file, or creating, writing or renaming
    ///   the new one failed
    /// - `Err(StateError::Serialize)` - The document could not be serialized
    pub fn save(&self, cursors: &CursorMap) -> Result<(), StateError> {
        let mut document = self
            .read_raw()
            .map_err(|source| StateError::Io {
                path: self.path.clone(),
                source,
            })?
            .and_then(|raw| self.parse_document(&raw))
            .unwrap_or_default();

        let servers = object_entry(object_entry(&mut document, STATE_SECTION), SERVERS_KEY);
        for (identifier, cursor) in cursors {
            let entry = object_entry(servers, identifier);
            let last_id = cursor
                .last_id
                .as_ref()
                .map(|id| Value::String(id.clone()))
                .unwrap_or(Value::Null);
            entry.insert(LAST_ID_KEY.to_string(), last_id);
        }

        let contents = serde_json::to_vec_pretty(&Value::Object(document))?;
        self.write_atomic(&contents)
    }

    /// Reads the raw document; `Ok(None)` when the file does not exist.
    fn read_raw(&self) -> std::io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn parse_document(&self, raw: &str) -> Option<Map<String, Value>> {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(document)) => Some(document),
            Ok(_) => {
                tracing::warn!(
                    "State file {} is not a JSON object, treating as empty",
                    self.path.display()
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    "State file {} is corrupt, treating as empty: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    fn write_atomic(&self, contents: &[u8]) -> Result<(), StateError> {
        let io_err = |source| StateError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let tmp_path = self.temp_path();
        let mut file = File::create(&tmp_path).map_err(io_err)?;
        file.write_all(contents).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);

        fs::rename(&tmp_path, &self.path).map_err(io_err)?;

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Returns the object stored under `key`, replacing any non-object value with `{}`.
fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }

    match slot {
        Value::Object(inner) => inner,
        _ => unreachable!("slot was just replaced with an object"),
    }
}
