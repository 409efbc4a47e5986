//! Persistence layer.
//!
//! The bot keeps its durable state in a single JSON document shared by several
//! subsystems. The activity poller's cursors live in their own section of that document
//! and are managed by `CursorStore`.

pub mod cursor_store;
