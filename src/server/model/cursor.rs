//! Per-server polling cursors.

use std::collections::BTreeMap;

/// Last activity id delivered (or seeded) for one tracked server.
///
/// `last_id == None` means the server was never polled successfully and the next poll is
/// a cold start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    pub last_id: Option<String>,
}

impl Cursor {
    pub fn at(last_id: impl Into<String>) -> Self {
        Self {
            last_id: Some(last_id.into()),
        }
    }
}

/// Cursors keyed by server identifier.
pub type CursorMap = BTreeMap<String, Cursor>;
