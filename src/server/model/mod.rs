//! Server-side domain models.
//!
//! Domain models are produced at the client and store boundaries (panel payloads,
//! persisted cursors) and consumed by the poller and notification services. They carry
//! no I/O of their own.

pub mod activity;
pub mod cursor;
pub mod notice;
