//! Factory methods for creating panel API payloads.
//!
//! Each payload kind has its own factory module with both a `Factory` struct for
//! customization and a `create_*` convenience function for quick default creation.
//!
//! # Basic Usage
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! let entry = factory::create_activity("105");
//! let page = factory::create_activity_page(&["107", "106", "105"]);
//! let server = factory::create_server("sb4", "StoneBlock 4");
//! ```
//!
//! # Available Factories
//!
//! - `activity` - Client API activity log entries
//! - `server` - Application API server listing entries
//! - `helpers` - Unique id generation

pub mod activity;
pub mod helpers;
pub mod server;

pub use activity::{create_activity, create_activity_page};
pub use server::create_server;
