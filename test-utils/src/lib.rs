//! Packbot Test Utils
//!
//! Provides shared testing utilities for the packbot panel integration. This crate offers a
//! builder pattern for creating test contexts with a mock panel HTTP server and an
//! isolated state directory.
//!
//! # Overview
//!
//! The test utilities consist of four main components:
//! - **TestBuilder**: Fluent builder for configuring test environments
//! - **TestContext**: Test environment holding the mock panel and temporary directory
//! - **factory**: JSON payload factories for panel API responses
//! - **TestError**: Error types that can occur during test setup
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::{builder::TestBuilder, factory::activity::ActivityFactory};
//!
//! #[tokio::test]
//! async fn test_activity_fetch() -> Result<(), TestError> {
//!     let test = TestBuilder::new()
//!         .with_panel()
//!         .with_activity("sb4", vec![ActivityFactory::new().id("105").build()])
//!         .build()
//!         .await?;
//!
//!     let url = test.panel_url().unwrap();
//!     // Point a PanelClient at `url`...
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod factory;
