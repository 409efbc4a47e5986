//! Error types for the bot and its background activity poller.
//!
//! This module provides the application's error hierarchy. The `AppError` enum is the
//! top-level error type returned from startup and wiring code. The poller's own errors
//! (`PanelError`, `NotifyError`, `StateError`) never reach it: none of them is allowed to
//! terminate the process, so they are logged where they occur and the affected server is
//! retried on the next cycle.

pub mod config;
pub mod notify;
pub mod panel;
pub mod state;

use thiserror::Error;

use crate::server::error::config::ConfigError;

/// Top-level application error type.
///
/// Aggregates all possible error types that can occur in the application. Most variants
/// use `#[from]` for automatic error conversion so startup code can propagate with `?`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    ///
    /// Configuration issues prevent normal operation and abort startup.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// HTTP client construction or request error from reqwest.
    #[error(transparent)]
    ReqwestErr(#[from] reqwest::Error),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// I/O error while waiting on process signals.
    #[error(transparent)]
    IoErr(#[from] std::io::Error),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}
