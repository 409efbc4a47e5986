use thiserror::Error;

/// Errors raised by the game-panel API client.
///
/// The client never retries on its own; callers decide whether a failure skips a server
/// for the current cycle or disables discovery.
#[derive(Error, Debug)]
pub enum PanelError {
    /// Fetching the activity feed of a single server failed.
    ///
    /// Covers transport failures, timeouts, non-success status codes and payloads that
    /// could not be decoded into an activity page.
    #[error("Failed to fetch activity for server {identifier}: {source}")]
    FetchFailed {
        /// Identifier of the server whose feed was requested
        identifier: String,
        /// The underlying cause
        #[source]
        source: FetchCause,
    },

    /// Listing servers through the application API failed.
    #[error("Failed to list panel servers: {source}")]
    DiscoveryFailed {
        /// The underlying cause
        #[source]
        source: FetchCause,
    },

    /// Server discovery was requested without an application API key.
    #[error("Server discovery requires PTERO_APPLICATION_API_KEY")]
    MissingApplicationKey,
}

/// Underlying cause of a failed panel request.
#[derive(Error, Debug)]
pub enum FetchCause {
    /// Transport, timeout, status or JSON decode error from reqwest.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The response was valid JSON but not shaped like a panel list response.
    #[error("unexpected payload: {0}")]
    Payload(String),
}
