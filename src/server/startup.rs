use std::time::Duration;

use crate::server::error::AppError;

/// Timeout applied to every panel request, including connection setup.
const PANEL_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the shared HTTP client for panel API requests.
///
/// Redirects are disabled so an API key is never forwarded to a host other than the
/// configured panel. The client is cheap to clone and shared by discovery and polling.
///
/// # Returns
/// - `Ok(reqwest::Client)` - Configured client
/// - `Err(AppError::ReqwestErr)` - The TLS backend could not be initialized
pub fn setup_reqwest_client() -> Result<reqwest::Client, AppError> {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(PANEL_REQUEST_TIMEOUT)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    Ok(client)
}
