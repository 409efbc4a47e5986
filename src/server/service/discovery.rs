//! Resolution of the tracked server list.
//!
//! The list is resolved once at startup. Statically configured identifiers take
//! precedence; otherwise the application API listing is consulted a single time. The
//! poller never re-resolves the list while running.

use crate::server::{
    config::PollerConfig, model::activity::TrackedServer, service::panel::PanelClient,
};

/// Resolves the servers whose activity will be polled.
///
/// Discovery failures are logged and produce an empty list, which leaves the poller
/// disabled rather than failing startup.
///
/// # Arguments
/// - `config` - Poller configuration carrying static identifiers
/// - `panel` - Panel client, used only when no identifiers are configured
///
/// # Returns
/// - `Vec<TrackedServer>` - Servers to poll, possibly empty
pub async fn resolve_tracked_servers(
    config: &PollerConfig,
    panel: &PanelClient,
) -> Vec<TrackedServer> {
    if !config.server_identifiers.is_empty() {
        return config
            .server_identifiers
            .iter()
            .map(TrackedServer::from_identifier)
            .collect();
    }

    if !panel.has_application_key() {
        return Vec::new();
    }

    match panel.list_servers().await {
        Ok(servers) => {
            tracing::info!("Discovered {} panel servers", servers.len());
            servers
        }
        Err(e) => {
            tracing::error!("Panel server discovery failed: {}", e);
            Vec::new()
        }
    }
}
