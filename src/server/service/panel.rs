//! Game-panel REST API client.
//!
//! This module provides the `PanelClient` used by the activity poller. It talks to two
//! API scopes of the panel:
//!
//! - **Client API** (`/api/client`) - per-server activity feeds, authenticated with the
//!   client key
//! - **Application API** (`/api/application`) - the server listing used to discover
//!   tracked servers, authenticated with the application key
//!
//! The client is stateless apart from its configuration. It never retries; a failed
//! request surfaces as a `PanelError` and the caller decides what to do next.

use std::sync::Arc;

use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;
use serenity::async_trait;

use crate::server::{
    config::{PollerConfig, MAX_PAGE_SIZE},
    error::panel::{FetchCause, PanelError},
    model::activity::{ActivityEvent, TrackedServer},
};

/// Page size used when walking the application server listing.
const DISCOVERY_PAGE_SIZE: u32 = 50;
/// Hard stop for discovery pagination in case the panel keeps returning `next` links.
const MAX_DISCOVERY_PAGES: u32 = 100;

/// Source of recent activity for a tracked server.
///
/// Implementations return at most `limit` events, newest first. They must be safe to
/// call concurrently for different servers.
#[async_trait]
pub trait ActivityFeed: Send + Sync {
    async fn fetch(&self, identifier: &str, limit: u32) -> Result<Vec<ActivityEvent>, PanelError>;
}

#[async_trait]
impl<T: ActivityFeed + ?Sized> ActivityFeed for Arc<T> {
    async fn fetch(&self, identifier: &str, limit: u32) -> Result<Vec<ActivityEvent>, PanelError> {
        (**self).fetch(identifier, limit).await
    }
}

/// HTTP client for the panel's client and application APIs.
#[derive(Clone)]
pub struct PanelClient {
    http: reqwest::Client,
    base_url: String,
    client_key: String,
    application_key: Option<String>,
}

#[derive(Deserialize)]
struct ServerListPage {
    #[serde(default)]
    data: Vec<ServerListEntry>,
    #[serde(default)]
    meta: Option<ListMeta>,
}

#[derive(Deserialize)]
struct ServerListEntry {
    #[serde(default)]
    attributes: ServerAttributes,
}

#[derive(Deserialize, Default)]
struct ServerAttributes {
    identifier: Option<String>,
    name: Option<String>,
}

#[derive(Deserialize)]
struct ListMeta {
    pagination: Option<Pagination>,
}

#[derive(Deserialize)]
struct Pagination {
    links: Option<PaginationLinks>,
}

#[derive(Deserialize)]
struct PaginationLinks {
    next: Option<String>,
}

impl ServerListPage {
    fn has_next(&self) -> bool {
        self.meta
            .as_ref()
            .and_then(|meta| meta.pagination.as_ref())
            .and_then(|pagination| pagination.links.as_ref())
            .and_then(|links| links.next.as_deref())
            .is_some_and(|next| !next.is_empty())
    }
}

impl PanelClient {
    /// Creates a new PanelClient.
    ///
    /// # Arguments
    /// - `http` - Shared reqwest client, configured with timeouts at startup
    /// - `base_url` - Panel base URL; a trailing slash is ignored
    /// - `client_key` - Client API key for activity feeds
    /// - `application_key` - Optional application API key for server discovery
    ///
    /// # Returns
    /// - `PanelClient` - New client instance
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        client_key: impl Into<String>,
        application_key: Option<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_key: client_key.into(),
            application_key,
        }
    }

    pub fn from_config(http: reqwest::Client, config: &PollerConfig) -> Self {
        Self::new(
            http,
            &config.panel_url,
            config.client_key.clone(),
            config.application_key.clone(),
        )
    }

    pub fn has_application_key(&self) -> bool {
        self.application_key.is_some()
    }

    /// Fetches the most recent activity page of one server.
    ///
    /// `limit` is clamped to `1..=MAX_PAGE_SIZE`. Entries without an id are dropped since
    /// they cannot be tracked by a cursor.
    ///
    /// # Arguments
    /// - `identifier` - Panel server identifier
    /// - `limit` - Maximum number of entries to request
    ///
    /// # Returns
    /// - `Ok(Vec<ActivityEvent>)` - Entries newest first, at most `limit`
    /// - `Err(PanelError::FetchFailed)` - Transport, status or payload error
    pub async fn fetch_activity(
        &self,
        identifier: &str,
        limit: u32,
    ) -> Result<Vec<ActivityEvent>, PanelError> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let fetch_failed = |source: FetchCause| PanelError::FetchFailed {
            identifier: identifier.to_string(),
            source,
        };

        let response = self
            .get_json(
                &format!("{}/api/client/servers/{}/activity", self.base_url, identifier),
                &self.client_key,
                &[("per_page", limit.to_string())],
            )
            .await
            .map_err(|e| fetch_failed(e.into()))?;

        let Some(items) = response.get("data").and_then(Value::as_array) else {
            return Err(fetch_failed(FetchCause::Payload(
                "activity response has no data array".to_string(),
            )));
        };

        let events: Vec<ActivityEvent> = items
            .iter()
            .filter_map(ActivityEvent::from_payload)
            .take(limit as usize)
            .collect();

        if events.len() < items.len().min(limit as usize) {
            tracing::debug!(
                "Dropped {} activity entries without an id for server {}",
                items.len().min(limit as usize) - events.len(),
                identifier
            );
        }

        Ok(events)
    }

    /// Lists every server visible to the application key.
    ///
    /// Walks the paginated listing until the panel stops returning a `next` link. Entries
    /// without an identifier are skipped; a missing name falls back to the identifier.
    ///
    /// # Returns
    /// - `Ok(Vec<TrackedServer>)` - Servers in listing order
    /// - `Err(PanelError::MissingApplicationKey)` - No application key configured
    /// - `Err(PanelError::DiscoveryFailed)` - Any page failed to load or decode
    pub async fn list_servers(&self) -> Result<Vec<TrackedServer>, PanelError> {
        let Some(application_key) = self.application_key.as_deref() else {
            return Err(PanelError::MissingApplicationKey);
        };

        let url = format!("{}/api/application/servers", self.base_url);
        let mut servers = Vec::new();

        for page in 1..=MAX_DISCOVERY_PAGES {
            let response = self
                .get_json(
                    &url,
                    application_key,
                    &[
                        ("page", page.to_string()),
                        ("per_page", DISCOVERY_PAGE_SIZE.to_string()),
                    ],
                )
                .await
                .map_err(|e| PanelError::DiscoveryFailed { source: e.into() })?;

            let listing: ServerListPage =
                serde_json::from_value(response).map_err(|e| PanelError::DiscoveryFailed {
                    source: FetchCause::Payload(e.to_string()),
                })?;
            let has_next = listing.has_next();

            servers.extend(listing.data.into_iter().filter_map(|entry| {
                let identifier = entry.attributes.identifier.filter(|id| !id.is_empty())?;
                let display_name = entry
                    .attributes
                    .name
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| identifier.clone());
                Some(TrackedServer {
                    identifier,
                    display_name,
                })
            }));

            if !has_next {
                return Ok(servers);
            }
        }

        tracing::warn!(
            "Stopped server discovery after {} pages, panel kept reporting more",
            MAX_DISCOVERY_PAGES
        );
        Ok(servers)
    }

    async fn get_json(
        &self,
        url: &str,
        api_key: &str,
        query: &[(&str, String)],
    ) -> Result<Value, reqwest::Error> {
        self.http
            .get(url)
            .query(query)
            .header(ACCEPT, "application/json")
            .bearer_auth(api_key)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
    }
}

#[async_trait]
impl ActivityFeed for PanelClient {
    async fn fetch(&self, identifier: &str, limit: u32) -> Result<Vec<ActivityEvent>, PanelError> {
        self.fetch_activity(identifier, limit).await
    }
}
