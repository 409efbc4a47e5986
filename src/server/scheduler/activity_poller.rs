//! Panel activity poller.
//!
//! On a fixed cadence the poller walks every tracked server, fetches its most recent
//! activity, diffs the page against the server's cursor and posts the unseen entries to
//! Discord oldest-first. Per server and pass:
//!
//! 1. **Cold start** (no cursor) - fetch a single entry and adopt its id as the cursor
//!    without posting anything, so history never floods the channel.
//! 2. **Warm poll** (cursor present) - fetch a full page and collect entries newer than
//!    the cursor. If the cursor is not on the page, the whole page is treated as new;
//!    entries older than the page are not recovered.
//! 3. **Emit** - deliver new entries oldest-first; individual delivery failures are
//!    logged and do not stop the batch.
//! 4. **Advance** - move the cursor to the newest fetched id and persist immediately,
//!    before the next server is polled.
//!
//! A failed fetch leaves the server's cursor untouched and the server is retried on the
//! next tick.

use std::{sync::Arc, time::Duration};

use serenity::{all::ChannelId, http::Http};
use tokio::{sync::Notify, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::server::{
    config::{PollerConfig, MAX_PAGE_SIZE},
    data::cursor_store::CursorStore,
    error::panel::PanelError,
    model::{
        activity::{ActivityEvent, TrackedServer},
        cursor::{Cursor, CursorMap},
    },
    service::{
        activity_notification::{builder, DiscordNotifier, NotificationSink},
        discovery,
        panel::{ActivityFeed, PanelClient},
    },
};

/// Page size of the cold-start seeding request.
pub const SEED_LIMIT: u32 = 1;
const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// What happened to one server during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerOutcome {
    /// Cold start adopted the newest id as the cursor.
    Seeded,
    /// New entries were found; `emitted` counts successful deliveries.
    Advanced { emitted: usize, failed: usize },
    /// Nothing new, or an empty feed.
    Unchanged,
    /// The fetch failed; the cursor was left as is.
    FetchFailed,
    /// Shutdown was requested while the fetch was in flight.
    Cancelled,
}

/// Counters for a single polling pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub polled: usize,
    pub seeded: usize,
    pub emitted: usize,
    pub delivery_failures: usize,
    pub fetch_failures: usize,
    /// Set when the pass was abandoned before every server was polled.
    pub aborted: bool,
}

/// Poll cycle driver for tracked panel servers.
///
/// Owns the in-memory cursor mapping and is the only writer of the cursor store.
pub struct ActivityPoller<F, S> {
    feed: F,
    sink: S,
    store: CursorStore,
    servers: Vec<TrackedServer>,
    cursors: CursorMap,
    page_size: u32,
    interval: Duration,
}

impl<F, S> ActivityPoller<F, S>
where
    F: ActivityFeed,
    S: NotificationSink,
{
    /// Creates a poller and loads the persisted cursors.
    ///
    /// Uses a page size of 50 and a 30 second cadence; see `with_page_size` and
    /// `with_interval`.
    ///
    /// # Arguments
    /// - `feed` - Activity source for tracked servers
    /// - `sink` - Destination for formatted notices
    /// - `store` - Durable cursor storage
    /// - `servers` - Servers to poll, fixed for the poller's lifetime
    ///
    /// # Returns
    /// - `ActivityPoller` - Poller primed with the stored cursors
    pub fn new(feed: F, sink: S, store: CursorStore, servers: Vec<TrackedServer>) -> Self {
        let cursors = store.load();
        Self {
            feed,
            sink,
            store,
            servers,
            cursors,
            page_size: MAX_PAGE_SIZE,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn cursors(&self) -> &CursorMap {
        &self.cursors
    }

    /// Runs polling passes on the configured cadence until cancelled.
    ///
    /// The first pass starts immediately. Ticks missed because a pass ran long are
    /// delayed, never bunched up. An empty server list disables the poller: it logs once
    /// and returns without polling.
    ///
    /// # Arguments
    /// - `cancel` - Stop signal checked at every tick and around every fetch
    pub async fn run(&mut self, cancel: &CancellationToken) {
        if self.servers.is_empty() {
            tracing::warn!("No panel servers configured; activity poller disabled");
            return;
        }

        let resumed = self
            .cursors()
            .values()
            .filter(|cursor| cursor.last_id.is_some())
            .count();
        tracing::info!(
            "Activity poller started for {} servers every {}s ({} cursors loaded from {})",
            self.servers.len(),
            self.interval.as_secs(),
            resumed,
            self.store.path().display()
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let summary = self.run_pass(cancel).await;
            tracing::debug!(
                "Activity pass finished: {} polled, {} seeded, {} posted, {} posts failed, {} fetches failed{}",
                summary.polled,
                summary.seeded,
                summary.emitted,
                summary.delivery_failures,
                summary.fetch_failures,
                if summary.aborted { ", aborted" } else { "" }
            );
        }

        tracing::info!("Activity poller stopped");
    }

    /// Runs one polling pass over every tracked server, in order.
    ///
    /// # Arguments
    /// - `cancel` - Stop signal; the pass ends early once it fires
    ///
    /// # Returns
    /// - `PassSummary` - Counters describing the pass
    pub async fn run_pass(&mut self, cancel: &CancellationToken) -> PassSummary {
        let mut summary = PassSummary::default();

        if let Err(e) = self.sink.prepare().await {
            tracing::error!("Skipping activity pass: {}", e);
            summary.aborted = true;
            return summary;
        }

        for index in 0..self.servers.len() {
            if cancel.is_cancelled() {
                summary.aborted = true;
                break;
            }

            let server = self.servers[index].clone();
            match self.poll_server(&server, cancel).await {
                ServerOutcome::Seeded => summary.seeded += 1,
                ServerOutcome::Advanced { emitted, failed } => {
                    summary.emitted += emitted;
                    summary.delivery_failures += failed;
                }
                ServerOutcome::Unchanged => {}
                ServerOutcome::FetchFailed => summary.fetch_failures += 1,
                ServerOutcome::Cancelled => {
                    summary.aborted = true;
                    break;
                }
            }
            summary.polled += 1;
        }

        summary
    }

    /// Polls a single server, seeding or diffing depending on its cursor.
    pub async fn poll_server(
        &mut self,
        server: &TrackedServer,
        cancel: &CancellationToken,
    ) -> ServerOutcome {
        let last_id = self
            .cursors
            .get(&server.identifier)
            .and_then(|cursor| cursor.last_id.clone());

        match last_id {
            None => self.seed(server, cancel).await,
            Some(last_id) => self.warm_poll(server, &last_id, cancel).await,
        }
    }

    async fn seed(&mut self, server: &TrackedServer, cancel: &CancellationToken) -> ServerOutcome {
        let events = match self.fetch(&server.identifier, SEED_LIMIT, cancel).await {
            None => return ServerOutcome::Cancelled,
            Some(Err(e)) => {
                tracing::warn!("Unable to seed cursor: {}", e);
                return ServerOutcome::FetchFailed;
            }
            Some(Ok(events)) => events,
        };

        let Some(latest) = events.first() else {
            tracing::debug!("No activity yet for server {}", server.identifier);
            return ServerOutcome::Unchanged;
        };

        let latest_id = latest.id.clone();
        tracing::info!(
            "Seeded activity cursor for server {} at {}",
            server.identifier,
            latest_id
        );
        self.commit(&server.identifier, &latest_id);

        ServerOutcome::Seeded
    }

    async fn warm_poll(
        &mut self,
        server: &TrackedServer,
        last_id: &str,
        cancel: &CancellationToken,
    ) -> ServerOutcome {
        let events = match self.fetch(&server.identifier, self.page_size, cancel).await {
            None => return ServerOutcome::Cancelled,
            Some(Err(e)) => {
                tracing::error!("{}", e);
                return ServerOutcome::FetchFailed;
            }
            Some(Ok(events)) => events,
        };

        let Some(newest) = events.first() else {
            return ServerOutcome::Unchanged;
        };

        let unseen = unseen_events(&events, last_id);
        if unseen.is_empty() {
            return ServerOutcome::Unchanged;
        }

        if unseen.len() == events.len() {
            tracing::warn!(
                "Cursor {} for server {} not found in the latest {} entries; older activity may be missing",
                last_id,
                server.identifier,
                events.len()
            );
        }

        let mut emitted = 0;
        let mut failed = 0;
        for event in unseen {
            let notice = builder::build_activity_notice(event, &server.display_name);
            match self.sink.deliver(&notice).await {
                Ok(()) => emitted += 1,
                Err(e) => {
                    failed += 1;
                    tracing::error!("{}", e);
                }
            }
        }

        let newest_id = newest.id.clone();
        self.commit(&server.identifier, &newest_id);

        ServerOutcome::Advanced { emitted, failed }
    }

    /// Fetches a page unless shutdown is requested first.
    ///
    /// Returns `None` when cancellation won the race; the in-flight request is dropped.
    async fn fetch(
        &self,
        identifier: &str,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Option<Result<Vec<ActivityEvent>, PanelError>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.feed.fetch(identifier, limit) => Some(result),
        }
    }

    /// Advances a server's cursor and persists the whole mapping right away.
    ///
    /// A failed write is logged; the in-memory cursor still advances so the running
    /// process does not re-post the same entries.
    fn commit(&mut self, identifier: &str, last_id: &str) {
        self.cursors
            .insert(identifier.to_string(), Cursor::at(last_id));

        if let Err(e) = self.store.save(&self.cursors) {
            tracing::error!("Failed to persist activity cursor for {}: {}", identifier, e);
        }
    }
}

/// Returns the entries newer than `last_id`, oldest first.
///
/// `events` must be newest first. Collection stops at the entry whose id equals
/// `last_id` (exclusive). When `last_id` is absent from the page, every entry is
/// returned.
pub fn unseen_events<'a>(events: &'a [ActivityEvent], last_id: &str) -> Vec<&'a ActivityEvent> {
    let mut unseen: Vec<&ActivityEvent> = events
        .iter()
        .take_while(|event| event.id != last_id)
        .collect();
    unseen.reverse();
    unseen
}

/// Starts the panel activity poller and runs it until `cancel` fires.
///
/// Resolves the tracked servers once, waits for the Discord gateway to report ready, then
/// hands over to `ActivityPoller::run`.
///
/// # Arguments
/// - `config` - Poller configuration
/// - `http_client` - Shared reqwest client for panel requests
/// - `discord_http` - Discord HTTP client for posting notices
/// - `ready` - Signalled by the bot's ready handler
/// - `cancel` - Shutdown signal
pub async fn start_poller(
    config: PollerConfig,
    http_client: reqwest::Client,
    discord_http: Arc<Http>,
    ready: Arc<Notify>,
    cancel: CancellationToken,
) {
    if config.channel_id == 0 {
        tracing::error!("Activity poller not started: channel id 0 is not a Discord channel");
        return;
    }
    let panel = PanelClient::from_config(http_client, &config);

    let servers = tokio::select! {
        _ = cancel.cancelled() => return,
        servers = discovery::resolve_tracked_servers(&config, &panel) => servers,
    };

    if !servers.is_empty() {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ready.notified() => {}
        }
    }

    let notifier = DiscordNotifier::new(discord_http, ChannelId::new(config.channel_id));
    let store = CursorStore::new(config.state_file.clone());

    let mut poller = ActivityPoller::new(panel, notifier, store, servers)
        .with_page_size(config.page_size)
        .with_interval(config.poll_interval);

    poller.run(&cancel).await;
}
