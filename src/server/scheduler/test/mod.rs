use serde_json::Map;
use serenity::async_trait;
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::server::{
    data::cursor_store::CursorStore,
    error::{
        notify::NotifyError,
        panel::{FetchCause, PanelError},
    },
    model::{
        activity::{ActivityEvent, TrackedServer},
        cursor::{Cursor, CursorMap},
        notice::ActivityNotice,
    },
    scheduler::activity_poller::{ActivityPoller, PassSummary, ServerOutcome},
    service::{activity_notification::NotificationSink, panel::ActivityFeed},
};

mod activity_poller;

/// Builds a minimal activity event with the given id.
fn event(id: &str) -> ActivityEvent {
    ActivityEvent {
        id: id.to_string(),
        event_type: "server:console.command".to_string(),
        description: format!("activity {}", id),
        actor: None,
        ip: None,
        timestamp: None,
        subject: None,
        properties: Map::new(),
    }
}

/// Activity feed whose pages are set by the test between passes.
///
/// Pages are stored newest first and truncated to the requested limit on fetch.
#[derive(Default)]
struct ScriptedFeed {
    pages: Mutex<HashMap<String, Vec<ActivityEvent>>>,
    failing: Mutex<HashSet<String>>,
    cancel_on_fetch: Mutex<Option<(String, CancellationToken)>>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl ScriptedFeed {
    fn set(&self, identifier: &str, ids: &[&str]) {
        self.pages.lock().unwrap().insert(
            identifier.to_string(),
            ids.iter().map(|id| event(id)).collect(),
        );
    }

    fn set_events(&self, identifier: &str, events: Vec<ActivityEvent>) {
        self.pages
            .lock()
            .unwrap()
            .insert(identifier.to_string(), events);
    }

    fn fail(&self, identifier: &str) {
        self.failing.lock().unwrap().insert(identifier.to_string());
    }

    fn recover(&self, identifier: &str) {
        self.failing.lock().unwrap().remove(identifier);
    }

    /// Makes a fetch for `identifier` request shutdown and then never complete.
    fn cancel_when_fetching(&self, identifier: &str, token: CancellationToken) {
        *self.cancel_on_fetch.lock().unwrap() = Some((identifier.to_string(), token));
    }

    fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActivityFeed for ScriptedFeed {
    async fn fetch(&self, identifier: &str, limit: u32) -> Result<Vec<ActivityEvent>, PanelError> {
        self.calls
            .lock()
            .unwrap()
            .push((identifier.to_string(), limit));

        let cancel = self
            .cancel_on_fetch
            .lock()
            .unwrap()
            .as_ref()
            .filter(|(target, _)| target == identifier)
            .map(|(_, token)| token.clone());
        if let Some(token) = cancel {
            token.cancel();
            std::future::pending::<()>().await;
        }

        if self.failing.lock().unwrap().contains(identifier) {
            return Err(PanelError::FetchFailed {
                identifier: identifier.to_string(),
                source: FetchCause::Payload("scripted failure".to_string()),
            });
        }

        let page = self
            .pages
            .lock()
            .unwrap()
            .get(identifier)
            .cloned()
            .unwrap_or_default();
        Ok(page.into_iter().take(limit as usize).collect())
    }
}

/// Notification sink recording every notice it accepts.
#[derive(Default)]
struct RecordingSink {
    delivered: Mutex<Vec<ActivityNotice>>,
    attempts: Mutex<Vec<String>>,
    failing_ids: Mutex<HashSet<String>>,
    unavailable: Mutex<bool>,
}

impl RecordingSink {
    fn delivered_ids(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|notice| notice.event_id.clone())
            .collect()
    }

    fn attempted_ids(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    fn delivered(&self) -> Vec<ActivityNotice> {
        self.delivered.lock().unwrap().clone()
    }

    fn fail_on(&self, event_id: &str) {
        self.failing_ids
            .lock()
            .unwrap()
            .insert(event_id.to_string());
    }

    fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn prepare(&self) -> Result<(), NotifyError> {
        if *self.unavailable.lock().unwrap() {
            return Err(NotifyError::ChannelUnavailable {
                channel_id: 1,
                source: Box::new(serenity::Error::Other("scripted outage")),
            });
        }
        Ok(())
    }

    async fn deliver(&self, notice: &ActivityNotice) -> Result<(), NotifyError> {
        self.attempts.lock().unwrap().push(notice.event_id.clone());

        if self.failing_ids.lock().unwrap().contains(&notice.event_id) {
            return Err(NotifyError::NotificationFailed {
                channel_id: 1,
                event_id: notice.event_id.clone(),
                source: Box::new(serenity::Error::Other("scripted failure")),
            });
        }

        self.delivered.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

type TestPoller = ActivityPoller<Arc<ScriptedFeed>, Arc<RecordingSink>>;

/// Shared fakes plus a temporary state directory for one test.
struct Harness {
    feed: Arc<ScriptedFeed>,
    sink: Arc<RecordingSink>,
    dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        Self {
            feed: Arc::new(ScriptedFeed::default()),
            sink: Arc::new(RecordingSink::default()),
            dir: TempDir::new().unwrap(),
        }
    }

    fn store(&self) -> CursorStore {
        CursorStore::new(self.dir.path().join("state.json"))
    }

    /// Persists cursors as if a previous process had written them.
    fn with_cursors(self, cursors: &[(&str, &str)]) -> Self {
        let map: CursorMap = cursors
            .iter()
            .map(|(server, last_id)| (server.to_string(), Cursor::at(*last_id)))
            .collect();
        self.store().save(&map).unwrap();
        self
    }

    fn persisted(&self) -> CursorMap {
        self.store().load()
    }

    fn poller(&self, servers: &[&str]) -> TestPoller {
        ActivityPoller::new(
            self.feed.clone(),
            self.sink.clone(),
            self.store(),
            servers
                .iter()
                .map(|identifier| TrackedServer::from_identifier(*identifier))
                .collect(),
        )
    }
}
