use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use crate::error::TestError;

/// File name of the bot state document inside the test directory.
pub const STATE_FILE_NAME: &str = "state.json";

/// Test context containing the mock panel and an isolated state directory.
///
/// The mock panel is started lazily on first access and lives as long as the context.
/// The temporary directory is removed when the context is dropped.
pub struct TestContext {
    /// Optional mock panel HTTP server.
    ///
    /// Initialized lazily when `panel()` is first called.
    pub panel: Option<MockServer>,

    /// Temporary directory holding the state file.
    pub dir: TempDir,
}

impl TestContext {
    /// Creates a new test context with an empty temporary directory.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Context without a running panel
    /// - `Err(TestError::Io)` - Temporary directory could not be created
    pub fn new() -> Result<Self, TestError> {
        Ok(Self {
            panel: None,
            dir: TempDir::new()?,
        })
    }

    /// Gets or starts the mock panel server.
    ///
    /// # Returns
    /// - `&MockServer` - Reference to the running mock panel
    pub async fn panel(&mut self) -> &MockServer {
        match self.panel {
            Some(ref panel) => panel,
            None => {
                let panel = MockServer::start().await;
                &*self.panel.insert(panel)
            }
        }
    }

    /// Base URL of the mock panel.
    ///
    /// # Returns
    /// - `Ok(String)` - URL such as `http://127.0.0.1:PORT`
    /// - `Err(TestError::NotConfigured)` - The panel was never started
    pub fn panel_url(&self) -> Result<String, TestError> {
        self.panel
            .as_ref()
            .map(MockServer::uri)
            .ok_or(TestError::NotConfigured("mock panel"))
    }

    /// Path of the state file inside the temporary directory.
    ///
    /// The file does not exist until something writes it.
    pub fn state_path(&self) -> PathBuf {
        self.dir.path().join(STATE_FILE_NAME)
    }

    /// Writes a raw state document, as a previous process would have left it.
    ///
    /// # Arguments
    /// - `document` - Whole state file contents
    ///
    /// # Returns
    /// - `Ok(())` - File written
    /// - `Err(TestError)` - Serialization or write failure
    pub fn write_state(&self, document: &Value) -> Result<(), TestError> {
        let contents = serde_json::to_string_pretty(document)?;
        std::fs::write(self.state_path(), contents)?;
        Ok(())
    }

    /// Reads the state document back, if one has been written.
    pub fn read_state(&self) -> Result<Option<Value>, TestError> {
        match std::fs::read_to_string(self.state_path()) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Serves an activity page for one server on the client API.
    ///
    /// The same newest-first entries are returned regardless of `per_page`.
    ///
    /// # Arguments
    /// - `identifier` - Panel server identifier
    /// - `entries` - `activity_log` objects, newest first
    pub async fn mount_activity(&mut self, identifier: &str, entries: Vec<Value>) {
        let body = json!({ "object": "list", "data": entries });
        Mock::given(method("GET"))
            .and(path(format!("/api/client/servers/{}/activity", identifier)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(self.panel().await)
            .await;
    }

    /// Serves the paginated application server listing.
    ///
    /// Page `n` (1-based) returns `pages[n - 1]`; every page but the last carries a
    /// `next` link.
    ///
    /// # Arguments
    /// - `pages` - Server entries for each page, in order
    pub async fn mount_servers(&mut self, pages: Vec<Vec<Value>>) {
        let base = self.panel().await.uri();
        let total = pages.len();

        for (index, entries) in pages.into_iter().enumerate() {
            let page = index + 1;
            let next = (page < total)
                .then(|| format!("{}/api/application/servers?page={}", base, page + 1));
            let body = json!({
                "object": "list",
                "data": entries,
                "meta": {
                    "pagination": {
                        "current_page": page,
                        "total_pages": total,
                        "links": { "next": next }
                    }
                }
            });

            Mock::given(method("GET"))
                .and(path("/api/application/servers"))
                .and(query_param("page", page.to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(self.panel().await)
                .await;
        }
    }
}
