use serde_json::Value;

use crate::{context::TestContext, error::TestError};

/// Builder for creating test contexts with a mock panel and seeded state.
///
/// Provides a fluent interface for configuring the mock panel's responses and the state
/// file a previous process would have left behind. Call `build()` to start the panel and
/// create the configured test context.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::{builder::TestBuilder, factory};
///
/// let test = TestBuilder::new()
///     .with_activity("sb4", factory::create_activity_page(&["107", "106"]))
///     .with_servers(vec![vec![factory::create_server("sb4", "StoneBlock 4")]])
///     .build()
///     .await?;
/// ```
pub struct TestBuilder {
    /// Whether the mock panel is started even without mounted responses.
    panel: bool,
    /// Activity pages to mount, keyed by server identifier.
    activities: Vec<(String, Vec<Value>)>,
    /// Server listing pages to mount, in page order.
    server_pages: Option<Vec<Vec<Value>>>,
    /// State document written before the test runs.
    state: Option<Value>,
}

impl TestBuilder {
    /// Creates a new test builder with nothing configured.
    ///
    /// # Returns
    /// - New `TestBuilder` instance
    pub fn new() -> Self {
        Self {
            panel: false,
            activities: Vec::new(),
            server_pages: None,
            state: None,
        }
    }

    /// Starts the mock panel without any mounted responses.
    ///
    /// Unmatched requests get wiremock's default 404, which is useful for failure tests.
    pub fn with_panel(mut self) -> Self {
        self.panel = true;
        self
    }

    /// Serves an activity page for one server.
    ///
    /// # Arguments
    /// - `identifier` - Panel server identifier
    /// - `entries` - `activity_log` objects, newest first
    ///
    /// # Returns
    /// - `Self` - Builder instance for method chaining
    pub fn with_activity(mut self, identifier: impl Into<String>, entries: Vec<Value>) -> Self {
        self.panel = true;
        self.activities.push((identifier.into(), entries));
        self
    }

    /// Serves the paginated application server listing.
    ///
    /// # Arguments
    /// - `pages` - Server entries for each page, in order
    ///
    /// # Returns
    /// - `Self` - Builder instance for method chaining
    pub fn with_servers(mut self, pages: Vec<Vec<Value>>) -> Self {
        self.panel = true;
        self.server_pages = Some(pages);
        self
    }

    /// Seeds the state file with a raw document.
    pub fn with_state(mut self, document: Value) -> Self {
        self.state = Some(document);
        self
    }

    /// Builds the test context.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Context with the panel running and state written
    /// - `Err(TestError)` - Temporary directory or state file setup failed
    pub async fn build(self) -> Result<TestContext, TestError> {
        let mut setup = TestContext::new()?;

        if self.panel {
            setup.panel().await;
        }
        for (identifier, entries) in self.activities {
            setup.mount_activity(&identifier, entries).await;
        }
        if let Some(pages) = self.server_pages {
            setup.mount_servers(pages).await;
        }
        if let Some(document) = self.state {
            setup.write_state(&document)?;
        }

        Ok(setup)
    }
}

impl Default for TestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
