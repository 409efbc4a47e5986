use serde_json::json;
use std::{path::PathBuf, time::Duration};
use test_utils::{
    builder::TestBuilder,
    error::TestError,
    factory::{self, activity::ActivityFactory, server::ServerFactory},
};
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, ResponseTemplate,
};

use crate::server::{
    config::PollerConfig,
    error::panel::{FetchCause, PanelError},
    model::activity::TrackedServer,
    service::panel::PanelClient,
};


const CLIENT_KEY: &str = "ptlc_test";
const APPLICATION_KEY: &str = "ptla_test";

fn client(base_url: &str, application_key: Option<&str>) -> PanelClient {
    PanelClient::new(
        reqwest::Client::new(),
        base_url,
        CLIENT_KEY,
        application_key.map(str::to_string),
    )
}

fn poller_config(base_url: &str, identifiers: &[&str], application_key: Option<&str>) -> PollerConfig {
    PollerConfig {
        panel_url: base_url.to_string(),
        client_key: CLIENT_KEY.to_string(),
        application_key: application_key.map(str::to_string),
        server_identifiers: identifiers.iter().map(|id| id.to_string()).collect(),
        channel_id: 1,
        poll_interval: Duration::from_secs(30),
        page_size: 50,
        state_file: PathBuf::from("unused.json"),
    }
}
