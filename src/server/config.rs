use std::{path::PathBuf, time::Duration};

use url::Url;

use crate::server::{
    error::{config::ConfigError, AppError},
    util::parse::{expand_home, parse_env_list, parse_u64_from_str},
};

const DEFAULT_PANEL_URL: &str = "https://panel.craftersland.org";
const DEFAULT_ACTIVITY_CHANNEL_ID: &str = "1444078030417952900";
const DEFAULT_POLL_SECONDS: u64 = 30;
const DEFAULT_STATE_FILE_NAME: &str = ".packbot_state.json";

/// Upper bound the panel accepts for `per_page` on activity feeds.
pub const MAX_PAGE_SIZE: u32 = 50;

pub struct Config {
    pub discord_token: String,

    /// Activity poller settings, `None` when the poller cannot run.
    pub poller: Option<PollerConfig>,
}

/// Settings consumed by the panel activity poller.
#[derive(Debug, Clone, PartialEq)]
pub struct PollerConfig {
    /// Panel base URL without a trailing slash.
    pub panel_url: String,
    /// Client API key used for per-server activity feeds.
    pub client_key: String,
    /// Application API key used to discover servers when no identifiers are configured.
    pub application_key: Option<String>,
    /// Statically configured server identifiers.
    pub server_identifiers: Vec<String>,
    /// Discord channel receiving activity notices.
    pub channel_id: u64,
    /// Time between two polling passes.
    pub poll_interval: Duration,
    /// Page size requested on warm polls, within `1..=MAX_PAGE_SIZE`.
    pub page_size: u32,
    /// Location of the persisted state document.
    pub state_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok())?)
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// `from_env` delegates here with the process environment; tests pass a map.
    ///
    /// # Arguments
    /// - `lookup` - Returns the value of a variable, or `None` when unset
    ///
    /// # Returns
    /// - `Ok(Config)` - Configuration, with `poller` disabled when its inputs are unusable
    /// - `Err(ConfigError::MissingEnvVar)` - `DISCORD_TOKEN` is not set
    /// - `Err(ConfigError::InvalidEnvVar)` - A numeric or URL variable is malformed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("DISCORD_TOKEN".to_string()))?;

        Ok(Self {
            discord_token,
            poller: PollerConfig::from_lookup(&lookup)?,
        })
    }
}

impl PollerConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let panel_url = parse_panel_url(
            lookup("PTERO_BASE_URL").unwrap_or_else(|| DEFAULT_PANEL_URL.to_string()),
        )?;
        let poll_seconds = parse_number("PTERO_POLL_SECONDS", lookup, DEFAULT_POLL_SECONDS)?;
        if poll_seconds == 0 {
            return Err(ConfigError::InvalidEnvVar {
                name: "PTERO_POLL_SECONDS".to_string(),
                value: poll_seconds.to_string(),
                reason: "interval must be at least one second".to_string(),
            });
        }
        let page_size = parse_number("PTERO_PAGE_SIZE", lookup, MAX_PAGE_SIZE as u64)?
            .clamp(1, MAX_PAGE_SIZE as u64) as u32;

        let home = lookup("HOME");
        let state_file = match lookup("STATE_FILE").filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => expand_home(raw.trim(), home.as_deref()),
            None => home
                .map(PathBuf::from)
                .unwrap_or_default()
                .join(DEFAULT_STATE_FILE_NAME),
        };

        let Some(client_key) = lookup("PTERO_CLIENT_API_KEY").filter(|key| !key.is_empty())
        else {
            tracing::info!("Panel activity poller disabled (missing PTERO_CLIENT_API_KEY)");
            return Ok(None);
        };

        let raw_channel = lookup("PTERO_ACTIVITY_CHANNEL_ID")
            .unwrap_or_else(|| DEFAULT_ACTIVITY_CHANNEL_ID.to_string());
        let Some(channel_id) = parse_u64_from_str(&raw_channel).filter(|id| *id != 0) else {
            tracing::info!(
                "Panel activity poller disabled (invalid PTERO_ACTIVITY_CHANNEL_ID '{}')",
                raw_channel
            );
            return Ok(None);
        };

        Ok(Some(Self {
            panel_url,
            client_key,
            application_key: lookup("PTERO_APPLICATION_API_KEY").filter(|key| !key.is_empty()),
            server_identifiers: parse_env_list(lookup("PTERO_SERVER_IDENTIFIERS").as_deref()),
            channel_id,
            poll_interval: Duration::from_secs(poll_seconds),
            page_size,
            state_file,
        }))
    }
}

fn parse_panel_url(raw: String) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/').to_string();
    Url::parse(&trimmed).map_err(|e| ConfigError::InvalidEnvVar {
        name: "PTERO_BASE_URL".to_string(),
        value: raw.clone(),
        reason: e.to_string(),
    })?;

    Ok(trimmed)
}

fn parse_number<F>(name: &str, lookup: &F, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).filter(|raw| !raw.trim().is_empty()) {
        None => Ok(default),
        Some(raw) => parse_u64_from_str(&raw).ok_or_else(|| ConfigError::InvalidEnvVar {
            name: name.to_string(),
            value: raw,
            reason: "expected a non-negative integer".to_string(),
        }),
    }
}
