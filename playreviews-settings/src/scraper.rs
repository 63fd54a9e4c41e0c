//! Settings for the store scraper.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::{path::PathBuf, time::Duration};
use url::Url;

/// Where raw store data comes from.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScraperConfig {
    /// Query a scraper sidecar over HTTP.
    Http(HttpScraperConfig),
    /// Serve canned data from a JSON file. Only available when `debug` is on.
    Fixture(FixtureScraperConfig),
}

/// Settings for the HTTP scraper.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpScraperConfig {
    /// The root of the scraper sidecar. Routes such as `reviews` and `app` are
    /// resolved relative to this URL, so it should end with a slash.
    pub base_url: Url,

    /// How long to wait for a connection to the sidecar.
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(rename = "connect_timeout_ms")]
    pub connect_timeout: Duration,

    /// How long a single upstream call may take, including reading the body.
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(rename = "request_timeout_ms")]
    pub request_timeout: Duration,

    /// The user agent sent upstream.
    pub user_agent: String,

    /// How failed calls are retried.
    pub retry: RetrySettings,
}

impl Default for HttpScraperConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://127.0.0.1:3001/").expect("static URL is valid"),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("playreviews/{}", env!("CARGO_PKG_VERSION")),
            retry: RetrySettings::default(),
        }
    }
}

/// Retry behavior for transient upstream failures.
///
/// Attempt `n` (counting from 1) that fails with a transient error is followed
/// by a pause of `base_delay * 2^(n-1)`, capped at `max_delay`.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts, including the first one. Zero is treated as one.
    pub max_attempts: u32,

    /// The pause after the first failed attempt.
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(rename = "base_delay_ms")]
    pub base_delay: Duration,

    /// The longest pause between attempts.
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(rename = "max_delay_ms")]
    pub max_delay: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

/// Settings for the fixture scraper.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FixtureScraperConfig {
    /// The JSON file holding the canned data.
    pub path: PathBuf,
}
