#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! # Play Reviews Settings
//!
//! Settings are read from these sources, each overriding the ones before it:
//!
//! 1. `config/base.yaml`, which has a value for nearly everything.
//! 2. `config/${PLAYREVIEWS_ENV}.yaml`, when it exists. `PLAYREVIEWS_ENV`
//!    defaults to `development`, and `production` is the other environment
//!    shipped with the repository.
//! 3. `config/local.yaml`, when it exists. Git ignores it, so it can hold
//!    secrets for a developer machine.
//! 4. `PLAYREVIEWS_` environment variables, with `__` between levels:
//!    `PLAYREVIEWS_HTTP__WORKERS` sets `http.workers` and
//!    `PLAYREVIEWS_REVIEWS__DEFAULT_COUNTRY` sets `reviews.default_country`.
//!
//! [`Settings::load_for_tests`] reads `config/base.yaml`, `config/test.yaml`
//! and an optional `config/local_test.yaml`, and ignores the environment.
//!
//! The files may be in any format the [config] crate reads, picked by
//! extension, so `config/local.toml` works as well as `config/local.yaml`.

mod logging;
pub mod scraper;

pub use logging::{LogFormat, LoggingSettings};
pub use scraper::{FixtureScraperConfig, HttpScraperConfig, RetrySettings, ScraperConfig};

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use sentry::types::Dsn;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use std::{net::SocketAddr, time::Duration};
use url::Url;

/// Top level settings object for Play Reviews.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[doc(inline)]
pub struct Settings {
    /// The environment the service is running in. Should only be set with the
    /// `PLAYREVIEWS_ENV` environment variable.
    pub env: String,

    /// Turns on `/debug/settings` and `/__error__`. Never on in production.
    pub debug: bool,

    /// URL to redirect to from the root of the service. If `None`, the root
    /// returns a short description of the service instead.
    pub public_documentation: Option<Url>,

    /// Settings for the HTTP server.
    pub http: HttpSettings,

    /// Logging settings.
    pub logging: LoggingSettings,

    /// Metrics settings.
    pub metrics: MetricsSettings,

    /// Settings for error reporting.
    pub sentry: SentrySettings,

    /// Where raw store data comes from.
    pub scraper: ScraperConfig,

    /// Settings for review aggregation.
    pub reviews: ReviewsSettings,
}

/// Settings for the HTTP server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Address to bind, like `0.0.0.0:8080`. Port 0 picks a free port.
    pub listen: SocketAddr,

    /// Worker threads to run. Defaults to one per logical core.
    pub workers: Option<usize>,
}

/// Settings for the statsd metrics sink.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// The host to send metrics to. Usually a local statsd agent.
    pub sink_host: String,

    /// The UDP port the statsd agent listens on.
    pub sink_port: u16,

    /// The maximum size, in kilobytes, of the queue in front of the UDP sink.
    /// Metrics past this limit are dropped.
    pub max_queue_size_kb: usize,
}

/// Error reporting via Sentry.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SentrySettings {
    /// Don't report errors.
    Disabled,

    /// Report errors to the given DSN.
    Release {
        /// The Sentry DSN to report to.
        dsn: String,
    },

    /// Report errors, and also log every event sent at DEBUG level. If no DSN
    /// is given, events are only logged.
    Debug {
        /// An optional Sentry DSN to report to.
        dsn: Option<String>,
    },
}

impl SentrySettings {
    /// The DSN to report to, if any. An unparsable DSN disables reporting.
    pub fn dsn(&self) -> Option<Dsn> {
        let raw = match self {
            Self::Disabled => None,
            Self::Release { dsn } => Some(dsn.as_str()),
            Self::Debug { dsn } => dsn.as_deref(),
        }?;
        match raw.parse() {
            Ok(dsn) => Some(dsn),
            Err(error) => {
                tracing::error!(%error, r#type = "settings.sentry.bad-dsn", "Invalid Sentry DSN");
                None
            }
        }
    }

    /// Whether Sentry's debug mode should be on.
    pub fn debug(&self) -> bool {
        matches!(self, Self::Debug { .. })
    }
}

/// Settings for fetching and shaping reviews.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewsSettings {
    /// The country used when a request doesn't specify one, as an ISO 3166-1
    /// alpha-2 code.
    pub default_country: String,

    /// The language used when a request doesn't specify one. If `None`,
    /// requests without a language fetch every language likely to be used in
    /// the requested country.
    pub default_language: Option<String>,

    /// How many reviews to request from the store per language.
    pub page_size: usize,

    /// The maximum number of per-language fetches in flight for one request.
    pub fan_out_concurrency: usize,

    /// Whether fanned-out results are sorted newest first.
    pub sort_fan_out: bool,

    /// The time allowed for a whole review request, across all languages.
    #[serde_as(as = "DurationSeconds")]
    #[serde(rename = "request_timeout_sec")]
    pub request_timeout: Duration,

    /// The time allowed for one language of a fan-out, retries included. A
    /// language that takes longer is skipped.
    #[serde_as(as = "DurationSeconds")]
    #[serde(rename = "language_timeout_sec")]
    pub language_timeout: Duration,

    /// How long a fan-out waits for languages before answering with what it
    /// has. Must be less than `request_timeout`.
    #[serde_as(as = "DurationSeconds")]
    #[serde(rename = "fan_out_deadline_sec")]
    pub fan_out_deadline: Duration,
}

impl ReviewsSettings {
    /// Check the settings that depend on each other.
    ///
    /// # Errors
    /// If a fan-out could outlast the whole request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fan_out_deadline >= self.request_timeout {
            return Err(ConfigError::Message(format!(
                "reviews.fan_out_deadline_sec ({}) must be less than reviews.request_timeout_sec ({})",
                self.fan_out_deadline.as_secs(),
                self.request_timeout.as_secs()
            )));
        }
        Ok(())
    }
}

impl Settings {
    /// Load settings from the config files and `PLAYREVIEWS_` environment
    /// variables.
    ///
    /// # Errors
    /// If a required file is missing, or a value doesn't fit its setting.
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("PLAYREVIEWS_ENV").unwrap_or_else(|_| "development".to_string());

        config_files("config", &env, "local")?
            .add_source(
                Environment::with_prefix("PLAYREVIEWS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Self>()
            .and_then(|settings| {
                settings.reviews.validate()?;
                Ok(settings)
            })
    }

    /// Load the test settings, then let `changer` adjust them.
    ///
    /// # Panics
    /// If the test settings can't be read.
    pub fn load_for_tests<F: FnOnce(&mut Self)>(changer: F) -> Self {
        let mut settings: Self = config_files("../config", "test", "local_test")
            .and_then(|builder| builder.build())
            .and_then(|config| config.try_deserialize::<Self>())
            .and_then(|settings| {
                settings.reviews.validate()?;
                Ok(settings)
            })
            .expect("test settings load");
        changer(&mut settings);
        settings
    }
}

/// The layered files in `dir`: `base`, then `env` (required only for tests),
/// then the optional git-ignored `local`. `env` is also recorded as the
/// `env` setting.
fn config_files(
    dir: &str,
    env: &str,
    local: &str,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let env_required = env == "test";
    Ok(Config::builder()
        .add_source(File::with_name(&format!("{}/base", dir)))
        .set_override("env", env)?
        .add_source(File::with_name(&format!("{}/{}", dir, env)).required(env_required))
        .add_source(File::with_name(&format!("{}/{}", dir, local)).required(false)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_load() {
        let settings = Settings::load_for_tests(|s| s.reviews.page_size = 17);
        assert_eq!(settings.env, "test");
        assert_eq!(settings.reviews.page_size, 17);
        assert_eq!(settings.reviews.default_country, "US");
        assert!(settings.reviews.default_language.is_none());
        assert!(matches!(settings.scraper, ScraperConfig::Http(_)));
    }

    #[test]
    fn fan_out_deadline_must_fit_the_request() {
        let settings = Settings::load_for_tests(|_| ());
        assert!(settings.reviews.validate().is_ok());
        assert!(settings.reviews.language_timeout < settings.reviews.fan_out_deadline);

        let mut reviews = settings.reviews;
        reviews.fan_out_deadline = reviews.request_timeout;
        let error = reviews.validate().unwrap_err();
        assert!(error.to_string().contains("fan_out_deadline_sec"));
    }

    #[test]
    fn sentry_dsn_is_parsed() {
        let settings = SentrySettings::Release {
            dsn: "https://key@sentry.example.com/42".to_string(),
        };
        let dsn = settings.dsn().expect("a valid DSN");
        assert_eq!(dsn.public_key(), "key");
        assert_eq!(dsn.host(), "sentry.example.com");
        assert_eq!(dsn.project_id().to_string(), "42");
        assert!(!settings.debug());

        assert!(SentrySettings::Disabled.dsn().is_none());
        assert!(SentrySettings::Debug { dsn: None }.debug());
        assert!(SentrySettings::Release {
            dsn: "not a dsn".to_string()
        }
        .dsn()
        .is_none());
    }
}
