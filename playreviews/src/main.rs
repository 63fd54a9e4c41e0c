// Only overview documentation that is not relevant to one of the more specific
// crates should go here.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! A web API that serves normalized Google Play reviews.
//!
//! Play Reviews is split into several subcrates that work in collaboration.
//!
//! - [playreviews-aggregate](../playreviews_aggregate/index.html)
//! - [playreviews-integration-tests](../playreviews_integration_tests/index.html)
//! - [playreviews-scraper](../playreviews_scraper/index.html)
//! - [playreviews-settings](../playreviews_settings/index.html)
//! - [playreviews-web](../playreviews_web/index.html)

mod docs;
mod sentry;

use anyhow::{Context, Result};
use cadence::{BufferedUdpMetricSink, QueuingMetricSink, StatsdClient};
use playreviews_settings::{LogFormat, Settings};
use std::net::{TcpListener, UdpSocket};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

/// Primary entry point
#[actix_rt::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("Loading settings")?;
    init_logging(&settings).context("Initializing logging")?;
    let _sentry_guard = sentry::init_sentry(&settings);
    let metrics_client = init_metrics(&settings).context("Initializing metrics")?;
    let listener = TcpListener::bind(settings.http.listen).context("Binding port")?;

    tracing::info!(
        r#type = "app.starting",
        address = %settings.http.listen,
        env = %settings.env,
        "Starting Play Reviews"
    );

    playreviews_web::run(listener, metrics_client, settings)
        .context("Starting playreviews-web server")?
        .await
        .context("Running playreviews-web server")?;

    Ok(())
}

/// Set up logging, based on settings and the `RUST_LOG` environment variable.
fn init_logging(settings: &Settings) -> Result<()> {
    LogTracer::init()?;
    let env_filter: EnvFilter = (&settings.logging.levels).into();
    let registry = tracing_subscriber::registry().with(env_filter);

    match settings.logging.format {
        LogFormat::Pretty => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().pretty()))?;
        }
        LogFormat::Compact => {
            tracing::subscriber::set_global_default(registry.with(fmt::layer().compact()))?;
        }
        LogFormat::Json => {
            tracing::subscriber::set_global_default(
                registry.with(fmt::layer().json().with_current_span(true)),
            )?;
        }
    }

    Ok(())
}

/// Build a Statsd client that sends metrics over UDP without blocking
/// requests.
fn init_metrics(settings: &Settings) -> Result<StatsdClient> {
    let socket = UdpSocket::bind("0.0.0.0:0").context("Binding metrics socket")?;
    socket.set_nonblocking(true)?;

    let sink_address = (settings.metrics.sink_host.as_str(), settings.metrics.sink_port);
    let udp_sink = BufferedUdpMetricSink::from(sink_address, socket)
        .context("Creating metrics sink")?;
    let queuing_sink =
        QueuingMetricSink::with_capacity(udp_sink, settings.metrics.max_queue_size_kb * 1024);

    Ok(StatsdClient::builder("playreviews", queuing_sink)
        .with_error_handler(|error| {
            tracing::warn!(r#type = "metrics.error", %error, "Could not send a metric");
        })
        .build())
}
