//! Starting a server under test, and talking to it.

use crate::utils::{logging::LogWatcher, metrics::MetricsWatcher};
use httpmock::MockServer;
use playreviews_settings::{ScraperConfig, Settings};
use reqwest::{redirect, Client, RequestBuilder};
use std::{future::Future, net::TcpListener};
use tracing::{
    instrument::{Instrument, WithSubscriber},
    subscriber::DefaultGuard,
};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Run `test` against a Play Reviews server listening on an OS assigned port.
///
/// The server's scraper gateway calls an [`httpmock::MockServer`] that starts
/// with no mocks, so scraper calls the test doesn't set up are answered with
/// 404, which reads as an unknown app. `settings_changer` runs after the
/// gateway is pointed at the mock.
///
/// ```no_run
/// # use playreviews_integration_tests::{reviews_test, TestingTools};
/// #[actix_rt::test]
/// async fn lbheartbeat() {
///     reviews_test(
///         |_| (),
///         |TestingTools { test_client, .. }| async move {
///             let response = test_client.get("/__lbheartbeat__").send().await.unwrap();
///             assert!(response.status().is_success());
///         },
///     )
///     .await
/// }
/// ```
///
/// # Panics
/// If the server can't be set up.
pub async fn reviews_test<FSettings, FTest, Fut>(
    settings_changer: FSettings,
    test: FTest,
) -> Fut::Output
where
    FSettings: FnOnce(&mut Settings),
    FTest: Fn(TestingTools) -> Fut,
    Fut: Future,
{
    let mut settings = Settings::load_for_tests(|_| ());
    let (log_watcher, _subscriber_guard) = install_log_watcher(&settings);

    let scraper_mock = MockServer::start_async().await;
    point_scraper_at(&mut settings, &scraper_mock);
    settings_changer(&mut settings);

    // Metrics go to the watcher, never to a socket.
    assert_eq!(
        (settings.metrics.sink_host.as_str(), settings.metrics.sink_port),
        ("0.0.0.0", 8125),
        "the metrics sink address is ignored in tests, so it must not be changed"
    );
    let (metrics_watcher, metrics_client) = MetricsWatcher::new_with_client();

    let listener = TcpListener::bind(settings.http.listen).expect("bind a test port");
    let test_client = TestReqwestClient::new(listener.local_addr().expect("bound address"));
    let server = playreviews_web::run(listener, metrics_client, settings).expect("start server");
    let server = tokio::spawn(server.with_current_subscriber());

    let output = test(TestingTools {
        test_client,
        scraper_mock,
        log_watcher,
        metrics_watcher,
    })
    .instrument(tracing::info_span!("reviews_test"))
    .await;

    server.abort();
    output
}

/// Send this thread's events to a new [`LogWatcher`] as JSON, and to the test
/// output as pretty text. Events stop going to the watcher once the guard is
/// dropped.
fn install_log_watcher(settings: &Settings) -> (LogWatcher, DefaultGuard) {
    let log_watcher = LogWatcher::default();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from(&settings.logging.levels))
        .with(tracing_subscriber::fmt::layer().json().with_writer(log_watcher.clone()))
        .with(tracing_subscriber::fmt::layer().pretty().with_test_writer());

    let guard = tracing::subscriber::set_default(subscriber);
    (log_watcher, guard)
}

/// Make the scraper gateway call `mock` in place of a real scraper.
fn point_scraper_at(settings: &mut Settings, mock: &MockServer) {
    let ScraperConfig::Http(config) = &mut settings.scraper else {
        panic!("test settings must use the HTTP scraper");
    };
    config.base_url = format!("{}/", mock.base_url())
        .parse()
        .expect("mock server URL is valid");
}

/// What a test gets to work with.
///
/// Non-exhaustive, so destructuring needs a `..` and new tools don't break
/// old tests.
#[non_exhaustive]
pub struct TestingTools {
    /// Sends requests to the server under test.
    pub test_client: TestReqwestClient,

    /// Stands in for the store scraper. Tests add the routes they need.
    pub scraper_mock: MockServer,

    /// Log events from the test's own thread.
    pub log_watcher: LogWatcher,

    /// Metrics sent by the server.
    pub metrics_watcher: MetricsWatcher,
}

/// A [`reqwest::Client`] bound to the server under test. It doesn't follow
/// redirects, and only sends `GET`, which is all the API has.
pub struct TestReqwestClient {
    /// The wrapped client.
    client: Client,
    /// Where the server under test listens.
    address: std::net::SocketAddr,
}

impl TestReqwestClient {
    /// A client for the server at `address`.
    pub fn new(address: std::net::SocketAddr) -> Self {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .expect("build test client");
        Self { client, address }
    }

    /// A GET request for `path`, such as `/app?appid=com.whatsapp`.
    pub fn get(&self, path: &str) -> RequestBuilder {
        assert!(path.starts_with('/'), "paths must be absolute: {}", path);
        self.client.get(format!("http://{}{}", self.address, path))
    }
}
