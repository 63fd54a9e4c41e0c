#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Web server for [Play Reviews](../playreviews/index.html)'s public API.

mod debug;
mod dockerflow;
mod docs;
mod endpoints;
mod envelope;
mod errors;
mod logging;
mod middleware;

use crate::{
    dockerflow::ServerStart,
    envelope::ErrorEnvelope,
    errors::HandlerErrorKind,
    logging::PlayReviewsRootSpanBuilder,
};
use actix_cors::Cors;
use actix_web::{
    dev::Server,
    http::StatusCode,
    web::{self, Data},
    App, HttpRequest, HttpResponse, HttpServer,
};
use anyhow::Context;
use cadence::StatsdClient;
use playreviews_aggregate::ReviewAggregator;
use playreviews_scraper::{make_gateway, ScraperGateway};
use playreviews_settings::Settings;
use std::{net::TcpListener, sync::Arc, time::Instant};
use tracing_actix_web::TracingLogger;

/// Run the web server
///
/// The returned server is a `Future` that must either be `.await`ed, or run it
/// as a background task using `tokio::spawn`.
///
/// Most of the details from `settings` will be respected, except for those that
/// go into building the listener (the host and port). If you want to respect the
/// settings specified in that object, you must include them in the construction
/// of `listener`.
///
/// # Errors
///
/// Returns an error if the scraper gateway cannot be set up, or if the server
/// cannot be started on the provided listener.
///
/// # Examples
///
/// Run the server in the foreground. This will only return if there is an error
/// that causes the server to shut down. This is used to run the service in
/// production.
///
/// ```no_run
/// # actix_rt::System::new().block_on(async {
/// let listener = std::net::TcpListener::bind("127.0.0.1:8080")
///     .expect("Failed to bind port");
/// let settings = playreviews_settings::Settings::load()
///     .expect("Failed to load settings");
/// let metrics_client = cadence::StatsdClient::from_sink("playreviews", cadence::NopMetricSink);
/// playreviews_web::run(listener, metrics_client, settings)
///     .expect("Failed to start server")
///     .await
///     .expect("Fatal error while running server");
/// # })
/// ```
pub fn run(
    listener: TcpListener,
    metrics_client: StatsdClient,
    settings: Settings,
) -> anyhow::Result<Server> {
    let num_workers = settings.http.workers;

    let gateway = make_gateway(&settings).context("Setting up the scraper gateway")?;
    let metrics_client = Data::new(metrics_client);
    let aggregator = Data::new(ReviewAggregator::new(
        Arc::clone(&gateway),
        settings.reviews.clone(),
        metrics_client.clone().into_inner(),
    ));
    let gateway: Data<dyn ScraperGateway> = Data::from(gateway);
    let started = Data::new(ServerStart(Instant::now()));
    let settings = Data::new(settings);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(settings.clone())
            .app_data(aggregator.clone())
            .app_data(gateway.clone())
            .app_data(started.clone())
            .app_data(metrics_client.clone())
            .app_data(web::QueryConfig::default().error_handler(|error, _request| {
                HandlerErrorKind::Validation(format!("Invalid query string: {}", error)).into()
            }))
            .wrap(middleware::RequestMetrics)
            .wrap(middleware::ErrorReporting)
            .wrap(middleware::security_headers())
            .wrap(Cors::permissive())
            .wrap(TracingLogger::<PlayReviewsRootSpanBuilder>::new())
            // The reviews API
            .service(
                web::scope("/app")
                    .configure(endpoints::configure)
                    .default_service(web::to(route_not_found)),
            )
            // Add some debugging views
            .service(
                web::scope("/debug")
                    .configure(debug::configure)
                    .default_service(web::to(route_not_found)),
            )
            .configure(docs::configure)
            .configure(dockerflow::configure)
            .default_service(web::to(route_not_found))
    })
    .listen(listener)?;

    if let Some(n) = num_workers {
        server = server.workers(n);
    }

    let server = server.run();
    Ok(server)
}

/// The response for paths no route matches.
pub(crate) async fn route_not_found(request: HttpRequest) -> HttpResponse {
    ErrorEnvelope::new(StatusCode::NOT_FOUND, "Route not found")
        .with_request(request.path(), request.method().as_str())
        .into_response()
}
