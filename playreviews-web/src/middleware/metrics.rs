//! Request timing, sent to statsd.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::StatusCode,
    web::Data,
    Error,
};
use cadence::{StatsdClient, Timed};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    time::{Duration, Instant},
};

/// Times every request as `request.duration`, tagged with the route pattern
/// and the response status.
///
/// The client is read from the app data as `Data<StatsdClient>`. Without
/// one, nothing is recorded.
pub struct RequestMetrics;

impl<S> Transform<S, ServiceRequest> for RequestMetrics
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type Transform = RequestMetricsMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestMetricsMiddleware { service }))
    }
}

/// The service built by [`RequestMetrics`].
pub struct RequestMetricsMiddleware<S> {
    /// The wrapped service.
    service: S,
}

impl<S> Service<ServiceRequest> for RequestMetricsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, request: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let route = request
            .match_pattern()
            .unwrap_or_else(|| "unmatched".to_string());
        let metrics_client = request.app_data::<Data<StatsdClient>>().cloned();
        let response = self.service.call(request);

        Box::pin(async move {
            let response = response.await;
            let status = match &response {
                Ok(response) => response.status(),
                Err(error) => error.as_response_error().status_code(),
            };
            match metrics_client {
                Some(client) => record(&client, &route, status, started.elapsed()),
                None => tracing::debug!(
                    r#type = "web.metrics.no-client",
                    %route,
                    "No metrics client to time the request with"
                ),
            }
            response
        })
    }
}

/// Send one request timing.
fn record(client: &StatsdClient, route: &str, status: StatusCode, elapsed: Duration) {
    let sent = client
        .time_with_tags("request.duration", elapsed)
        .with_tag("path", route)
        .with_tag("status", status.as_str())
        .try_send();
    if let Err(error) = sent {
        tracing::warn!(r#type = "web.metrics.send-error", %error, "Could not time request");
    }
}

#[cfg(test)]
mod tests {
    use super::record;
    use actix_web::http::StatusCode;
    use cadence::{SpyMetricSink, StatsdClient};
    use std::time::Duration;

    #[test]
    fn timings_are_tagged_with_route_and_status() {
        let (rx, sink) = SpyMetricSink::new();
        let client = StatsdClient::from_sink("playreviews", sink);

        record(&client, "/app/info", StatusCode::NOT_FOUND, Duration::from_millis(12));

        let sent = String::from_utf8(rx.try_recv().expect("a metric was sent")).unwrap();
        assert_eq!(
            sent,
            "playreviews.request.duration:12|ms|#path:/app/info,status:404"
        );
    }
}
