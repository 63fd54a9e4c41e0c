//! The request span, and the one event logged when a request finishes.

use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    Error, HttpMessage,
};
use tracing::{field, Span};
use tracing_actix_web::{RequestId, RootSpanBuilder};

/// Opens a span per request with the route pattern rather than the raw path,
/// and closes it with an event leveled by the response status.
pub struct PlayReviewsRootSpanBuilder;

impl RootSpanBuilder for PlayReviewsRootSpanBuilder {
    fn on_request_start(request: &ServiceRequest) -> Span {
        let route = request
            .match_pattern()
            .unwrap_or_else(|| "unmatched".to_string());
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(ToString::to_string)
            .unwrap_or_default();
        let target = request
            .uri()
            .path_and_query()
            .map_or_else(String::new, ToString::to_string);

        tracing::info_span!(
            "HTTP request",
            http.method = %request.method(),
            http.route = %route,
            http.target = %target,
            http.status_code = field::Empty,
            request_id = %request_id,
            exception.message = field::Empty,
            exception.details = field::Empty,
        )
    }

    fn on_request_end<B: MessageBody>(span: Span, outcome: &Result<ServiceResponse<B>, Error>) {
        let error = match outcome {
            Ok(response) => response.response().error(),
            Err(error) => Some(error),
        };
        let status = match (outcome, error) {
            (_, Some(error)) => record_error(&span, error),
            (Ok(response), None) => response.status(),
            (Err(_), None) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        span.record("http.status_code", status.as_u16());

        let _entered = span.enter();
        let status_code = status.as_u16();
        if status.is_server_error() {
            tracing::error!(r#type = "web.request", status_code, "Request server error");
        } else if status.is_client_error() {
            tracing::warn!(r#type = "web.request", status_code, "Request client error");
        } else {
            tracing::info!(r#type = "web.request", status_code, "Request success");
        }
    }
}

/// Put `error` on the request span, returning the status it maps to.
fn record_error(span: &Span, error: &Error) -> StatusCode {
    let response_error = error.as_response_error();
    span.record("exception.message", field::display(response_error));
    span.record("exception.details", field::debug(response_error));
    response_error.status_code()
}
