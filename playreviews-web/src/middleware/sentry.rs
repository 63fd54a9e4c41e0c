//! Reporting server errors to Sentry.

use crate::errors::HandlerError;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures_util::future::LocalBoxFuture;
use sentry::protocol::{Event, Exception, Level};
use std::{
    error::Error as StdError,
    future::{ready, Ready},
    iter,
};

/// Sends an event to Sentry for every response carrying a 5xx
/// [`HandlerError`]. Client errors are left out.
#[derive(Debug, Default)]
pub struct ErrorReporting;

impl<S> Transform<S, ServiceRequest> for ErrorReporting
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorReportingMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorReportingMiddleware { service }))
    }
}

/// The service built by [`ErrorReporting`].
#[derive(Debug)]
pub struct ErrorReportingMiddleware<S> {
    /// The wrapped service.
    service: S,
}

impl<S> Service<ServiceRequest> for ErrorReportingMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse, Error = Error>,
    S::Future: 'static,
{
    type Response = ServiceResponse;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, request: ServiceRequest) -> Self::Future {
        let hub = sentry::Hub::current();
        let route = request.match_pattern();
        let method = request.method().to_string();
        let response = self.service.call(request);

        Box::pin(async move {
            let response = response.await?;

            let handler_error = response
                .response()
                .error()
                .and_then(|error| error.as_error::<HandlerError>())
                .filter(|error| error.kind().status_code().is_server_error());
            if let Some(handler_error) = handler_error {
                let mut event = event_from_error(handler_error);
                event.transaction = route;
                event.tags.insert("http.method".to_string(), method);
                let event_id = hub.capture_event(event);
                tracing::debug!(r#type = "web.sentry.captured", %event_id, "Reported error to Sentry");
            }

            Ok(response)
        })
    }
}

/// Build an event for `error` and everything in its source chain, innermost
/// first. `sentry::event_from_error` can't see the backtrace a
/// [`HandlerError`] carries, so this one attaches it.
pub fn event_from_error(error: &HandlerError) -> Event<'static> {
    let mut exceptions: Vec<Exception> =
        iter::successors(Some(error as &(dyn StdError + 'static)), |e| (*e).source())
            .map(|e| match e.downcast_ref::<HandlerError>() {
                Some(handler_error) => exception_with_stacktrace(handler_error),
                None => exception(e),
            })
            .collect();
    exceptions.reverse();

    Event {
        exception: exceptions.into(),
        level: Level::Error,
        ..Default::default()
    }
}

/// [`exception`] plus the stack trace captured when `error` was made.
fn exception_with_stacktrace(error: &HandlerError) -> Exception {
    let mut exception = exception(error);
    // The alternate format includes frame addresses.
    exception.stacktrace = sentry_backtrace::parse_stacktrace(&format!("{:#?}", error.backtrace));
    exception
}

/// An exception typed by the error's `Debug` name.
fn exception(error: &(dyn StdError + 'static)) -> Exception {
    Exception {
        ty: sentry::parse_type_from_debug(&format!("{:?}", error)).to_owned(),
        value: Some(error.to_string()),
        ..Default::default()
    }
}
