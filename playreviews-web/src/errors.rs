//! Handler errors, and how they become error envelopes.

use std::error::Error;
use std::fmt;

use crate::envelope::ErrorEnvelope;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use backtrace::Backtrace;
use playreviews_aggregate::{AggregateError, DateParseError};
use playreviews_scraper::ScraperError;
use thiserror::Error;

/// What every handler fails with: a [`HandlerErrorKind`] plus the backtrace
/// from where it was made, for Sentry.
pub struct HandlerError {
    /// What went wrong.
    kind: HandlerErrorKind,
    /// Captured on creation.
    pub(crate) backtrace: Backtrace,
}

/// The ways a request can fail. The `Display` text is the envelope's `error`.
#[derive(Error, Debug)]
pub enum HandlerErrorKind {
    /// Something broke that the client can't fix.
    #[error("Internal server error")]
    Internal,

    /// A query parameter is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The `date` filter couldn't be read.
    #[error(transparent)]
    DateParse(#[from] DateParseError),

    /// The store has no such app.
    #[error("App not found")]
    NotFound,

    /// The scraper failed. The message says what was being attempted.
    #[error("{message}")]
    Upstream {
        /// What the handler was trying to do.
        message: &'static str,
        /// Why the scraper failed.
        #[source]
        source: ScraperError,
    },

    /// The request took longer than the configured limit.
    #[error("Request timed out")]
    Timeout,
}

impl HandlerErrorKind {
    /// The response status.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) | Self::DateParse(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Upstream { .. } | Self::Timeout => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Extra information that is safe to show to clients. The full error
    /// chain goes to the logs only.
    fn details(&self) -> Option<String> {
        match self {
            Self::Upstream { source, .. } => Some(scraper_summary(source)),
            _ => None,
        }
    }
}

/// A fixed description of a scraper failure, without the URLs or messages of
/// the underlying error.
fn scraper_summary(error: &ScraperError) -> String {
    match error {
        ScraperError::Network(_) => "The store scraper could not be reached".to_string(),
        ScraperError::Upstream { status } => {
            format!("The store scraper responded with HTTP status {}", status)
        }
        ScraperError::AppNotFound => "The requested app was not found in the store".to_string(),
        ScraperError::Format(_) => "The store scraper returned data in an unexpected format".to_string(),
        ScraperError::InvalidConfiguration(_) => "The store scraper is misconfigured".to_string(),
    }
}

impl From<AggregateError> for HandlerErrorKind {
    fn from(error: AggregateError) -> Self {
        match error {
            AggregateError::DateParse(error) => Self::DateParse(error),
            AggregateError::Upstream(ScraperError::AppNotFound) => Self::NotFound,
            AggregateError::Upstream(source) => Self::Upstream {
                message: "Failed to fetch reviews",
                source,
            },
        }
    }
}

impl From<HandlerErrorKind> for actix_web::Error {
    fn from(kind: HandlerErrorKind) -> Self {
        let error: HandlerError = kind.into();
        error.into()
    }
}

impl HandlerError {
    /// What went wrong.
    pub fn kind(&self) -> &HandlerErrorKind {
        &self.kind
    }

    /// A bare 500.
    pub fn internal() -> Self {
        HandlerErrorKind::Internal.into()
    }

    /// A required query parameter was not given.
    pub fn missing(parameter: &str) -> Self {
        HandlerErrorKind::Validation(format!("Missing required parameter: {}", parameter)).into()
    }

    /// A query parameter was given, but is not usable.
    pub fn invalid(parameter: &str) -> Self {
        HandlerErrorKind::Validation(format!("Invalid parameter: {}", parameter)).into()
    }

    /// Report a scraper failure while doing `message`. Unknown apps are not
    /// found, everything else is the scraper's fault.
    pub fn scraper(message: &'static str, error: ScraperError) -> Self {
        match error {
            ScraperError::AppNotFound => HandlerErrorKind::NotFound.into(),
            source => HandlerErrorKind::Upstream { message, source }.into(),
        }
    }
}

impl Error for HandlerError {
    // The kind is this error's message, so its source is ours.
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.kind.source()
    }
}

impl<E> From<E> for HandlerError
where
    HandlerErrorKind: From<E>,
{
    fn from(error: E) -> Self {
        Self {
            kind: error.into(),
            backtrace: Backtrace::new(),
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sentry takes the exception type from the name before the first
        // brace, so it reads `HandlerError/Upstream` and events group by kind.
        fmt.debug_struct(&format!("HandlerError/{:?}", &self.kind))
            .field("kind", &self.kind)
            .field("backtrace", &self.backtrace)
            .finish()
    }
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        ErrorEnvelope::new(self.status_code(), self.kind().to_string())
            .with_details(self.kind().details())
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::{HandlerError, HandlerErrorKind};
    use actix_web::{body::to_bytes, http::StatusCode, ResponseError};
    use playreviews_aggregate::{AggregateError, DateParseError};
    use playreviews_scraper::ScraperError;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    async fn body_of(error: &HandlerError) -> Value {
        let bytes = to_bytes(error.error_response().into_body())
            .await
            .expect("readable body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[actix_rt::test]
    async fn validation_errors_name_the_parameter() {
        let error = HandlerError::missing("appid");
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        let body = body_of(&error).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!("Missing required parameter: appid"));
        assert_eq!(body["statusCode"], json!(400));
    }

    #[actix_rt::test]
    async fn upstream_errors_carry_details() {
        let error = HandlerError::scraper(
            "Failed to search for apps",
            ScraperError::Upstream { status: 502 },
        );
        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_of(&error).await;
        assert_eq!(body["error"], json!("Failed to search for apps"));
        assert!(body["details"].as_str().unwrap().contains("502"));
    }

    #[actix_rt::test]
    async fn network_details_hide_the_scraper_address() {
        let error = HandlerError::scraper(
            "Failed to fetch reviews",
            ScraperError::Network(anyhow::anyhow!(
                "error sending request for url (http://127.0.0.1:3001/reviews?appId=com.x.y)"
            )),
        );
        let body = body_of(&error).await;
        assert_eq!(body["details"], json!("The store scraper could not be reached"));
        assert!(!body.to_string().contains("127.0.0.1"));

        let error = HandlerError::scraper(
            "Failed to get app suggestions",
            ScraperError::Format(anyhow::anyhow!("expected value at line 1 column 1")),
        );
        let body = body_of(&error).await;
        assert_eq!(
            body["details"],
            json!("The store scraper returned data in an unexpected format")
        );
    }

    #[test]
    fn unknown_apps_are_not_found() {
        let error = HandlerError::scraper("Failed to fetch app information", ScraperError::AppNotFound);
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn internal_errors_are_generic() {
        let error = HandlerError::internal();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(&error).await;
        assert_eq!(body["error"], json!("Internal server error"));
        assert!(body.get("details").is_none());
    }

    #[test]
    fn aggregate_errors_map_to_statuses() {
        let date: HandlerError = AggregateError::DateParse(DateParseError {
            expr: "soon".to_string(),
        })
        .into();
        assert_eq!(date.status_code(), StatusCode::BAD_REQUEST);
        assert!(date.to_string().starts_with("Invalid date format: soon."));

        let upstream: HandlerError =
            AggregateError::Upstream(ScraperError::Upstream { status: 503 }).into();
        assert_eq!(upstream.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(upstream.to_string(), "Failed to fetch reviews");

        let unknown: HandlerError = AggregateError::Upstream(ScraperError::AppNotFound).into();
        assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(unknown.to_string(), "App not found");

        let timeout: HandlerError = HandlerErrorKind::Timeout.into();
        assert_eq!(timeout.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
