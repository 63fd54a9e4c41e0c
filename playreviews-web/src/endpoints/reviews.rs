//! `GET /app`: the reviews of one app.

use crate::{
    endpoints::params::{self, ReviewParams},
    envelope::Envelope,
    errors::{HandlerError, HandlerErrorKind},
};
use actix_web::{
    get,
    web::{self, Data},
    HttpResponse,
};
use playreviews_aggregate::{ReviewAggregator, ReviewQuery};
use playreviews_settings::Settings;

/// Fetch the reviews of an app, either in one language or in every likely
/// language of its country.
#[get("")]
#[tracing::instrument(skip(params, aggregator, settings))]
pub async fn reviews(
    params: web::Query<ReviewParams>,
    aggregator: Data<ReviewAggregator>,
    settings: Data<Settings>,
) -> Result<HttpResponse, HandlerError> {
    let query = ReviewQuery {
        app_id: params::app_id(params.appid.as_deref())?,
        country: params::country(params.country.as_deref(), &settings.reviews.default_country)?,
        language: params::language(params.lang.as_deref())?,
        date: params.date.clone(),
    };

    tracing::info!(
        r#type = "web.reviews.request",
        app_id = %query.app_id,
        country = %query.country,
        lang = query.language.as_deref().unwrap_or("all"),
        date = query.date.as_deref(),
        "Handling reviews request"
    );

    let reviews = tokio::time::timeout(
        settings.reviews.request_timeout,
        aggregator.aggregate(&query),
    )
    .await
    .map_err(|_| {
        tracing::warn!(
            r#type = "web.reviews.timeout",
            app_id = %query.app_id,
            timeout_sec = settings.reviews.request_timeout.as_secs(),
            "Reviews request timed out"
        );
        HandlerError::from(HandlerErrorKind::Timeout)
    })?
    .map_err(|error| {
        tracing::warn!(r#type = "web.reviews.error", %error, "Could not collect reviews");
        HandlerError::from(error)
    })?;

    tracing::debug!(
        r#type = "web.reviews.provided-count",
        review_count = reviews.len(),
        "Providing reviews"
    );

    let count = reviews.len();
    let envelope = Envelope::ok(reviews).with_count(count);
    let envelope = if count == 0 {
        envelope.with_message("No reviews found")
    } else {
        envelope
    };
    Ok(envelope.into_response())
}
