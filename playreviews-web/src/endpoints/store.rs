//! Store lookups passed through to the scraper: app listings, search and
//! search suggestions.

use crate::{
    endpoints::params::{self, AppInfoParams, SearchParams},
    envelope::Envelope,
    errors::HandlerError,
};
use actix_web::{
    get,
    web::{self, Data},
    HttpResponse,
};
use playreviews_scraper::{AppInfoRequest, ScraperGateway, SearchRequest, SuggestRequest};

/// The store listing of an app.
#[get("/info")]
pub async fn app_info(
    params: web::Query<AppInfoParams>,
    gateway: Data<dyn ScraperGateway>,
) -> Result<HttpResponse, HandlerError> {
    let request = AppInfoRequest {
        app_id: params::app_id(params.appid.as_deref())?,
        country: params::optional_country(params.country.as_deref())?,
        language: params::language(params.lang.as_deref())?,
    };

    let info = gateway.app_info(&request).await.map_err(|error| {
        tracing::warn!(r#type = "web.app-info.error", app_id = %request.app_id, %error, "Could not fetch app information");
        HandlerError::scraper("Failed to fetch app information", error)
    })?;

    Ok(Envelope::ok(info).into_response())
}

/// Apps matching a free text search.
#[get("/search")]
pub async fn search(
    params: web::Query<SearchParams>,
    gateway: Data<dyn ScraperGateway>,
) -> Result<HttpResponse, HandlerError> {
    let request = SearchRequest {
        term: params::term(params.q.as_deref())?,
        limit: params::limit(params.limit.as_deref())?,
        country: params::optional_country(params.country.as_deref())?,
        language: params::language(params.lang.as_deref())?,
    };

    let apps = gateway.search(&request).await.map_err(|error| {
        tracing::warn!(r#type = "web.search.error", %error, "Could not search for apps");
        HandlerError::scraper("Failed to search for apps", error)
    })?;

    let count = apps.len();
    Ok(Envelope::ok(apps).with_count(count).into_response())
}

/// Completions for a partial search.
#[get("/suggestions")]
pub async fn suggestions(
    params: web::Query<SearchParams>,
    gateway: Data<dyn ScraperGateway>,
) -> Result<HttpResponse, HandlerError> {
    let request = SuggestRequest {
        term: params::term(params.q.as_deref())?,
        country: params::optional_country(params.country.as_deref())?,
        language: params::language(params.lang.as_deref())?,
    };

    let suggestions = gateway.suggest(&request).await.map_err(|error| {
        tracing::warn!(r#type = "web.suggestions.error", %error, "Could not get suggestions");
        HandlerError::scraper("Failed to get app suggestions", error)
    })?;

    let count = suggestions.len();
    Ok(Envelope::ok(suggestions).with_count(count).into_response())
}
