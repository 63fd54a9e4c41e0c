#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Access to Google Play store data for [Play Reviews](../playreviews/index.html).
//!
//! The store itself is scraped by an external component. This crate defines
//! the [`ScraperGateway`] seam the rest of the service talks to, the loosely
//! shaped [`RawReview`] records it returns, and the gateways that can be
//! configured: [`HttpScraper`] for a scraper sidecar reached over HTTP, and
//! [`FixtureScraper`] for canned data during development.

mod fixture;
mod http;
mod maker;
mod raw;
pub mod retry;

use async_trait::async_trait;
use fake::{
    faker::{address::en::CountryCode, lorem::en::Words},
    Fake,
};
use serde::Serialize;
use thiserror::Error;

pub use crate::{
    fixture::FixtureScraper, http::HttpScraper, maker::make_gateway, raw::RawReview,
};

/// A request for one page of reviews of an app, in one language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewsRequest {
    /// The package name of the app, such as "com.whatsapp".
    pub app_id: String,

    /// Store country in ISO 3166-1 alpha-2 format, such as "US".
    pub country: String,

    /// Language code of the reviews to fetch, such as "en" or "pt".
    pub language: String,

    /// The number of reviews to ask for.
    pub page_size: usize,
}

impl<F> fake::Dummy<F> for ReviewsRequest {
    fn dummy_with_rng<R: rand::Rng + ?Sized>(_config: &F, rng: &mut R) -> Self {
        let words = Words(2..4).fake_with_rng::<Vec<String>, R>(rng);
        Self {
            app_id: format!("com.{}", words.join(".").to_lowercase()),
            country: CountryCode().fake_with_rng::<String, R>(rng),
            language: ["en", "es", "fr", "de", "pt"][rng.gen_range(0..5)].to_string(),
            page_size: rng.gen_range(1..=200),
        }
    }
}

/// A request for the store listing of one app.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppInfoRequest {
    /// The package name of the app.
    pub app_id: String,
    /// Store country, if the caller chose one.
    pub country: Option<String>,
    /// Listing language, if the caller chose one.
    pub language: Option<String>,
}

/// A free text search of the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    /// The search terms.
    pub term: String,
    /// The maximum number of apps to return.
    pub limit: usize,
    /// Store country, if the caller chose one.
    pub country: Option<String>,
    /// Listing language, if the caller chose one.
    pub language: Option<String>,
}

/// A request for search-as-you-type suggestions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestRequest {
    /// The partial search terms.
    pub term: String,
    /// Store country, if the caller chose one.
    pub country: Option<String>,
    /// Suggestion language, if the caller chose one.
    pub language: Option<String>,
}

/// A source of raw store data.
///
/// Implementations must return an empty list, not an error, when the store
/// simply has nothing for a request. Errors are reserved for failures to
/// get an answer at all.
#[async_trait]
pub trait ScraperGateway: Send + Sync {
    /// An operator-visible name for this gateway.
    fn name(&self) -> String;

    /// Fetch one page of reviews, newest first.
    async fn reviews(&self, request: &ReviewsRequest) -> Result<Vec<RawReview>, ScraperError>;

    /// Fetch the store listing of an app. The listing is passed through as is.
    async fn app_info(&self, request: &AppInfoRequest) -> Result<serde_json::Value, ScraperError>;

    /// Search the store for apps.
    async fn search(&self, request: &SearchRequest)
        -> Result<Vec<serde_json::Value>, ScraperError>;

    /// Suggest search terms that complete a partial one.
    async fn suggest(&self, request: &SuggestRequest) -> Result<Vec<String>, ScraperError>;
}

/// Errors that may occur while setting up a gateway.
#[derive(Debug, Error)]
#[allow(missing_docs, clippy::missing_docs_in_private_items)]
pub enum SetupError {
    #[error("This scraper cannot be used with the current configuration")]
    InvalidConfiguration(#[source] anyhow::Error),

    #[error("There was a local I/O error while setting up this scraper")]
    Io(#[source] anyhow::Error),

    #[error("Required data was not in the expected format")]
    Format(#[source] anyhow::Error),
}

/// Errors that may occur while fetching store data.
#[derive(Debug, Error)]
#[allow(missing_docs, clippy::missing_docs_in_private_items)]
pub enum ScraperError {
    #[error("There was a network error while contacting the store scraper: {0}")]
    Network(#[source] anyhow::Error),

    #[error("The store scraper responded with HTTP status {status}")]
    Upstream { status: u16 },

    #[error("The requested app was not found in the store")]
    AppNotFound,

    #[error("The store scraper returned data in an unexpected format: {0}")]
    Format(#[source] anyhow::Error),

    #[error("The store scraper is misconfigured: {0}")]
    InvalidConfiguration(#[source] anyhow::Error),
}

impl ScraperError {
    /// Whether trying the same call again might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Upstream { status } => *status == 429 || *status >= 500,
            Self::AppNotFound | Self::Format(_) | Self::InvalidConfiguration(_) => false,
        }
    }
}
