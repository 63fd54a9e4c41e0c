//! A gateway that talks to a store scraper sidecar over HTTP.

use crate::{
    retry::{with_retry, RetryPolicy},
    AppInfoRequest, RawReview, ReviewsRequest, ScraperError, ScraperGateway, SearchRequest,
    SetupError, SuggestRequest,
};
use anyhow::anyhow;
use async_trait::async_trait;
use playreviews_settings::HttpScraperConfig;
use reqwest::{StatusCode, Url};
use serde_json::Value;

/// Object members that may wrap a list in the scraper's responses, in the
/// order they are checked.
const LIST_WRAPPERS: [&str; 3] = ["data", "reviews", "results"];

/// Queries a scraper sidecar, which exposes the scraping library's calls as
/// `GET` routes returning JSON.
pub struct HttpScraper {
    /// Shared connection pool, configured with the timeouts and user agent.
    client: reqwest::Client,
    /// Routes are joined onto this. Always ends with a slash.
    base_url: Url,
    /// How transient failures are retried.
    retry: RetryPolicy,
}

impl HttpScraper {
    /// Create a boxed gateway from settings.
    ///
    /// # Errors
    /// If the HTTP client cannot be built or the base URL cannot have routes
    /// joined onto it.
    pub fn new_boxed(config: &HttpScraperConfig) -> Result<Box<Self>, SetupError> {
        if config.base_url.cannot_be_a_base() {
            return Err(SetupError::InvalidConfiguration(anyhow!(
                "scraper base_url {} cannot be used as a base",
                config.base_url
            )));
        }

        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|error| SetupError::InvalidConfiguration(error.into()))?;

        Ok(Box::new(Self {
            client,
            base_url,
            retry: RetryPolicy::from(&config.retry),
        }))
    }

    /// Call `route` with `query`, retrying transient failures.
    async fn get_json(&self, route: &str, query: &[(&str, String)]) -> Result<Value, ScraperError> {
        let url = self
            .base_url
            .join(route)
            .map_err(|error| ScraperError::InvalidConfiguration(error.into()))?;

        with_retry(&self.retry, ScraperError::is_transient, |attempt| {
            self.get_once(&url, query, attempt)
        })
        .await
    }

    /// A single attempt at a call, with no retries.
    async fn get_once(
        &self,
        url: &Url,
        query: &[(&str, String)],
        attempt: u32,
    ) -> Result<Value, ScraperError> {
        tracing::debug!(r#type = "scraper.http.request", %url, attempt, "Calling store scraper");

        let response = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|error| ScraperError::Network(error.into()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ScraperError::AppNotFound);
        }
        if !status.is_success() {
            return Err(ScraperError::Upstream {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|error| ScraperError::Network(error.into()))?;
        serde_json::from_slice(&body).map_err(|error| ScraperError::Format(error.into()))
    }
}

/// Query pairs for the optional country and language of a request.
fn locale_query(country: &Option<String>, language: &Option<String>) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(country) = country {
        query.push(("country", country.clone()));
    }
    if let Some(language) = language {
        query.push(("lang", language.clone()));
    }
    query
}

/// Find the list of reviews in a reviews response.
///
/// The list may be the whole response, or wrapped in one of
/// [`LIST_WRAPPERS`]. A wrapper set to `null` means there are no reviews.
/// Failing those, the first member holding a list of review-like items is
/// used.
pub(crate) fn extract_reviews(value: Value) -> Result<Vec<RawReview>, ScraperError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            if let Some(key) = LIST_WRAPPERS
                .iter()
                .find(|key| matches!(map.get(**key), Some(Value::Array(_))))
            {
                match map.remove(*key) {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                }
            } else if LIST_WRAPPERS
                .iter()
                .any(|key| matches!(map.get(*key), Some(Value::Null)))
            {
                Vec::new()
            } else {
                let found = map.into_iter().find_map(|(_key, member)| match member {
                    Value::Array(items)
                        if items.first().map_or(false, RawReview::looks_like_review) =>
                    {
                        Some(items)
                    }
                    _ => None,
                });
                found.ok_or_else(|| {
                    ScraperError::Format(anyhow!("no list of reviews in the scraper response"))
                })?
            }
        }
        other => {
            return Err(ScraperError::Format(anyhow!(
                "expected reviews as a list or an object, got {}",
                other
            )))
        }
    };

    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Find a plain list in a response that is either the list itself or an
/// object wrapping it.
fn extract_list(value: Value) -> Result<Vec<Value>, ScraperError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => LIST_WRAPPERS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                Some(Value::Null) => Some(Vec::new()),
                _ => None,
            })
            .ok_or_else(|| ScraperError::Format(anyhow!("no list in the scraper response"))),
        other => Err(ScraperError::Format(anyhow!(
            "expected a list or an object, got {}",
            other
        ))),
    }
}

#[async_trait]
impl ScraperGateway for HttpScraper {
    fn name(&self) -> String {
        format!("HttpScraper({})", self.base_url)
    }

    async fn reviews(&self, request: &ReviewsRequest) -> Result<Vec<RawReview>, ScraperError> {
        let query = [
            ("appId", request.app_id.clone()),
            ("country", request.country.clone()),
            ("lang", request.language.clone()),
            ("num", request.page_size.to_string()),
            ("sort", "newest".to_string()),
        ];
        let value = self.get_json("reviews", &query).await?;
        extract_reviews(value)
    }

    async fn app_info(&self, request: &AppInfoRequest) -> Result<Value, ScraperError> {
        let mut query = vec![("appId", request.app_id.clone())];
        query.extend(locale_query(&request.country, &request.language));
        match self.get_json("app", &query).await? {
            Value::Object(map) if map.is_empty() => Err(ScraperError::AppNotFound),
            value @ Value::Object(_) => Ok(value),
            Value::Null => Err(ScraperError::AppNotFound),
            other => Err(ScraperError::Format(anyhow!(
                "expected app details as an object, got {}",
                other
            ))),
        }
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<Value>, ScraperError> {
        let mut query = vec![
            ("term", request.term.clone()),
            ("num", request.limit.to_string()),
        ];
        query.extend(locale_query(&request.country, &request.language));
        let mut apps = extract_list(self.get_json("search", &query).await?)?;
        apps.retain(Value::is_object);
        apps.truncate(request.limit);
        Ok(apps)
    }

    async fn suggest(&self, request: &SuggestRequest) -> Result<Vec<String>, ScraperError> {
        let mut query = vec![("term", request.term.clone())];
        query.extend(locale_query(&request.country, &request.language));
        let suggestions = extract_list(self.get_json("suggest", &query).await?)?;
        Ok(suggestions
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{extract_reviews, HttpScraper};
    use crate::{
        AppInfoRequest, ReviewsRequest, ScraperError, ScraperGateway, SearchRequest,
        SuggestRequest,
    };
    use httpmock::prelude::*;
    use playreviews_settings::{HttpScraperConfig, RetrySettings};
    use pretty_assertions::assert_eq;
    use reqwest::Url;
    use serde_json::json;
    use std::time::Duration;

    fn scraper_for(base_url: &str) -> Box<HttpScraper> {
        HttpScraper::new_boxed(&HttpScraperConfig {
            base_url: Url::parse(base_url).expect("valid base url"),
            retry: RetrySettings {
                max_attempts: 3,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
            },
            ..HttpScraperConfig::default()
        })
        .expect("scraper builds")
    }

    fn reviews_request() -> ReviewsRequest {
        ReviewsRequest {
            app_id: "com.example.app".to_string(),
            country: "US".to_string(),
            language: "en".to_string(),
            page_size: 200,
        }
    }

    #[test]
    fn reviews_can_be_wrapped() {
        let bare = extract_reviews(json!([{ "reviewId": "a" }, { "reviewId": "b" }])).unwrap();
        assert_eq!(bare.len(), 2);

        let wrapped = extract_reviews(json!({ "data": [{ "reviewId": "a" }], "nextPaginationToken": "x" }))
            .unwrap();
        assert_eq!(wrapped.len(), 1);

        let results = extract_reviews(json!({ "data": "nope", "results": [{ "id": 1 }] })).unwrap();
        assert_eq!(results[0].id, Some(json!(1)));
    }

    #[test]
    fn null_wrapper_means_no_reviews() {
        assert!(extract_reviews(json!({ "data": null })).unwrap().is_empty());
    }

    #[test]
    fn review_lists_are_found_under_other_names() {
        let found = extract_reviews(json!({
            "apps": [{ "title": "not a review" }],
            "items": [{ "text": "Works great", "score": 5 }],
        }))
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, Some(json!("Works great")));
    }

    #[test]
    fn unrecognized_responses_are_format_errors() {
        assert!(matches!(
            extract_reviews(json!({ "status": "ok" })),
            Err(ScraperError::Format(_))
        ));
        assert!(matches!(
            extract_reviews(json!("reviews")),
            Err(ScraperError::Format(_))
        ));
    }

    #[test]
    fn non_object_entries_are_skipped() {
        let reviews = extract_reviews(json!([{ "reviewId": "a" }, "junk", 7, null])).unwrap();
        assert_eq!(reviews.len(), 1);
    }

    #[tokio::test]
    async fn reviews_are_requested_newest_first() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/reviews")
                    .query_param("appId", "com.example.app")
                    .query_param("country", "US")
                    .query_param("lang", "en")
                    .query_param("num", "200")
                    .query_param("sort", "newest");
                then.status(200).json_body(json!({
                    "data": [
                        { "reviewId": "r1", "userName": "Ana", "score": 5, "text": "Love it" },
                        { "reviewId": "r2", "userName": "Bo", "score": 1, "text": "Crashes" },
                    ]
                }));
            })
            .await;

        let scraper = scraper_for(&server.base_url());
        let reviews = scraper.reviews(&reviews_request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].review_id, Some(json!("r1")));
        assert_eq!(reviews[1].user_name, Some(json!("Bo")));
    }

    #[tokio::test]
    async fn base_url_paths_are_kept() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/scraper/suggest").query_param("term", "whats");
                then.status(200).json_body(json!(["whatsapp", "whatsapp business", 3]));
            })
            .await;

        let scraper = scraper_for(&server.url("/scraper"));
        let suggestions = scraper
            .suggest(&SuggestRequest {
                term: "whats".to_string(),
                country: None,
                language: None,
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(suggestions, vec!["whatsapp", "whatsapp business"]);
    }

    #[tokio::test]
    async fn missing_apps_are_not_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/app");
                then.status(404);
            })
            .await;

        let scraper = scraper_for(&server.base_url());
        let result = scraper
            .app_info(&AppInfoRequest {
                app_id: "com.example.missing".to_string(),
                country: Some("US".to_string()),
                language: None,
            })
            .await;

        assert!(matches!(result, Err(ScraperError::AppNotFound)));
        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/reviews");
                then.status(503);
            })
            .await;

        let scraper = scraper_for(&server.base_url());
        let result = scraper.reviews(&reviews_request()).await;

        assert!(matches!(result, Err(ScraperError::Upstream { status: 503 })));
        mock.assert_hits_async(3).await;
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/reviews");
                then.status(400);
            })
            .await;

        let scraper = scraper_for(&server.base_url());
        let result = scraper.reviews(&reviews_request()).await;

        assert!(matches!(result, Err(ScraperError::Upstream { status: 400 })));
        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn malformed_bodies_are_format_errors() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/reviews");
                then.status(200)
                    .header("content-type", "application/json")
                    .body("<html>rate limited</html>");
            })
            .await;

        let scraper = scraper_for(&server.base_url());
        let result = scraper.reviews(&reviews_request()).await;

        assert!(matches!(result, Err(ScraperError::Format(_))));
        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn unreachable_scraper_is_a_network_error() {
        // Nothing listens on port 1.
        let scraper = scraper_for("http://127.0.0.1:1/");
        let result = scraper.reviews(&reviews_request()).await;
        assert!(matches!(result, Err(ScraperError::Network(_))));
    }

    #[tokio::test]
    async fn search_is_limited() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search")
                    .query_param("term", "chat")
                    .query_param("num", "2")
                    .query_param("country", "GB");
                then.status(200).json_body(json!({
                    "results": [
                        { "appId": "com.a", "title": "A" },
                        { "appId": "com.b", "title": "B" },
                        { "appId": "com.c", "title": "C" },
                    ]
                }));
            })
            .await;

        let scraper = scraper_for(&server.base_url());
        let apps = scraper
            .search(&SearchRequest {
                term: "chat".to_string(),
                limit: 2,
                country: Some("GB".to_string()),
                language: None,
            })
            .await
            .unwrap();

        assert_eq!(
            apps,
            vec![
                json!({ "appId": "com.a", "title": "A" }),
                json!({ "appId": "com.b", "title": "B" }),
            ]
        );
    }
}
