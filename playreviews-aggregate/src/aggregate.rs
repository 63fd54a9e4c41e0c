//! Collecting the reviews of one app across the store's languages.

use crate::{
    date_filter::{filter_since, parse_cutoff, DateParseError},
    dedupe::dedupe,
    languages::languages_for,
    normalize::normalize_all,
    sort_newest_first, CanonicalReview,
};
use cadence::{CountedExt, Histogrammed, StatsdClient};
use futures::{stream, StreamExt};
use playreviews_scraper::{RawReview, ReviewsRequest, ScraperError, ScraperGateway};
use playreviews_settings::ReviewsSettings;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::{timeout_at, Instant};

/// What a client asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewQuery {
    /// The package name of the app.
    pub app_id: String,

    /// Upper-case store country.
    pub country: String,

    /// A single language to fetch. When `None`, the configured default
    /// language is used, and without one, every likely language of `country`.
    pub language: Option<String>,

    /// A cutoff expression for the oldest review to return.
    pub date: Option<String>,
}

/// Errors that fail a whole aggregation.
#[derive(Debug, Error)]
#[allow(missing_docs, clippy::missing_docs_in_private_items)]
pub enum AggregateError {
    #[error(transparent)]
    DateParse(#[from] DateParseError),

    #[error("Failed to fetch reviews: {0}")]
    Upstream(#[source] ScraperError),
}

/// Fetches, normalizes and merges reviews from a [`ScraperGateway`].
pub struct ReviewAggregator {
    /// Where raw reviews come from.
    gateway: Arc<dyn ScraperGateway>,

    /// Paging, defaults and fan-out behavior.
    settings: ReviewsSettings,

    /// The Statsd client used to record statistics.
    metrics_client: Arc<StatsdClient>,
}

impl ReviewAggregator {
    /// Create an aggregator over `gateway`.
    pub fn new(
        gateway: Arc<dyn ScraperGateway>,
        settings: ReviewsSettings,
        metrics_client: Arc<StatsdClient>,
    ) -> Self {
        Self {
            gateway,
            settings,
            metrics_client,
        }
    }

    /// Collect the reviews matching `query`.
    ///
    /// With a language, the store is asked once and its failure fails the
    /// call. Without one, every likely language of the country is fetched;
    /// languages that fail are logged and contribute nothing, and the merged
    /// result has no repeated ids.
    ///
    /// # Errors
    /// If the `date` expression is invalid, which is checked before anything
    /// is fetched, or if a single-language fetch fails.
    pub async fn aggregate(
        &self,
        query: &ReviewQuery,
    ) -> Result<Vec<CanonicalReview>, AggregateError> {
        let cutoff = parse_cutoff(query.date.as_deref())?;

        let language = query
            .language
            .as_deref()
            .or(self.settings.default_language.as_deref());
        let (mode, reviews) = match language {
            Some(language) => ("single", self.single_language(query, language).await?),
            None => ("fan-out", self.fan_out(query).await),
        };

        let reviews = filter_since(reviews, cutoff);
        self.metrics_client
            .histogram_with_tags("reviews.count", reviews.len() as u64)
            .with_tag("mode", mode)
            .try_send()
            .ok();
        tracing::debug!(
            r#type = "reviews.aggregated",
            app_id = %query.app_id,
            country = %query.country,
            mode,
            count = reviews.len(),
            "Aggregated reviews"
        );

        Ok(reviews)
    }

    /// Fetch one language, keeping the store's order.
    async fn single_language(
        &self,
        query: &ReviewQuery,
        language: &str,
    ) -> Result<Vec<CanonicalReview>, AggregateError> {
        let raws = self
            .fetch(query, language)
            .await
            .map_err(AggregateError::Upstream)?;
        Ok(dedupe(normalize_all(&raws, &query.app_id)))
    }

    /// Fetch every likely language of the query's country and merge them in
    /// language order.
    ///
    /// Each language gets `language_timeout`, and none is waited on past
    /// `fan_out_deadline` from the start of the fan-out.
    async fn fan_out(&self, query: &ReviewQuery) -> Vec<CanonicalReview> {
        let languages = languages_for(&query.country);
        let deadline = Instant::now() + self.settings.fan_out_deadline;
        let batches: Vec<Vec<RawReview>> = stream::iter(languages.iter())
            .map(|language| self.fetch_or_skip(query, language, deadline))
            .buffered(self.settings.fan_out_concurrency.max(1))
            .collect()
            .await;

        let raws: Vec<RawReview> = batches.into_iter().flatten().collect();
        let mut reviews = dedupe(normalize_all(&raws, &query.app_id));
        if self.settings.sort_fan_out {
            sort_newest_first(&mut reviews);
        }
        reviews
    }

    /// Fetch one language of a fan-out. Failures and timeouts are logged and
    /// read as "no reviews".
    async fn fetch_or_skip(
        &self,
        query: &ReviewQuery,
        language: &str,
        deadline: Instant,
    ) -> Vec<RawReview> {
        let language_deadline = deadline.min(Instant::now() + self.settings.language_timeout);
        match timeout_at(language_deadline, self.fetch(query, language)).await {
            Ok(Ok(raws)) => raws,
            Err(_elapsed) => {
                self.metrics_client
                    .incr_with_tags("reviews.fetch")
                    .with_tag("outcome", "timeout")
                    .with_tag("lang", language)
                    .try_send()
                    .ok();
                tracing::warn!(
                    r#type = "reviews.fan-out.language-timeout",
                    app_id = %query.app_id,
                    country = %query.country,
                    language,
                    "Skipping a language that took too long"
                );
                Vec::new()
            }
            Ok(Err(error)) => {
                tracing::warn!(
                    r#type = "reviews.fan-out.language-failed",
                    app_id = %query.app_id,
                    country = %query.country,
                    language,
                    %error,
                    "Skipping a language that could not be fetched"
                );
                Vec::new()
            }
        }
    }

    /// One call to the gateway, counted.
    async fn fetch(
        &self,
        query: &ReviewQuery,
        language: &str,
    ) -> Result<Vec<RawReview>, ScraperError> {
        let request = ReviewsRequest {
            app_id: query.app_id.clone(),
            country: query.country.clone(),
            language: language.to_string(),
            page_size: self.settings.page_size,
        };
        let result = self.gateway.reviews(&request).await;

        let outcome = if result.is_ok() { "ok" } else { "error" };
        self.metrics_client
            .incr_with_tags("reviews.fetch")
            .with_tag("outcome", outcome)
            .with_tag("lang", language)
            .try_send()
            .ok();

        result
    }
}

#[cfg(test)]
mod tests {
    use super::{AggregateError, ReviewAggregator, ReviewQuery};
    use async_trait::async_trait;
    use cadence::{SpyMetricSink, StatsdClient};
    use fake::{Fake, Faker};
    use playreviews_scraper::{
        AppInfoRequest, RawReview, ReviewsRequest, ScraperError, ScraperGateway, SearchRequest,
        SuggestRequest,
    };
    use playreviews_settings::ReviewsSettings;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::{
        collections::{HashMap, HashSet},
        sync::{Arc, Mutex},
        time::Duration,
    };

    /// Serves canned reviews per language, failing the languages it is told
    /// to fail.
    #[derive(Default)]
    struct StubGateway {
        reviews: HashMap<String, Vec<RawReview>>,
        failing: HashSet<String>,
        slow: HashSet<String>,
        requests: Mutex<Vec<ReviewsRequest>>,
    }

    impl StubGateway {
        fn with(mut self, language: &str, reviews: Vec<RawReview>) -> Self {
            self.reviews.insert(language.to_string(), reviews);
            self
        }

        fn failing(mut self, language: &str) -> Self {
            self.failing.insert(language.to_string());
            self
        }

        /// Never answers `language` within a test's lifetime.
        fn slow(mut self, language: &str) -> Self {
            self.slow.insert(language.to_string());
            self
        }

        fn requested_languages(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.language.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ScraperGateway for StubGateway {
        fn name(&self) -> String {
            "StubGateway()".to_string()
        }

        async fn reviews(&self, request: &ReviewsRequest) -> Result<Vec<RawReview>, ScraperError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.slow.contains(&request.language) {
                tokio::time::sleep(Duration::from_secs(600)).await;
            }
            if self.failing.contains(&request.language) {
                return Err(ScraperError::Upstream { status: 503 });
            }
            Ok(self
                .reviews
                .get(&request.language)
                .cloned()
                .unwrap_or_default())
        }

        async fn app_info(&self, _request: &AppInfoRequest) -> Result<Value, ScraperError> {
            Ok(json!({}))
        }

        async fn search(&self, _request: &SearchRequest) -> Result<Vec<Value>, ScraperError> {
            Ok(vec![])
        }

        async fn suggest(&self, _request: &SuggestRequest) -> Result<Vec<String>, ScraperError> {
            Ok(vec![])
        }
    }

    fn raw(id: &str, date: &str) -> RawReview {
        RawReview {
            review_id: Some(json!(id)),
            date: Some(json!(date)),
            ..Faker.fake()
        }
    }

    fn settings() -> ReviewsSettings {
        ReviewsSettings {
            default_country: "US".to_string(),
            default_language: None,
            page_size: 50,
            fan_out_concurrency: 3,
            sort_fan_out: true,
            request_timeout: Duration::from_secs(10),
            language_timeout: Duration::from_secs(5),
            fan_out_deadline: Duration::from_secs(8),
        }
    }

    fn query(language: Option<&str>, date: Option<&str>) -> ReviewQuery {
        ReviewQuery {
            app_id: "com.example.app".to_string(),
            country: "US".to_string(),
            language: language.map(str::to_string),
            date: date.map(str::to_string),
        }
    }

    fn aggregator(gateway: Arc<StubGateway>, settings: ReviewsSettings) -> ReviewAggregator {
        ReviewAggregator::new(
            gateway,
            settings,
            Arc::new(StatsdClient::from_sink("playreviews-test", cadence::NopMetricSink)),
        )
    }

    fn ids(reviews: &[crate::CanonicalReview]) -> Vec<&str> {
        reviews.iter().map(|r| r.id.as_str()).collect()
    }

    #[tokio::test]
    async fn single_language_keeps_store_order() {
        let gateway = Arc::new(StubGateway::default().with(
            "de",
            vec![
                raw("old", "2024-01-01T00:00:00Z"),
                raw("new", "2024-06-01T00:00:00Z"),
                raw("old", "2024-01-01T00:00:00Z"),
            ],
        ));
        let reviews = aggregator(gateway.clone(), settings())
            .aggregate(&query(Some("de"), None))
            .await
            .expect("aggregation succeeds");

        assert_eq!(ids(&reviews), vec!["old", "new"]);
        assert_eq!(gateway.requested_languages(), vec!["de"]);
        assert_eq!(gateway.requests.lock().unwrap()[0].page_size, 50);
    }

    #[tokio::test]
    async fn single_language_failures_are_errors() {
        let gateway = Arc::new(StubGateway::default().failing("de"));
        let result = aggregator(gateway, settings())
            .aggregate(&query(Some("de"), None))
            .await;
        assert!(matches!(
            result,
            Err(AggregateError::Upstream(ScraperError::Upstream { status: 503 }))
        ));
    }

    #[tokio::test]
    async fn default_language_avoids_fan_out() {
        let gateway = Arc::new(StubGateway::default());
        let settings = ReviewsSettings {
            default_language: Some("pt".to_string()),
            ..settings()
        };
        aggregator(gateway.clone(), settings)
            .aggregate(&query(None, None))
            .await
            .expect("aggregation succeeds");
        assert_eq!(gateway.requested_languages(), vec!["pt"]);
    }

    #[tokio::test]
    async fn fan_out_survives_failing_languages() {
        let gateway = Arc::new(
            StubGateway::default()
                .with("en", vec![raw("en-1", "2024-01-01T00:00:00Z")])
                .with("fr", vec![raw("fr-1", "2024-03-01T00:00:00Z")])
                .with("ja", vec![raw("ja-1", "2024-02-01T00:00:00Z")])
                .failing("es")
                .failing("ko"),
        );
        let reviews = aggregator(gateway.clone(), settings())
            .aggregate(&query(None, None))
            .await
            .expect("partial failures don't fail the request");

        assert_eq!(ids(&reviews), vec!["fr-1", "ja-1", "en-1"]);

        let mut requested = gateway.requested_languages();
        requested.sort();
        let mut expected: Vec<String> = crate::languages_for("US")
            .iter()
            .map(|l| l.to_string())
            .collect();
        expected.sort();
        assert_eq!(requested, expected);
    }

    #[tokio::test]
    async fn fan_out_merges_in_language_order_without_sorting() {
        let gateway = Arc::new(
            StubGateway::default()
                .with(
                    "en",
                    vec![
                        raw("shared", "2024-01-01T00:00:00Z"),
                        raw("en-1", "2023-01-01T00:00:00Z"),
                    ],
                )
                .with(
                    "es",
                    vec![
                        raw("es-1", "2025-01-01T00:00:00Z"),
                        raw("shared", "2024-01-01T00:00:00Z"),
                    ],
                )
                .with("zh", vec![raw("zh-1", "2022-01-01T00:00:00Z")]),
        );
        let settings = ReviewsSettings {
            sort_fan_out: false,
            ..settings()
        };
        let reviews = aggregator(gateway, settings)
            .aggregate(&query(None, None))
            .await
            .expect("aggregation succeeds");

        assert_eq!(ids(&reviews), vec!["shared", "en-1", "es-1", "zh-1"]);
    }

    #[tokio::test]
    async fn slow_languages_are_skipped() {
        let gateway = Arc::new(
            StubGateway::default()
                .with("en", vec![raw("en-1", "2024-01-01T00:00:00Z")])
                .slow("es"),
        );
        let settings = ReviewsSettings {
            language_timeout: Duration::from_millis(50),
            ..settings()
        };
        let (rx, sink) = SpyMetricSink::new();
        let aggregator = ReviewAggregator::new(
            gateway,
            settings,
            Arc::new(StatsdClient::from_sink("playreviews-test", sink)),
        );

        let reviews = tokio::time::timeout(
            Duration::from_secs(5),
            aggregator.aggregate(&query(None, None)),
        )
        .await
        .expect("a slow language doesn't hold up the rest")
        .expect("aggregation succeeds");

        assert_eq!(ids(&reviews), vec!["en-1"]);
        let sent: Vec<String> = rx
            .try_iter()
            .map(|bytes| String::from_utf8(bytes).unwrap())
            .collect();
        assert!(sent.contains(
            &"playreviews-test.reviews.fetch:1|c|#outcome:timeout,lang:es".to_string()
        ));
    }

    #[tokio::test]
    async fn fan_out_stops_waiting_at_its_deadline() {
        let mut gateway = StubGateway::default().with("en", vec![raw("en-1", "2024-01-01T00:00:00Z")]);
        for language in crate::languages_for("US") {
            if *language != "en" {
                gateway = gateway.slow(language);
            }
        }
        // One slow language at a time, each allowed far longer than the
        // whole fan-out.
        let settings = ReviewsSettings {
            fan_out_concurrency: 1,
            language_timeout: Duration::from_secs(60),
            fan_out_deadline: Duration::from_millis(100),
            ..settings()
        };

        let reviews = tokio::time::timeout(
            Duration::from_secs(5),
            aggregator(Arc::new(gateway), settings).aggregate(&query(None, None)),
        )
        .await
        .expect("the fan-out finishes by its deadline")
        .expect("aggregation succeeds");

        assert_eq!(ids(&reviews), vec!["en-1"]);
    }

    #[tokio::test]
    async fn fan_out_with_nothing_is_empty() {
        let mut gateway = StubGateway::default();
        for language in crate::languages_for("US") {
            gateway = gateway.failing(language);
        }
        let reviews = aggregator(Arc::new(gateway), settings())
            .aggregate(&query(None, None))
            .await
            .expect("total failure of a fan-out is still a result");
        assert!(reviews.is_empty());
    }

    #[tokio::test]
    async fn bad_dates_fail_before_fetching() {
        let gateway = Arc::new(StubGateway::default());
        let result = aggregator(gateway.clone(), settings())
            .aggregate(&query(None, Some("not-a-date")))
            .await;

        match result {
            Err(AggregateError::DateParse(error)) => assert_eq!(error.expr, "not-a-date"),
            other => panic!("expected a date error, got {other:?}"),
        }
        assert!(gateway.requested_languages().is_empty());
    }

    #[tokio::test]
    async fn dates_filter_the_merged_reviews() {
        let gateway = Arc::new(StubGateway::default().with(
            "en",
            vec![
                raw("before", "2024-12-31T00:00:00Z"),
                raw("after", "2025-01-02T00:00:00Z"),
            ],
        ));
        let reviews = aggregator(gateway, settings())
            .aggregate(&query(Some("en"), Some("2025-01-01")))
            .await
            .expect("aggregation succeeds");
        assert_eq!(ids(&reviews), vec!["after"]);
    }

    #[tokio::test]
    async fn fetches_and_counts_are_recorded() {
        let gateway = Arc::new(
            StubGateway::default()
                .with("en", vec![raw("a", "2024-01-01T00:00:00Z")])
                .failing("en-gb"),
        );
        let (rx, sink) = SpyMetricSink::new();
        let aggregator = ReviewAggregator::new(
            gateway,
            settings(),
            Arc::new(StatsdClient::from_sink("playreviews-test", sink)),
        );

        aggregator
            .aggregate(&query(Some("en"), None))
            .await
            .expect("aggregation succeeds");

        let sent: Vec<String> = rx
            .try_iter()
            .map(|bytes| String::from_utf8(bytes).unwrap())
            .collect();
        assert_eq!(
            sent,
            vec![
                "playreviews-test.reviews.fetch:1|c|#outcome:ok,lang:en".to_string(),
                "playreviews-test.reviews.count:1|h|#mode:single".to_string(),
            ]
        );

        let result = aggregator.aggregate(&query(Some("en-gb"), None)).await;
        assert!(result.is_err());
        let sent: Vec<String> = rx
            .try_iter()
            .map(|bytes| String::from_utf8(bytes).unwrap())
            .collect();
        assert_eq!(
            sent,
            vec!["playreviews-test.reviews.fetch:1|c|#outcome:error,lang:en-gb".to_string()]
        );
    }
}
