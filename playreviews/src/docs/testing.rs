//! # Testing
//!
//! Unit tests live beside their code in `#[cfg(test)] mod tests` blocks.
//! Most of the review handling is tested there: normalization,
//! deduplication, the date grammar and the language table. The HTTP gateway
//! runs against an [`httpmock`](https://docs.rs/httpmock) server, and the
//! aggregator against stub gateways, with metrics caught by cadence's
//! `SpyMetricSink`.
//!
//! Whole-server behavior is in [`playreviews-integration-tests`][test-crate].
//! Each test calls `reviews_test`, which starts the server on a free port
//! with its scraper pointed at a fresh mock, then mocks the scraper routes
//! it needs:
//!
//! [test-crate]: ../../../playreviews_integration_tests/
//!
//! ```ignore
//! #[actix_rt::test]
//! async fn reviews_are_fetched() -> Result<()> {
//!     reviews_test(
//!         |_| (),
//!         |TestingTools { test_client, scraper_mock, mut metrics_watcher, .. }| async move {
//!             scraper_mock.mock(|when, then| {
//!                 when.path("/reviews").query_param("appId", "com.whatsapp");
//!                 then.status(200).json_body(json!({ "data": [] }));
//!             });
//!
//!             let response = test_client.get("/app?appid=com.whatsapp&lang=en").send().await?;
//!             assert_eq!(response.status(), StatusCode::OK);
//!             assert!(metrics_watcher.has_counter("reviews.fetch"));
//!             Ok(())
//!         },
//!     )
//!     .await
//! }
//! ```
//!
//! Run everything with `cargo test --workspace`.
