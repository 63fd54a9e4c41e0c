#![warn(missing_docs, clippy::missing_docs_in_private_items)]
// Test modules are `#[cfg(test)]`, so outside of tests the helpers look unused.
#![allow(dead_code)]

//! End to end tests of the Play Reviews HTTP API.
//!
//! Every test here starts a real server through [`reviews_test`], with the
//! store scraper replaced by an `httpmock` server, and checks only what a
//! client could see: status codes, headers and response bodies, plus the
//! metrics the server sent. Keeping them in one crate builds them into a
//! single test binary.
//!
//! ```no_run
//! use httpmock::Method::GET;
//! use playreviews_integration_tests::{reviews_test, TestingTools};
//! use serde_json::{json, Value};
//!
//! #[actix_rt::test]
//! async fn unknown_apps_are_not_found() {
//!     reviews_test(
//!         |_| (),
//!         |TestingTools { test_client, scraper_mock, .. }| async move {
//!             scraper_mock.mock(|when, then| {
//!                 when.method(GET).path("/app");
//!                 then.status(200).json_body(json!({}));
//!             });
//!
//!             let response = test_client.get("/app/info?appid=nope").send().await.unwrap();
//!             let body: Value = response.json().await.unwrap();
//!             assert_eq!(body["error"], json!("App not found"));
//!         },
//!     )
//!     .await
//! }
//! ```

mod debug;
mod dockerflow;
mod general;
mod reviews;
mod store;
mod utils;

pub use crate::utils::{
    logging::{LogWatcher, TracingJsonEvent},
    metrics::MetricsWatcher,
    test_tools::{reviews_test, TestReqwestClient, TestingTools},
};
