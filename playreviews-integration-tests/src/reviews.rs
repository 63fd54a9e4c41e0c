//! Tests of the reviews route, `/app`.
#![cfg(test)]

use crate::{reviews_test, TestingTools};
use anyhow::Result;
use httpmock::Method::GET;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

/// A raw review as the store scraper would return it.
fn raw_review(id: &str, date: &str) -> Value {
    json!({
        "reviewId": id,
        "userName": "Reviewer",
        "date": date,
        "score": 5,
        "text": format!("Review {}", id),
        "version": "1.0.0",
    })
}

/// The `id` of every review in a response body.
fn review_ids(body: &Value) -> Vec<&str> {
    body["data"]
        .as_array()
        .expect("data is a list")
        .iter()
        .map(|review| review["id"].as_str().expect("id is a string"))
        .collect()
}

#[actix_rt::test]
async fn app_id_is_required() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/app").send().await?;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let body: Value = response.json().await?;
            assert_eq!(body["success"], json!(false));
            assert_eq!(body["statusCode"], json!(400));
            assert!(body["error"].as_str().unwrap_or_default().contains("appid"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn unknown_apps_are_not_found_in_one_language() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            // The mock has no routes, so the scraper answers 404.
            let response = test_client
                .get("/app?appid=com.does.not.exist&lang=en")
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);

            let body: Value = response.json().await?;
            assert_eq!(body["success"], json!(false));
            assert_eq!(body["error"], json!("App not found"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn single_language_reviews_are_normalized() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools {
             test_client,
             scraper_mock,
             mut metrics_watcher,
             ..
         }| async move {
            let mock = scraper_mock
                .mock_async(|when, then| {
                    when.method(GET)
                        .path("/reviews")
                        .query_param("appId", "com.whatsapp")
                        .query_param("country", "US")
                        .query_param("lang", "en")
                        .query_param("sort", "newest");
                    then.status(200).json_body(json!({
                        "data": [
                            raw_review("r-1", "2024-05-03T00:00:00Z"),
                            raw_review("r-2", "2024-05-02T00:00:00Z"),
                            raw_review("r-3", "2024-05-01T00:00:00Z"),
                        ]
                    }));
                })
                .await;

            let response = test_client
                .get("/app?appid=com.whatsapp&lang=en&country=us")
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.headers().get("content-type").map(|v| v.as_bytes()),
                Some("application/json".as_bytes())
            );

            let body: Value = response.json().await?;
            assert_eq!(body["success"], json!(true));
            assert_eq!(body["count"], json!(3));
            assert_eq!(review_ids(&body), vec!["r-1", "r-2", "r-3"]);
            assert_eq!(body["data"][0]["date"], json!("2024-05-03T00:00:00.000Z"));
            assert_eq!(body["data"][0]["scoreText"], json!("5"));
            assert_eq!(
                body["data"][0]["url"],
                json!("https://play.google.com/store/apps/details?id=com.whatsapp&reviewId=r-1")
            );
            mock.assert_async().await;

            assert!(metrics_watcher.has_counter("reviews.fetch"));
            assert!(metrics_watcher.has_histogram("reviews.count", 3.0));
            assert!(metrics_watcher.has(|msg| msg.name == "request.duration"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn all_languages_are_merged_when_none_is_given() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools {
             test_client,
             scraper_mock,
             ..
         }| async move {
            scraper_mock
                .mock_async(|when, then| {
                    when.path("/reviews").query_param("lang", "en");
                    then.status(200).json_body(json!([
                        raw_review("en-old", "2024-01-01T00:00:00Z"),
                        raw_review("shared", "2024-03-01T00:00:00Z"),
                    ]));
                })
                .await;
            scraper_mock
                .mock_async(|when, then| {
                    when.path("/reviews").query_param("lang", "fr");
                    then.status(200).json_body(json!({
                        "data": [
                            raw_review("fr-new", "2024-06-01T00:00:00Z"),
                            raw_review("shared", "2024-03-01T00:00:00Z"),
                        ]
                    }));
                })
                .await;
            // Every other language of the country is answered with a 404 by
            // the mock server, which is skipped like any other failure.
            let response = test_client.get("/app?appid=com.whatsapp").send().await?;
            assert_eq!(response.status(), StatusCode::OK);

            let body: Value = response.json().await?;
            assert_eq!(review_ids(&body), vec!["fr-new", "shared", "en-old"]);
            assert_eq!(body["count"], json!(3));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn one_slow_language_does_not_fail_the_fan_out() -> Result<()> {
    reviews_test(
        |settings| {
            // Every attempt of a slow call, retried, would outlast the request.
            settings.reviews.request_timeout = Duration::from_secs(4);
            settings.reviews.fan_out_deadline = Duration::from_secs(3);
            settings.reviews.language_timeout = Duration::from_secs(1);
        },
        |TestingTools {
             test_client,
             scraper_mock,
             mut metrics_watcher,
             ..
         }| async move {
            scraper_mock
                .mock_async(|when, then| {
                    when.path("/reviews").query_param("lang", "en");
                    then.status(200)
                        .json_body(json!([raw_review("en-1", "2024-01-01T00:00:00Z")]));
                })
                .await;
            scraper_mock
                .mock_async(|when, then| {
                    when.path("/reviews").query_param("lang", "es");
                    then.status(200)
                        .delay(Duration::from_secs(3))
                        .json_body(json!([raw_review("es-1", "2024-02-01T00:00:00Z")]));
                })
                .await;

            let response = test_client.get("/app?appid=com.whatsapp").send().await?;
            assert_eq!(response.status(), StatusCode::OK);

            let body: Value = response.json().await?;
            assert_eq!(review_ids(&body), vec!["en-1"]);
            assert!(metrics_watcher.has(|message| {
                message.name == "reviews.fetch"
                    && message
                        .tags
                        .as_ref()
                        .map_or(false, |tags| tags.get("outcome").map(String::as_str) == Some("timeout"))
            }));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn no_reviews_is_an_empty_success() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools {
             test_client,
             scraper_mock,
             ..
         }| async move {
            scraper_mock
                .mock_async(|when, then| {
                    when.path("/reviews");
                    then.status(200).json_body(json!({ "data": null }));
                })
                .await;

            let response = test_client
                .get("/app?appid=com.whatsapp&lang=de")
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::OK);

            let body: Value = response.json().await?;
            assert_eq!(body["data"], json!([]));
            assert_eq!(body["count"], json!(0));
            assert_eq!(body["message"], json!("No reviews found"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn date_cutoffs_drop_older_reviews() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools {
             test_client,
             scraper_mock,
             ..
         }| async move {
            scraper_mock
                .mock_async(|when, then| {
                    when.path("/reviews").query_param("lang", "en");
                    then.status(200).json_body(json!([
                        raw_review("kept", "2024-03-01T00:00:00Z"),
                        raw_review("boundary", "2024-01-01T00:00:00Z"),
                        raw_review("dropped", "2023-12-31T23:59:59Z"),
                    ]));
                })
                .await;

            let response = test_client
                .get("/app?appid=com.whatsapp&lang=en&date=2024-01-01")
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::OK);

            let body: Value = response.json().await?;
            assert_eq!(review_ids(&body), vec!["kept", "boundary"]);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn bad_dates_are_rejected_without_calling_the_scraper() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools {
             test_client,
             scraper_mock,
             ..
         }| async move {
            let mock = scraper_mock
                .mock_async(|when, then| {
                    when.path("/reviews");
                    then.status(200).json_body(json!([]));
                })
                .await;

            let response = test_client
                .get("/app?appid=com.whatsapp&lang=en&date=last-tuesday")
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let body: Value = response.json().await?;
            assert_eq!(
                body["error"],
                json!("Invalid date format: last-tuesday. Use YYYY-MM-DD or relative format (7d, 1w, 1m, 1y)")
            );
            mock.assert_hits_async(0).await;

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn scraper_failures_are_retried_then_reported() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools {
             test_client,
             scraper_mock,
             ..
         }| async move {
            let mock = scraper_mock
                .mock_async(|when, then| {
                    when.path("/reviews");
                    then.status(502);
                })
                .await;

            let response = test_client
                .get("/app?appid=com.whatsapp&lang=en")
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

            let body: Value = response.json().await?;
            assert_eq!(body["error"], json!("Failed to fetch reviews"));
            assert!(body["details"].as_str().unwrap_or_default().contains("502"));
            // The test configuration allows three attempts.
            mock.assert_hits_async(3).await;

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn slow_requests_time_out() -> Result<()> {
    reviews_test(
        |settings| settings.reviews.request_timeout = Duration::from_secs(1),
        |TestingTools {
             test_client,
             scraper_mock,
             ..
         }| async move {
            scraper_mock
                .mock_async(|when, then| {
                    when.path("/reviews");
                    then.status(200)
                        .delay(Duration::from_secs(3))
                        .json_body(json!([]));
                })
                .await;

            let response = test_client
                .get("/app?appid=com.whatsapp&lang=en")
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

            let body: Value = response.json().await?;
            assert_eq!(body["error"], json!("Request timed out"));

            Ok(())
        },
    )
    .await
}
