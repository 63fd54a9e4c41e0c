//! Tests of the store lookups: `/app/info`, `/app/search` and
//! `/app/suggestions`.
#![cfg(test)]

use crate::{reviews_test, TestingTools};
use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[actix_rt::test]
async fn app_info_is_passed_through() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools {
             test_client,
             scraper_mock,
             ..
         }| async move {
            let mock = scraper_mock
                .mock_async(|when, then| {
                    when.path("/app")
                        .query_param("appId", "com.whatsapp")
                        .query_param("country", "BR")
                        .query_param("lang", "pt");
                    then.status(200).json_body(json!({
                        "appId": "com.whatsapp",
                        "title": "WhatsApp Messenger",
                        "score": 4.3,
                    }));
                })
                .await;

            let response = test_client
                .get("/app/info?appid=com.whatsapp&country=br&lang=PT")
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::OK);

            let body: Value = response.json().await?;
            assert_eq!(body["success"], json!(true));
            assert_eq!(body["data"]["title"], json!("WhatsApp Messenger"));
            assert_eq!(body["data"]["score"], json!(4.3));
            assert!(body.get("count").is_none());
            mock.assert_async().await;

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn unknown_apps_are_not_found() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools {
             test_client,
             scraper_mock,
             ..
         }| async move {
            scraper_mock
                .mock_async(|when, then| {
                    when.path("/app");
                    then.status(200).json_body(json!({}));
                })
                .await;

            let response = test_client
                .get("/app/info?appid=com.nobody.here")
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);

            let body: Value = response.json().await?;
            assert_eq!(body["error"], json!("App not found"));
            assert_eq!(body["statusCode"], json!(404));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn search_results_are_limited() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools {
             test_client,
             scraper_mock,
             ..
         }| async move {
            let mock = scraper_mock
                .mock_async(|when, then| {
                    when.path("/search")
                        .query_param("term", "chat")
                        .query_param("num", "2");
                    then.status(200).json_body(json!({
                        "results": [
                            { "appId": "com.one.chat" },
                            { "appId": "com.two.chat" },
                            { "appId": "com.three.chat" },
                        ]
                    }));
                })
                .await;

            let response = test_client.get("/app/search?q=chat&limit=2").send().await?;
            assert_eq!(response.status(), StatusCode::OK);

            let body: Value = response.json().await?;
            assert_eq!(body["count"], json!(2));
            assert_eq!(body["data"][1]["appId"], json!("com.two.chat"));
            mock.assert_async().await;

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn search_checks_its_parameters() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/app/search").send().await?;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body: Value = response.json().await?;
            assert_eq!(body["error"], json!("Missing required parameter: q"));

            let response = test_client.get("/app/search?q=chat&limit=500").send().await?;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body: Value = response.json().await?;
            assert_eq!(body["error"], json!("Invalid parameter: limit"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn suggestions_are_plain_strings() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools {
             test_client,
             scraper_mock,
             ..
         }| async move {
            scraper_mock
                .mock_async(|when, then| {
                    when.path("/suggest").query_param("term", "wha");
                    then.status(200)
                        .json_body(json!(["whatsapp", "whatsapp business", 42]));
                })
                .await;

            let response = test_client.get("/app/suggestions?q=wha").send().await?;
            assert_eq!(response.status(), StatusCode::OK);

            let body: Value = response.json().await?;
            assert_eq!(body["data"], json!(["whatsapp", "whatsapp business"]));
            assert_eq!(body["count"], json!(2));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn suggestion_failures_are_unavailable() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools {
             test_client,
             scraper_mock,
             ..
         }| async move {
            scraper_mock
                .mock_async(|when, then| {
                    when.path("/suggest");
                    then.status(200).body("<html>not json</html>");
                })
                .await;

            let response = test_client.get("/app/suggestions?q=wha").send().await?;
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

            let body: Value = response.json().await?;
            assert_eq!(body["error"], json!("Failed to get app suggestions"));
            assert!(body["details"].is_string());

            Ok(())
        },
    )
    .await
}
