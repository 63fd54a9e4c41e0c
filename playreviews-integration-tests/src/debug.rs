//! Tests of the debug pages.
#![cfg(test)]

use crate::{reviews_test, TestingTools};
use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[actix_rt::test]
async fn settings_page_reads_as_unknown_outside_debug_mode() -> Result<()> {
    reviews_test(
        |settings| settings.debug = false,
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/debug/settings").send().await?;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);

            let body: Value = response.json().await?;
            assert_eq!(body["error"], json!("Route not found"));
            assert_eq!(body["path"], json!("/debug/settings"));
            assert!(body.get("env").is_none());

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn settings_page_shows_the_loaded_settings() -> Result<()> {
    reviews_test(
        |settings| {
            settings.debug = true;
            settings.reviews.page_size = 50;
        },
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/debug/settings").send().await?;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.headers().get("content-type").map(|v| v.as_bytes()),
                Some(&b"application/json"[..])
            );

            let settings: Value = response.json().await?;
            assert_eq!(settings["env"], json!("test"));
            assert_eq!(settings["reviews"]["default_country"], json!("US"));
            assert_eq!(settings["reviews"]["page_size"], json!(50));

            Ok(())
        },
    )
    .await
}
