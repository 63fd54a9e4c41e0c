//! Tests of the health endpoints.
#![cfg(test)]

use crate::{reviews_test, TestingTools};
use anyhow::Result;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

#[actix_rt::test]
async fn lbheartbeat_works() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/__lbheartbeat__").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.content_length(), Some(0));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn health_reports_the_process() -> Result<()> {
    /// The parts of the health report with a fixed shape.
    #[derive(Deserialize, Debug)]
    struct Health {
        status: String,
        timestamp: String,
        uptime: f64,
        memory: Value,
        version: String,
    }

    reviews_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/health").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response
                    .headers()
                    .get_all("content-type")
                    .iter()
                    .collect::<Vec<_>>(),
                vec!["application/json"]
            );

            let health: Health = response.json().await?;
            assert_eq!(health.status, "healthy");
            assert!(health.timestamp.ends_with('Z'));
            assert!(health.uptime >= 0.0);
            assert!(health.memory.is_object());
            assert!(!health.version.is_empty());

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn error_route_fails_in_debug_mode() -> Result<()> {
    reviews_test(
        |settings| settings.debug = true,
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/__error__").send().await?;

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body: Value = response.json().await?;
            assert_eq!(body["error"], json!("Internal server error"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn error_route_is_hidden_outside_debug_mode() -> Result<()> {
    reviews_test(
        |settings| settings.debug = false,
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/__error__").send().await?;

            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            let body: Value = response.json().await?;
            assert_eq!(body["error"], json!("Route not found"));

            Ok(())
        },
    )
    .await
}
