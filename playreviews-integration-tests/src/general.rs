//! Tests of behavior shared by every route.
#![cfg(test)]

use crate::{reviews_test, TestingTools};
use anyhow::Result;
use parameterized::parameterized;
use reqwest::{header::HeaderValue, StatusCode};
use serde_json::{json, Value};

#[actix_rt::test]
async fn root_of_service_redirects_to_public_docs() -> Result<()> {
    reviews_test(
        |settings| settings.public_documentation = Some("https://example.com/".parse().unwrap()),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/").send().await?;

            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(
                response.headers().get("location"),
                Some(&HeaderValue::from_static("https://example.com/"))
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn root_of_service_has_a_fallback_message() -> Result<()> {
    reviews_test(
        |settings| settings.public_documentation = None,
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.text().await?,
                "Play Reviews serves normalized Google Play reviews. See /swagger for the API."
            );

            Ok(())
        },
    )
    .await
}

// `parameterized` adds a plain `#[test]`, so each case starts its own runtime.
#[parameterized(path = {"/nowhere", "/app/nowhere", "/debug/nowhere", "/app/info/extra"})]
fn unknown_routes_are_reported(path: &str) {
    actix_rt::System::new()
        .block_on(unknown_route_is_reported(path))
        .expect("unknown route test");
}

async fn unknown_route_is_reported(path: &str) -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get(path).send().await?;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);

            let body: Value = response.json().await?;
            assert_eq!(body["success"], json!(false));
            assert_eq!(body["error"], json!("Route not found"));
            assert_eq!(body["path"], json!(path));
            assert_eq!(body["method"], json!("GET"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn security_headers_are_set() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/health").send().await?;
            let headers = response.headers();

            assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
            assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
            assert_eq!(headers.get("x-xss-protection").unwrap(), "1; mode=block");

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn cross_origin_requests_are_allowed() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .get("/health")
                .header("Origin", "https://dashboard.example.com")
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.headers().get("access-control-allow-origin").unwrap(),
                "https://dashboard.example.com"
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn api_documentation_is_served() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/swagger").send().await?;
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.text().await?.contains("swagger-ui"));

            let response = test_client.get("/swagger.json").send().await?;
            assert_eq!(response.status(), StatusCode::OK);
            let document: Value = response.json().await?;
            assert!(document["paths"]["/app"].is_object());
            assert!(document["paths"]["/info"].is_object());

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn api_info_describes_the_service() -> Result<()> {
    reviews_test(
        |settings| settings.public_documentation = None,
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/info").send().await?;
            assert_eq!(response.status(), StatusCode::OK);

            let body: Value = response.json().await?;
            assert_eq!(body["name"], json!("Play Reviews API"));
            assert!(body["version"].is_string());
            assert_eq!(body["endpoints"]["/app"], json!("Get app reviews"));
            assert_eq!(body["contact"]["name"], json!("API Support"));
            assert_eq!(body["contact"]["url"], Value::Null);
            assert!(body.get("success").is_none());

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn malformed_query_strings_are_bad_requests() -> Result<()> {
    reviews_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .get("/app?appid=com.whatsapp&appid=com.other")
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let body: Value = response.json().await?;
            assert!(body["error"]
                .as_str()
                .unwrap_or_default()
                .starts_with("Invalid query string"));

            Ok(())
        },
    )
    .await
}
