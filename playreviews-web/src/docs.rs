//! Documentation views: the root page and the OpenAPI description of the API.

use actix_web::{get, web::Data, HttpResponse};
use playreviews_settings::Settings;
use serde::Serialize;
use std::collections::BTreeMap;
use url::Url;

/// The OpenAPI 3 description of every endpoint.
const OPENAPI_DOCUMENT: &str = include_str!("../openapi.json");

/// A Swagger UI page that renders [`OPENAPI_DOCUMENT`].
const SWAGGER_PAGE: &str = include_str!("../swagger.html");

/// Handles the documentation endpoints.
pub fn configure(config: &mut actix_web::web::ServiceConfig) {
    config
        .service(root_info)
        .service(api_info)
        .service(swagger_ui)
        .service(swagger_json);
}

/// The root view, to provide information about what this service is.
///
/// This is intended to be seen by people trying to investigate what this service
/// is. It should redirect to documentation, if it is available, or provide a
/// short message otherwise.
#[get("/")]
pub async fn root_info(settings: Data<Settings>) -> HttpResponse {
    match &settings.public_documentation {
        Some(redirect_url) => HttpResponse::Found()
            .insert_header(("location", redirect_url.to_string()))
            .finish(),
        None => HttpResponse::Ok()
            .content_type("text/plain")
            .body("Play Reviews serves normalized Google Play reviews. See /swagger for the API."),
    }
}

/// What `/info` says about the service.
#[derive(Debug, Serialize)]
struct ApiInfo {
    /// The service's name.
    name: &'static str,
    /// The running build's version.
    version: &'static str,
    /// One sentence about the service.
    description: &'static str,
    /// Path to a one line summary.
    endpoints: BTreeMap<&'static str, &'static str>,
    /// What the service offers.
    features: [&'static str; 6],
    /// Where to read more.
    contact: Contact,
}

/// Where to read more.
#[derive(Debug, Serialize)]
struct Contact {
    /// Who to contact.
    name: &'static str,
    /// The public documentation, when configured.
    url: Option<Url>,
}

/// A description of the service and its routes.
#[get("/info")]
async fn api_info(settings: Data<Settings>) -> HttpResponse {
    let endpoints = [
        ("/app", "Get app reviews"),
        ("/app/info", "Get app information"),
        ("/app/search", "Search for apps"),
        ("/app/suggestions", "Get app suggestions"),
        ("/swagger", "Interactive API documentation"),
        ("/swagger.json", "OpenAPI specification"),
        ("/health", "API health status"),
        ("/info", "API information"),
    ];
    HttpResponse::Ok().json(ApiInfo {
        name: "Play Reviews API",
        version: env!("CARGO_PKG_VERSION"),
        description: "Fetches Google Play reviews with multi-language support",
        endpoints: endpoints.into_iter().collect(),
        features: [
            "Reviews from every likely language of a country",
            "Country-specific reviews",
            "Normalized and deduplicated review records",
            "Absolute and relative date filters",
            "Retries for transient scraper failures",
            "Structured logs, statsd metrics and Sentry reporting",
        ],
        contact: Contact {
            name: "API Support",
            url: settings.public_documentation.clone(),
        },
    })
}

/// Interactive API documentation.
#[get("/swagger")]
async fn swagger_ui() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(SWAGGER_PAGE)
}

/// The OpenAPI document behind `/swagger`.
#[get("/swagger.json")]
async fn swagger_json() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .body(OPENAPI_DOCUMENT)
}

#[cfg(test)]
mod tests {
    use super::{api_info, OPENAPI_DOCUMENT};
    use actix_web::{http::StatusCode, test, web::Data, App};
    use playreviews_settings::Settings;
    use serde_json::{json, Value};

    #[actix_rt::test]
    async fn api_info_lists_the_routes() {
        let settings = Settings::load_for_tests(|settings| {
            settings.public_documentation = Some("https://docs.example.com/".parse().unwrap());
        });
        let app =
            test::init_service(App::new().app_data(Data::new(settings)).service(api_info)).await;

        let response =
            test::call_service(&app, test::TestRequest::get().uri("/info").to_request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = test::read_body_json(response).await;

        assert_eq!(body["name"], json!("Play Reviews API"));
        assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));
        assert_eq!(body["endpoints"]["/info"], json!("API information"));
        assert_eq!(body["endpoints"].as_object().map(|e| e.len()), Some(8));
        assert_eq!(body["features"].as_array().map(Vec::len), Some(6));
        assert_eq!(body["contact"]["url"], json!("https://docs.example.com/"));
    }

    #[::core::prelude::v1::test]
    fn openapi_document_describes_every_route() {
        let document: Value = serde_json::from_str(OPENAPI_DOCUMENT).expect("valid JSON");
        assert_eq!(document["openapi"].as_str().map(|v| &v[..2]), Some("3."));
        let paths = document["paths"].as_object().expect("paths");
        for path in ["/app", "/app/info", "/app/search", "/app/suggestions", "/health", "/info"] {
            assert!(paths.contains_key(path), "{path} is documented");
        }
    }
}
