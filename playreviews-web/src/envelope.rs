//! The JSON wrapper every API response is sent in.

use actix_web::{http::StatusCode, HttpResponse};
use playreviews_aggregate::timestamp;
use serde::Serialize;

/// A successful response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    /// Always `true`.
    success: bool,

    /// The payload.
    data: T,

    /// The HTTP status, repeated for clients that only read bodies.
    status_code: u16,

    /// When the response was built.
    timestamp: String,

    /// The number of items in `data`, for list payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,

    /// A note about the payload, such as why it is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

impl<T: Serialize> Envelope<T> {
    /// Wrap `data` in a 200 response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            status_code: StatusCode::OK.as_u16(),
            timestamp: timestamp::now(),
            count: None,
            message: None,
        }
    }

    /// Report the number of items in the payload.
    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Attach a note about the payload.
    #[must_use]
    pub fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }

    /// Build the HTTP response.
    pub fn into_response(self) -> HttpResponse {
        HttpResponse::Ok().json(self)
    }
}

/// A failed response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// Always `false`.
    success: bool,

    /// What went wrong, for people.
    error: String,

    /// More about what went wrong, when it is safe to share.
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,

    /// The HTTP status, repeated for clients that only read bodies.
    status_code: u16,

    /// When the response was built.
    timestamp: String,

    /// The requested path, for unknown routes.
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,

    /// The requested method, for unknown routes.
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<String>,

    /// The status of the response, not serialized.
    #[serde(skip)]
    status: StatusCode,
}

impl ErrorEnvelope {
    /// An error response with the given status.
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: None,
            status_code: status.as_u16(),
            timestamp: timestamp::now(),
            path: None,
            method: None,
            status,
        }
    }

    /// Add a detail string.
    #[must_use]
    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }

    /// Name the request that could not be routed.
    #[must_use]
    pub fn with_request(mut self, path: &str, method: &str) -> Self {
        self.path = Some(path.to_string());
        self.method = Some(method.to_string());
        self
    }

    /// Build the HTTP response.
    pub fn into_response(self) -> HttpResponse {
        HttpResponse::build(self.status).json(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{Envelope, ErrorEnvelope};
    use actix_web::http::StatusCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn success_shape() {
        let value = serde_json::to_value(Envelope::ok(vec![1, 2]).with_count(2)).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object["success"], json!(true));
        assert_eq!(object["data"], json!([1, 2]));
        assert_eq!(object["statusCode"], json!(200));
        assert_eq!(object["count"], json!(2));
        assert!(object["timestamp"].as_str().unwrap().ends_with('Z'));
        assert!(!object.contains_key("message"));
    }

    #[test]
    fn error_shape() {
        let envelope = ErrorEnvelope::new(StatusCode::NOT_FOUND, "Route not found")
            .with_request("/nope", "GET");
        let value = serde_json::to_value(&envelope).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object["success"], json!(false));
        assert_eq!(object["error"], json!("Route not found"));
        assert_eq!(object["statusCode"], json!(404));
        assert_eq!(object["path"], json!("/nope"));
        assert_eq!(object["method"], json!("GET"));
        assert!(!object.contains_key("details"));
        assert!(!object.contains_key("status"));
    }
}
