//! Middlewares specific to Play Reviews.

mod metrics;
mod sentry;

pub use self::metrics::RequestMetrics;
pub use self::sentry::ErrorReporting;

use actix_web::middleware::DefaultHeaders;

/// Browser hardening headers added to every response.
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-Frame-Options", "DENY"))
        .add(("X-XSS-Protection", "1; mode=block"))
}
