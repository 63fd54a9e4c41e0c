//! Service health endpoints for load balancers and operators.

use crate::errors::HandlerError;
use actix_web::{
    get,
    web::{self, Data},
    HttpRequest, HttpResponse,
};
use playreviews_settings::Settings;
use serde::Serialize;
use std::time::Instant;

/// When the server started, for reporting uptime.
#[derive(Debug, Clone, Copy)]
pub struct ServerStart(pub Instant);

/// Handles the health endpoints.
pub fn configure(config: &mut web::ServiceConfig) {
    config
        .service(lbheartbeat)
        .service(health)
        .service(test_error);
}

/// Used by the load balancer to indicate that the server can respond to
/// requests. Should just return OK.
#[get("/__lbheartbeat__")]
async fn lbheartbeat(_: HttpRequest) -> HttpResponse {
    HttpResponse::Ok().body("")
}

/// The body of `GET /health`.
#[derive(Debug, Serialize)]
struct HealthResponse {
    /// Always "healthy" when the server can answer.
    status: &'static str,
    /// When the check ran.
    timestamp: String,
    /// Seconds since the server started.
    uptime: f64,
    /// Process memory use.
    memory: MemoryUsage,
    /// The running version.
    version: &'static str,
}

/// Process memory use, where the platform reports it.
#[derive(Debug, Serialize)]
struct MemoryUsage {
    /// Resident set size.
    rss_bytes: Option<u64>,
}

/// Report that the service is up, with some process information.
#[get("/health")]
async fn health(started: Data<ServerStart>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        timestamp: playreviews_aggregate::timestamp::now(),
        uptime: started.0.elapsed().as_secs_f64(),
        memory: MemoryUsage {
            rss_bytes: resident_memory(),
        },
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// The resident set size of this process, on Linux.
fn resident_memory() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
        let pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
        // Assumes 4 KiB pages.
        Some(pages * 4096)
    }

    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Returning an API error to test error handling. Only in debug mode.
#[get("/__error__")]
async fn test_error(
    request: HttpRequest,
    settings: Data<Settings>,
) -> Result<HttpResponse, HandlerError> {
    if settings.debug {
        Err(HandlerError::internal())
    } else {
        Ok(crate::route_not_found(request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::resident_memory;

    #[test]
    #[cfg(target_os = "linux")]
    fn memory_is_reported_on_linux() {
        assert!(resident_memory().map_or(false, |bytes| bytes > 0));
    }
}
