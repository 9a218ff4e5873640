//! Health and version endpoints. Both are public.

use actix_web::{HttpResponse, get, web};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::state::HttpState;

/// Version reported by `GET /api/version`.
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// RFC 3339 UTC timestamp with millisecond precision and a `Z` suffix.
#[must_use]
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Serialize)]
struct Health<'a> {
    status: &'static str,
    timestamp: String,
    uptime: f64,
    environment: &'a str,
}

#[derive(Debug, Serialize)]
struct VersionInfo {
    version: &'static str,
    status: &'static str,
    timestamp: String,
}

/// Liveness report with uptime in seconds.
#[utoipa::path(
    get,
    path = "/health",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is healthy", body = crate::inbound::http::schemas::HealthSchema)
    )
)]
#[get("/health")]
pub async fn health(state: web::Data<HttpState>) -> HttpResponse {
    let now = state.clock.utc();
    // A clock that moved backwards reports zero rather than failing.
    let uptime = (now - state.started_at)
        .to_std()
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default();
    HttpResponse::Ok().json(Health {
        status: "ok",
        timestamp: timestamp(now),
        uptime,
        environment: state.environment.as_str(),
    })
}

/// API version and status.
#[utoipa::path(
    get,
    path = "/api/version",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "API version information", body = crate::inbound::http::schemas::VersionSchema)
    )
)]
#[get("/api/version")]
pub async fn version(state: web::Data<HttpState>) -> HttpResponse {
    HttpResponse::Ok().json(VersionInfo {
        version: API_VERSION,
        status: "active",
        timestamp: timestamp(state.clock.utc()),
    })
}
