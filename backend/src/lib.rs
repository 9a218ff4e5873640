//! Carbon Footprint API.
//!
//! Mocked carbon-footprint estimates for dishes and food photos, served over
//! HTTP with Basic authentication, per-IP rate limiting and one JSON error
//! shape for every failure.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod server;
mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
pub use settings::{AppSettings, Environment, SettingsError};
