//! HTTP server configuration object and helpers.

use crate::inbound::http::state::HttpState;
use crate::middleware::RateLimiter;

/// Builder-style configuration for creating the HTTP server.
#[derive(Debug)]
pub struct ServerConfig {
    pub(crate) state: HttpState,
    pub(crate) limiter: RateLimiter,
    pub(crate) host: String,
    pub(crate) port: u16,
}

impl ServerConfig {
    /// Construct a configuration serving `state` on `host:port` with the
    /// default rate limit.
    #[must_use]
    pub fn new(state: HttpState, host: impl Into<String>, port: u16) -> Self {
        Self {
            state,
            limiter: RateLimiter::default(),
            host: host.into(),
            port,
        }
    }

    /// Replace the rate limiter, for example to share one across servers or
    /// to drive its window from a test clock.
    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Interface the server binds to.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port the server binds to; `0` asks the OS for a free one.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}
