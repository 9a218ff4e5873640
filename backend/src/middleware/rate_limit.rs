//! Fixed-window request limiting keyed by client address.
//!
//! Each client gets a budget of requests per window. The first request opens
//! the window; once it elapses the counter starts over. Rejected requests are
//! answered with a `TooManyRequests` error and a `Retry-After` header, and
//! never reach the wrapped service.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue, RETRY_AFTER};
use chrono::{DateTime, TimeDelta, Utc};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use mockable::{Clock, DefaultClock};
use tracing::warn;

use crate::domain::Error as ApiError;

/// Requests allowed per client and window by default.
pub const DEFAULT_MAX_REQUESTS: u32 = 100;
/// Default window length in minutes.
pub const DEFAULT_WINDOW_MINUTES: i64 = 15;
/// Message sent with every rejection.
pub const RATE_LIMIT_MESSAGE: &str =
    "Too many requests from this IP, please try again after 15 minutes";

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";
// Expired windows are swept once the table grows past this many clients.
const PRUNE_THRESHOLD: usize = 1024;

/// Outcome of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request fits in the window.
    Allowed {
        /// Requests left before the window is exhausted.
        remaining: u32,
    },
    /// The window is exhausted.
    Limited {
        /// Whole seconds until the window resets, never less than one.
        retry_after_secs: i64,
    },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    resets_at: DateTime<Utc>,
}

/// Shared request counter.
///
/// Clones share one table, so a single limiter can back every worker of an
/// `HttpServer`.
#[derive(Clone)]
pub struct RateLimiter {
    max_requests: u32,
    window: TimeDelta,
    clock: Arc<dyn Clock + Send + Sync>,
    windows: Arc<Mutex<HashMap<Option<IpAddr>, Window>>>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max_requests", &self.max_requests)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_REQUESTS,
            TimeDelta::minutes(DEFAULT_WINDOW_MINUTES),
            Arc::new(DefaultClock),
        )
    }
}

impl RateLimiter {
    /// Build a limiter allowing `max_requests` per `window`, timed by `clock`.
    #[must_use]
    pub fn new(
        max_requests: u32,
        window: TimeDelta,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            max_requests,
            window,
            clock,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Requests allowed per window.
    #[must_use]
    pub const fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Count one request from `client` and decide whether it may proceed.
    ///
    /// Requests without a known peer address share a single bucket.
    #[must_use]
    pub fn check(&self, client: Option<IpAddr>) -> Decision {
        let now = self.clock.utc();
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        if windows.len() >= PRUNE_THRESHOLD {
            windows.retain(|_, window| now < window.resets_at);
        }

        let window = windows.entry(client).or_insert(Window {
            count: 0,
            resets_at: now + self.window,
        });
        if now >= window.resets_at {
            *window = Window {
                count: 0,
                resets_at: now + self.window,
            };
        }

        if window.count >= self.max_requests {
            let retry_after_secs = (window.resets_at - now).num_seconds().max(1);
            return Decision::Limited { retry_after_secs };
        }
        window.count += 1;
        Decision::Allowed {
            remaining: self.max_requests - window.count,
        }
    }
}

/// Middleware applying a [`RateLimiter`] to every request.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use carbon_api::middleware::{RateLimit, RateLimiter};
///
/// let app = App::new().wrap(RateLimit::new(RateLimiter::default()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    limiter: RateLimiter,
}

impl RateLimit {
    /// Wrap an existing limiter.
    #[must_use]
    pub const fn new(limiter: RateLimiter) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            limiter: self.limiter.clone(),
        }))
    }
}

/// Service wrapper produced by [`RateLimit`].
pub struct RateLimitMiddleware<S> {
    service: S,
    limiter: RateLimiter,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let client = req.peer_addr().map(|addr| addr.ip());
        let limit = self.limiter.max_requests();
        match self.limiter.check(client) {
            Decision::Allowed { remaining } => {
                let fut = self.service.call(req);
                Box::pin(async move {
                    let mut res = fut.await?;
                    let headers = res.headers_mut();
                    headers.insert(
                        HeaderName::from_static(LIMIT_HEADER),
                        HeaderValue::from(limit),
                    );
                    headers.insert(
                        HeaderName::from_static(REMAINING_HEADER),
                        HeaderValue::from(remaining),
                    );
                    Ok(res.map_into_left_body())
                })
            }
            Decision::Limited { retry_after_secs } => {
                warn!(client = ?client, retry_after_secs, "rate limit exceeded");
                let mut res = req.error_response(ApiError::too_many_requests(RATE_LIMIT_MESSAGE));
                let headers = res.headers_mut();
                headers.insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
                headers.insert(
                    HeaderName::from_static(LIMIT_HEADER),
                    HeaderValue::from(limit),
                );
                headers.insert(
                    HeaderName::from_static(REMAINING_HEADER),
                    HeaderValue::from(0_u32),
                );
                Box::pin(ready(Ok(res.map_into_right_body())))
            }
        }
    }
}
