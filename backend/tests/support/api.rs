//! In-process harness driving the fully wired application.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{test as actix_test, web};
use carbon_api::Environment;
use carbon_api::inbound::http::auth::BasicCredentials;
use carbon_api::inbound::http::state::HttpState;
use carbon_api::middleware::RateLimiter;
use carbon_api::server::build_app;
use carbon_api::test_support::{MutableClock, basic_auth_header};
use chrono::TimeDelta;
use serde_json::Value;

pub(crate) const USER: &str = "admin";
pub(crate) const PASSWORD: &str = "password";

/// Captured response.
pub(crate) struct Reply {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Value,
    pub(crate) text: String,
}

impl Reply {
    pub(crate) fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Application state plus the clock driving both uptime and the rate limit.
#[derive(Clone)]
pub(crate) struct ApiHarness {
    pub(crate) state: web::Data<HttpState>,
    pub(crate) limiter: RateLimiter,
    pub(crate) clock: Arc<MutableClock>,
}

impl ApiHarness {
    pub(crate) fn new(environment: Environment) -> Self {
        Self::with_limit(environment, 100, TimeDelta::minutes(15))
    }

    pub(crate) fn with_limit(environment: Environment, max: u32, window: TimeDelta) -> Self {
        let clock = Arc::new(MutableClock::default());
        let state = HttpState::with_clock(
            BasicCredentials::new(USER, PASSWORD),
            environment,
            clock.clone(),
        );
        Self {
            state: web::Data::new(state),
            limiter: RateLimiter::new(max, window, clock.clone()),
            clock,
        }
    }

    /// Send `req` through a freshly built app sharing this harness's state.
    pub(crate) async fn call(&self, req: actix_test::TestRequest) -> Reply {
        let app = actix_test::init_service(build_app(self.state.clone(), self.limiter.clone())).await;
        let res = actix_test::call_service(&app, req.to_request()).await;
        let status = res.status();
        let headers = res.headers().clone();
        let bytes = actix_test::read_body(res).await;
        Reply {
            status,
            headers,
            body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

/// `POST /estimate` with valid credentials and a JSON body.
pub(crate) fn estimate_request(body: &Value) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri("/estimate")
        .insert_header((AUTHORIZATION, basic_auth_header(USER, PASSWORD)))
        .set_json(body)
}
