//! Server construction and middleware wiring.

mod config;
mod lifecycle;

pub use config::ServerConfig;
pub use lifecycle::{FatalReporter, ServerLifecycle, StopReason};

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use crate::inbound::http::docs::{openapi_json, swagger_ui};
use crate::inbound::http::error::not_found;
use crate::inbound::http::estimate::{estimate, upload};
use crate::inbound::http::health::{health, version};
use crate::inbound::http::state::HttpState;
use crate::middleware::{
    ErrorEnvelope, RateLimit, RateLimiter, Trace, cross_origin, security_headers,
};

/// Assemble the application: routes, the not-found fallback and the
/// middleware stack.
///
/// Requests pass through `Trace`, the security headers, the error envelope,
/// CORS and the rate limiter, in that order, before reaching a handler.
/// Preflights stop at CORS and never count against the limit. Handlers then
/// authenticate, validate and estimate.
pub fn build_app(
    state: web::Data<HttpState>,
    limiter: RateLimiter,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let environment = state.environment;

    App::new()
        .app_data(state)
        .service(estimate)
        .service(upload)
        .service(health)
        .service(version)
        .service(openapi_json)
        .service(swagger_ui())
        .default_service(web::to(not_found))
        .wrap(RateLimit::new(limiter))
        .wrap(cross_origin())
        .wrap(ErrorEnvelope::new(environment))
        .wrap(security_headers())
        .wrap(Trace)
}

/// Construct an Actix HTTP server from `config`.
///
/// Signal handling is left to [`ServerLifecycle`], so the returned server
/// only stops through its handle.
///
/// # Returns
/// A [`Server`] that must be awaited (or handed to
/// [`ServerLifecycle::run`]) to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let ServerConfig {
        state,
        limiter,
        host,
        port,
    } = config;
    let environment = state.environment;
    let state = web::Data::new(state);

    let server = HttpServer::new(move || build_app(state.clone(), limiter.clone()))
        .disable_signals()
        .bind((host.as_str(), port))?;
    info!(addrs = ?server.addrs(), %environment, "listening");

    Ok(server.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::auth::BasicCredentials;
    use crate::settings::Environment;
    use actix_web::http::StatusCode;
    use actix_web::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, ORIGIN};
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    fn state() -> web::Data<HttpState> {
        web::Data::new(HttpState::new(
            BasicCredentials::new("admin", "password"),
            Environment::Development,
        ))
    }

    #[rstest]
    #[actix_web::test]
    async fn routed_failures_render_the_envelope() {
        let app = actix_test::init_service(build_app(state(), RateLimiter::default())).await;
        let req = actix_test::TestRequest::post()
            .uri("/estimate?source=web")
            .insert_header((CONTENT_TYPE, "application/json"))
            .set_payload(r#"{"dish":"Pasta"}"#)
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["error"], "AuthenticationError");
        assert!(body["stack"].is_string());
    }

    #[rstest]
    #[actix_web::test]
    async fn preflights_pass_the_full_stack() {
        let app = actix_test::init_service(build_app(state(), RateLimiter::default())).await;
        let req = actix_test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/estimate")
            .insert_header((ORIGIN, "https://meals.example"))
            .insert_header(("Access-Control-Request-Method", "POST"))
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get(ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|value| value.to_str().ok()),
            Some("https://meals.example")
        );
        assert!(res.headers().contains_key("x-content-type-options"));
    }
}
