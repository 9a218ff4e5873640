//! Terminal error funnel.
//!
//! Every failure, whether raised by a handler, an extractor, an inner
//! middleware or the framework itself, leaves the application through this
//! layer as one JSON envelope. Outside production the envelope carries a
//! `stack` and the failing request is logged with its body, path parameters
//! and query string.

use std::task::{Context, Poll};

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderName};
use actix_web::error::InternalError;
use actix_web::{Error, HttpMessage, HttpRequest, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde_json::{Map, Value};
use tracing::error;

use crate::domain::{Error as ApiError, ErrorCode};
use crate::inbound::http::body::RequestBody;
use crate::inbound::http::error::{normalise, render_error};
use crate::settings::Environment;

/// Middleware rendering every failure with the configured [`Environment`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use carbon_api::Environment;
/// use carbon_api::middleware::ErrorEnvelope;
///
/// let app = App::new().wrap(ErrorEnvelope::new(Environment::Production));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorEnvelope {
    environment: Environment,
}

impl ErrorEnvelope {
    /// Render failures for `environment`.
    #[must_use]
    pub const fn new(environment: Environment) -> Self {
        Self { environment }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ErrorEnvelope
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorEnvelopeMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorEnvelopeMiddleware {
            service,
            environment: self.environment,
        }))
    }
}

/// Service wrapper produced by [`ErrorEnvelope`].
pub struct ErrorEnvelopeMiddleware<S> {
    service: S,
    environment: Environment,
}

impl<S, B> Service<ServiceRequest> for ErrorEnvelopeMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let environment = self.environment;
        // Only owned copies may outlive this call: the router needs sole
        // ownership of the request while it matches.
        let context = RequestContext::capture(&req);
        let fut = self.service.call(req);
        Box::pin(async move {
            match fut.await {
                Ok(res) => {
                    let Some(error) = res.response().error().map(normalise) else {
                        return Ok(res.map_into_left_body());
                    };
                    let context = context.routed(res.request());
                    log_failure(&context, &error, environment);
                    let rendered = rerender(res.response(), &error, environment);
                    Ok(res.into_response(rendered).map_into_right_body())
                }
                Err(err) => {
                    let error = normalise(&err);
                    log_failure(&context, &error, environment);
                    let rendered = render_error(&error, environment);
                    Err(InternalError::from_response(err, rendered).into())
                }
            }
        })
    }
}

/// Render `error` afresh, keeping headers the original response set that the
/// envelope does not, such as `Retry-After`.
fn rerender<B>(
    original: &HttpResponse<B>,
    error: &ApiError,
    environment: Environment,
) -> HttpResponse {
    let mut rendered = render_error(error, environment);
    let owned: Vec<HeaderName> = rendered.headers().keys().cloned().collect();
    for (name, value) in original.headers() {
        if *name == CONTENT_TYPE || *name == CONTENT_LENGTH || owned.contains(name) {
            continue;
        }
        rendered.headers_mut().append(name.clone(), value.clone());
    }
    rendered
}

/// Request details logged with a failure.
#[derive(Debug, Default)]
struct RequestContext {
    method: String,
    path: String,
    query: String,
    params: Map<String, Value>,
    body: String,
}

impl RequestContext {
    fn capture(req: &ServiceRequest) -> Self {
        Self {
            method: req.method().to_string(),
            path: req.path().to_owned(),
            query: req.query_string().to_owned(),
            ..Self::default()
        }
    }

    /// Add the path parameters and captured body once routing has finished.
    fn routed(self, req: &HttpRequest) -> Self {
        let params = req
            .match_info()
            .iter()
            .map(|(key, value)| (key.to_owned(), Value::from(value)))
            .collect();
        let body = req
            .extensions()
            .get::<RequestBody>()
            .map(|captured| captured.0.to_string())
            .unwrap_or_default();
        Self {
            params,
            body,
            ..self
        }
    }
}

fn log_failure(context: &RequestContext, error: &ApiError, environment: Environment) {
    if environment.is_production() {
        if error.code() == ErrorCode::InternalServerError {
            error!(error = %error.code(), message = error.message(), "request failed");
        }
        return;
    }
    let params = Value::Object(context.params.clone());
    error!(
        error = %error.code(),
        message = error.message(),
        stack = %error.stack(),
        path = %context.path,
        method = %context.method,
        body = %context.body,
        params = %params,
        query = %context.query,
        "request failed"
    );
}
