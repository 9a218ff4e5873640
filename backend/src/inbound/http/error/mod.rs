//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while giving every
//! failure the same JSON envelope, status code, `trace-id` header and, for
//! authentication failures, a Basic challenge.

use actix_web::http::StatusCode;
use actix_web::http::header::WWW_AUTHENTICATE;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use serde_json::{Value, json};
use tracing::error;

use crate::domain::{DEFAULT_INTERNAL_MESSAGE, Error, ErrorCode, TRACE_ID_HEADER};
use crate::settings::Environment;

use super::auth::AUTH_REALM;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// HTTP status for an error kind.
#[must_use]
pub const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationError | ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
        ErrorCode::AuthenticationError => StatusCode::UNAUTHORIZED,
        ErrorCode::NotFound | ErrorCode::EstimationError => StatusCode::NOT_FOUND,
        ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorCode::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        ErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error kind for a status raised outside the domain, e.g. by the framework.
#[must_use]
pub fn code_for_status(status: StatusCode) -> ErrorCode {
    match status {
        StatusCode::UNAUTHORIZED => ErrorCode::AuthenticationError,
        StatusCode::NOT_FOUND => ErrorCode::NotFound,
        StatusCode::PAYLOAD_TOO_LARGE => ErrorCode::PayloadTooLarge,
        StatusCode::TOO_MANY_REQUESTS => ErrorCode::TooManyRequests,
        status if status.is_client_error() => ErrorCode::BadRequest,
        _ => ErrorCode::InternalServerError,
    }
}

/// Recover a domain error from an Actix error.
///
/// Domain errors pass through untouched. Anything else is classified by its
/// status code and keeps its display text as the message.
#[must_use]
pub fn normalise(err: &actix_web::Error) -> Error {
    if let Some(domain) = err.as_error::<Error>() {
        return domain.clone();
    }
    let code = code_for_status(err.as_response_error().status_code());
    let message = err.to_string();
    if message.is_empty() {
        Error::new(code, DEFAULT_INTERNAL_MESSAGE)
    } else {
        Error::new(code, message)
    }
}

/// JSON body for `error`.
///
/// Production redacts internal failures; every other mode adds a `stack`
/// field with the error and its causes.
#[must_use]
pub fn error_body(error: &Error, environment: Environment) -> Value {
    let payload = if environment.is_production() {
        error.redacted()
    } else {
        error.clone()
    };
    let mut body = serde_json::to_value(&payload).unwrap_or_else(|err| {
        error!(error = %err, "failed to serialise error payload");
        json!({ "error": payload.code().as_str(), "message": payload.message() })
    });
    if environment.is_production() {
        return body;
    }
    if let Some(object) = body.as_object_mut() {
        object.insert("stack".to_owned(), Value::String(error.stack()));
    }
    body
}

/// Render `error` as a complete response for the given mode.
#[must_use]
pub fn render_error(error: &Error, environment: Environment) -> HttpResponse {
    let mut builder = HttpResponse::build(status_for(error.code()));
    if let Some(id) = error.trace_id() {
        builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
    }
    if error.code() == ErrorCode::AuthenticationError {
        builder.insert_header((WWW_AUTHENTICATE, format!("Basic realm=\"{AUTH_REALM}\"")));
    }
    builder.json(error_body(error, environment))
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    // The error envelope middleware re-renders with the configured mode; the
    // default is the safe one.
    fn error_response(&self) -> HttpResponse {
        render_error(self, Environment::Production)
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        normalise(&err)
    }
}

/// Fallback for unmatched routes.
///
/// # Errors
/// Always returns a `NotFound` error naming the method and path.
pub async fn not_found(req: HttpRequest) -> ApiResult<HttpResponse> {
    Err(Error::not_found(format!(
        "Cannot {} {}",
        req.method(),
        req.path()
    )))
}
