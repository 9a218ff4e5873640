//! Error taxonomy shared by every layer of the API.
//!
//! The type is transport agnostic: [`crate::inbound::http::error`] decides how
//! a code maps onto an HTTP status and how the payload is rendered.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::middleware::trace::TraceId;

/// Header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Stable machine-readable error kind, serialised as the `error` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Client input failed validation; always accompanied by a `field`.
    ValidationError,
    /// The request body could not be decoded.
    BadRequest,
    /// Credentials are missing or wrong.
    AuthenticationError,
    /// No handler matched the request.
    NotFound,
    /// The estimator produced nothing for the given input.
    EstimationError,
    /// The request body exceeded its size ceiling.
    PayloadTooLarge,
    /// The client exhausted its rate-limit window.
    TooManyRequests,
    /// An unexpected failure on the server.
    InternalServerError,
}

impl ErrorCode {
    /// Wire name of the error kind.
    ///
    /// # Examples
    /// ```
    /// use carbon_api::domain::ErrorCode;
    ///
    /// assert_eq!(ErrorCode::ValidationError.as_str(), "ValidationError");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "ValidationError",
            Self::BadRequest => "BadRequest",
            Self::AuthenticationError => "AuthenticationError",
            Self::NotFound => "NotFound",
            Self::EstimationError => "EstimationError",
            Self::PayloadTooLarge => "PayloadTooLarge",
            Self::TooManyRequests => "TooManyRequests",
            Self::InternalServerError => "InternalServerError",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API error payload.
///
/// Serialises as `{ "error": <kind>, "message": <text>, ...details }` with an
/// optional `errors` array. Context keys such as `field` or `maxLength` are
/// flattened into the top-level object.
///
/// # Examples
/// ```
/// use carbon_api::domain::{Error, ErrorCode};
///
/// let err = Error::validation("dish", "Dish name is required");
/// assert_eq!(err.code(), ErrorCode::ValidationError);
/// assert_eq!(err.field(), Some("dish"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Error {
    #[serde(rename = "error")]
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<Value>>,
    #[serde(flatten)]
    details: Map<String, Value>,
    #[serde(skip)]
    trace_id: Option<String>,
    #[serde(skip)]
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error.
    ///
    /// Captures the current trace identifier if one is in scope so the
    /// response is correlated automatically.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            errors: None,
            details: Map::new(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            source: None,
        }
    }

    /// Validation failure tied to a request field.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message).with_detail("field", field)
    }

    /// Malformed request body.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Missing or rejected credentials.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthenticationError, message)
    }

    /// Unmatched route or resource.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Empty estimation result.
    pub fn estimation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EstimationError, message)
    }

    /// Oversized request body.
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PayloadTooLarge, message)
    }

    /// Rate-limit rejection.
    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TooManyRequests, message)
    }

    /// Unexpected server failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalServerError, message)
    }

    /// Attach a context key rendered at the top level of the payload.
    ///
    /// The reserved keys `error`, `message` and `errors` are ignored.
    ///
    /// # Examples
    /// ```
    /// use carbon_api::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::validation("dish", "too long").with_detail("maxLength", 100);
    /// assert_eq!(err.details().get("maxLength"), Some(&json!(100)));
    /// ```
    #[must_use]
    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        if !matches!(key, "error" | "message" | "errors") {
            self.details.insert(key.to_owned(), value.into());
        }
        self
    }

    /// Attach structured sub-errors, rendered verbatim under `errors`.
    #[must_use]
    pub fn with_errors(mut self, errors: Vec<Value>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Attach a trace identifier to the error.
    #[must_use]
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Record the underlying cause. It is only ever surfaced outside
    /// production builds of the error payload.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Stable machine-readable error kind.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Flattened context keys.
    #[must_use]
    pub const fn details(&self) -> &Map<String, Value> {
        &self.details
    }

    /// Offending request field, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.details.get("field").and_then(Value::as_str)
    }

    /// Structured sub-errors.
    #[must_use]
    pub fn errors(&self) -> Option<&[Value]> {
        self.errors.as_deref()
    }

    /// Trace identifier captured when the error was raised.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Render the error and its `source()` chain, one cause per line.
    ///
    /// # Examples
    /// ```
    /// use carbon_api::domain::Error;
    ///
    /// let io = std::io::Error::other("disk on fire");
    /// let err = Error::internal("boom").with_source(io);
    /// assert_eq!(err.stack(), "InternalServerError: boom\n    caused by: disk on fire");
    /// ```
    #[must_use]
    pub fn stack(&self) -> String {
        let mut stack = format!("{}: {}", self.code, self.message);
        let mut cause = std::error::Error::source(self);
        while let Some(inner) = cause {
            stack.push_str("\n    caused by: ");
            stack.push_str(&inner.to_string());
            cause = inner.source();
        }
        stack
    }

    /// Copy of the error with internal context removed.
    ///
    /// Internal failures lose their message and details; every other kind is
    /// returned unchanged.
    #[must_use]
    pub fn redacted(&self) -> Self {
        if !matches!(self.code, ErrorCode::InternalServerError) {
            return self.clone();
        }
        let mut redacted = Self::internal(DEFAULT_INTERNAL_MESSAGE);
        redacted.trace_id.clone_from(&self.trace_id);
        redacted
    }
}

/// Message exposed for internal failures outside development.
pub const DEFAULT_INTERNAL_MESSAGE: &str = "Something went wrong";

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn std::error::Error + 'static))
    }
}
