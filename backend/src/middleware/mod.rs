//! Request middleware.
//!
//! Purpose: cross-cutting request concerns. Applied outermost first:
//! [`Trace`], [`security_headers`], [`ErrorEnvelope`], [`cross_origin`],
//! [`RateLimit`].

pub mod cors;
pub mod error_envelope;
pub mod rate_limit;
pub mod security;
pub mod trace;

pub use cors::cross_origin;
pub use error_envelope::ErrorEnvelope;
pub use rate_limit::{RateLimit, RateLimiter};
pub use security::security_headers;
pub use trace::Trace;
