//! HTTP Basic authentication for the estimation endpoints.
//!
//! Handlers take an [`Authenticated`] argument; the extractor runs before any
//! body extractor, so unauthenticated requests are rejected before their
//! payload is read or validated.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures_util::future::{Ready, ready};
use sha2::{Digest, Sha256, digest::Output};
use thiserror::Error;
use tracing::debug;

use crate::domain::Error;

use super::ApiResult;
use super::state::HttpState;

/// Realm advertised in the `WWW-Authenticate` challenge.
pub const AUTH_REALM: &str = "Carbon Footprint API";

const AUTH_REQUIRED_MESSAGE: &str = "Authentication required";
const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

/// Reasons an `Authorization` header cannot be read as Basic credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsError {
    /// The scheme is not `Basic`.
    #[error("authorization scheme is not Basic")]
    UnsupportedScheme,
    /// The token is not valid base64.
    #[error("credentials are not valid base64")]
    InvalidEncoding,
    /// The decoded token is not UTF-8.
    #[error("credentials are not valid UTF-8")]
    InvalidUtf8,
    /// The decoded token has no `:` separator.
    #[error("credentials are missing the user/password separator")]
    MissingSeparator,
}

/// Username and password supplied by a client.
#[derive(Clone, PartialEq, Eq)]
pub struct SuppliedCredentials {
    username: String,
    password: String,
}

impl SuppliedCredentials {
    /// Claimed username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Claimed password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for SuppliedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuppliedCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parse the value of an `Authorization: Basic ...` header.
///
/// The scheme is matched case-insensitively. Everything after the first `:`
/// of the decoded token is the password.
///
/// # Errors
/// Returns a [`CredentialsError`] describing the first malformed part.
///
/// # Examples
/// ```
/// use carbon_api::inbound::http::auth::parse_basic_header;
///
/// let creds = parse_basic_header("Basic YWRtaW46cGFzc3dvcmQ=").expect("valid header");
/// assert_eq!(creds.username(), "admin");
/// assert_eq!(creds.password(), "password");
/// ```
pub fn parse_basic_header(value: &str) -> Result<SuppliedCredentials, CredentialsError> {
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(CredentialsError::UnsupportedScheme)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(CredentialsError::UnsupportedScheme);
    }
    let decoded = STANDARD
        .decode(token.trim())
        .map_err(|_| CredentialsError::InvalidEncoding)?;
    let decoded = String::from_utf8(decoded).map_err(|_| CredentialsError::InvalidUtf8)?;
    let (username, password) = decoded
        .split_once(':')
        .ok_or(CredentialsError::MissingSeparator)?;
    Ok(SuppliedCredentials {
        username: username.to_owned(),
        password: password.to_owned(),
    })
}

/// The single configured user.
///
/// Only SHA-256 digests are kept, and comparisons run over digests of equal
/// length.
#[derive(Clone)]
pub struct BasicCredentials {
    username: Output<Sha256>,
    password: Output<Sha256>,
}

impl BasicCredentials {
    /// Store digests of the accepted username and password.
    #[must_use]
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: Sha256::digest(username.as_bytes()),
            password: Sha256::digest(password.as_bytes()),
        }
    }

    /// Whether the pair matches the configured user.
    #[must_use]
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let user_ok = Sha256::digest(username.as_bytes()) == self.username;
        let password_ok = Sha256::digest(password.as_bytes()) == self.password;
        user_ok & password_ok
    }
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials").finish_non_exhaustive()
    }
}

/// Check the request's `Authorization` header against `expected`.
///
/// # Errors
/// Returns an `AuthenticationError` when the header is missing, malformed or
/// carries the wrong credentials.
pub fn authenticate(req: &HttpRequest, expected: &BasicCredentials) -> ApiResult<String> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized(AUTH_REQUIRED_MESSAGE))?;
    let header = header
        .to_str()
        .map_err(|err| Error::unauthorized(INVALID_CREDENTIALS_MESSAGE).with_source(err))?;
    let supplied = parse_basic_header(header).map_err(|err| {
        debug!(error = %err, "rejected malformed authorization header");
        Error::unauthorized(INVALID_CREDENTIALS_MESSAGE).with_source(err)
    })?;
    if expected.verify(supplied.username(), supplied.password()) {
        Ok(supplied.username)
    } else {
        debug!(username = supplied.username(), "rejected credentials");
        Err(Error::unauthorized(INVALID_CREDENTIALS_MESSAGE))
    }
}

/// Extractor proving the request carried valid Basic credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    username: String,
}

impl Authenticated {
    /// Authenticated username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<HttpState>>() {
            Some(state) => authenticate(req, &state.credentials).map(|username| Self { username }),
            None => Err(Error::internal("HTTP state is not configured")),
        };
        ready(result)
    }
}
