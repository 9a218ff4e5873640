//! Bounded request-body reading for the JSON and form encodings.
//!
//! Bodies are buffered up to [`MAX_BODY_BYTES`] and decoded according to the
//! request's content type. An unsupported or missing content type decodes to
//! an empty object, so validation reports the missing field rather than the
//! encoding.

use actix_web::{HttpMessage, HttpRequest, web};
use futures_util::StreamExt;
use serde_json::{Map, Value};

use crate::domain::Error;

/// Largest accepted JSON or form body (10 KiB).
pub const MAX_BODY_BYTES: usize = 10 * 1024;

/// Decoded request body, stored in the request extensions so failures can be
/// logged with it.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody(pub Value);

/// Buffer `payload`, failing once more than `limit` bytes arrive.
///
/// # Errors
/// `PayloadTooLarge` past the limit, `BadRequest` when the stream breaks.
pub async fn read_limited(mut payload: web::Payload, limit: usize) -> Result<Vec<u8>, Error> {
    let mut body = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk
            .map_err(|err| Error::bad_request("Failed to read request body").with_source(err))?;
        if body.len().saturating_add(chunk.len()) > limit {
            return Err(
                Error::payload_too_large("request entity too large").with_detail("limit", limit)
            );
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Decode `bytes` using the request's declared content type.
///
/// # Errors
/// Returns `BadRequest` when a JSON body does not parse.
///
/// # Examples
/// ```
/// use actix_web::test::TestRequest;
/// use carbon_api::inbound::http::body::decode_body;
/// use serde_json::json;
///
/// let req = TestRequest::default()
///     .insert_header(("content-type", "application/x-www-form-urlencoded"))
///     .to_http_request();
/// let value = decode_body(&req, b"dish=Chicken+Biryani").expect("decodes");
/// assert_eq!(value, json!({ "dish": "Chicken Biryani" }));
/// ```
pub fn decode_body(req: &HttpRequest, bytes: &[u8]) -> Result<Value, Error> {
    if bytes.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    let content_type = req.content_type();
    if content_type == "application/json" || content_type.ends_with("+json") {
        serde_json::from_slice(bytes)
            .map_err(|err| Error::bad_request("Malformed JSON in request body").with_source(err))
    } else if content_type == "application/x-www-form-urlencoded" {
        Ok(decode_form(bytes))
    } else {
        Ok(Value::Object(Map::new()))
    }
}

/// Repeated keys collect into an array, so `dish=a&dish=b` is not a string.
fn decode_form(bytes: &[u8]) -> Value {
    let mut fields = Map::new();
    for (key, value) in url::form_urlencoded::parse(bytes) {
        let value = Value::String(value.into_owned());
        match fields.get_mut(key.as_ref()) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                fields.insert(key.into_owned(), value);
            }
        }
    }
    Value::Object(fields)
}

/// Read, decode and record the body of `req`.
///
/// # Errors
/// See [`read_limited`] and [`decode_body`].
pub async fn read_body(req: &HttpRequest, payload: web::Payload) -> Result<Value, Error> {
    let bytes = read_limited(payload, MAX_BODY_BYTES).await?;
    let value = decode_body(req, &bytes)?;
    req.extensions_mut().insert(RequestBody(value.clone()));
    Ok(value)
}
