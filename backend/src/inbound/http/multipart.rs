//! Streaming reader for the single-image multipart contract.
//!
//! Only the `image` field is buffered. Plain text fields are drained and
//! dropped; a file under any other name rejects the upload.
//! Buffering stops as soon as the image passes [`MAX_UPLOAD_BYTES`], so an
//! oversized upload is never held in memory.

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{HttpMessage, HttpRequest};
use futures_util::StreamExt;
use tracing::debug;

use crate::domain::{Error, MAX_UPLOAD_BYTES, UploadedImage};

use super::validation::{IMAGE_FIELD, file_too_large};

const MULTIPART_FORM_DATA: &str = "multipart/form-data";
const UNEXPECTED_FILE: &str = "Unexpected file field";

fn malformed(err: &MultipartError) -> Error {
    debug!(error = %err, "rejected malformed multipart body");
    Error::bad_request("Malformed multipart body")
        .with_source(std::io::Error::other(err.to_string()))
}

async fn drain(field: &mut Field) -> Result<(), Error> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|err| malformed(&err))?;
    }
    Ok(())
}

async fn buffer(field: &mut Field, limit: usize) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|err| malformed(&err))?;
        let size = bytes.len().saturating_add(chunk.len());
        if size > limit {
            return Err(file_too_large(size));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Read the `image` field of a multipart request.
///
/// Requests that are not `multipart/form-data` carry no image and yield
/// `Ok(None)`.
///
/// # Errors
/// - `ValidationError` on `image` for a second image, a non-image MIME type
///   or an image over [`MAX_UPLOAD_BYTES`].
/// - `ValidationError` on the offending field for a file under any name
///   other than `image`.
/// - `BadRequest` when the multipart framing is broken.
pub async fn read_image(
    req: &HttpRequest,
    mut payload: Multipart,
) -> Result<Option<UploadedImage>, Error> {
    if req.content_type() != MULTIPART_FORM_DATA {
        return Ok(None);
    }
    let mut image = None;
    while let Some(field) = payload.next().await {
        let mut field = field.map_err(|err| malformed(&err))?;
        let file_name = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .map(str::to_owned);
        if field.name() != Some(IMAGE_FIELD) {
            if file_name.is_some() {
                let name = field.name().unwrap_or_default();
                return Err(Error::validation(name, UNEXPECTED_FILE));
            }
            drain(&mut field).await?;
            continue;
        }
        if image.is_some() {
            return Err(Error::validation(
                IMAGE_FIELD,
                "Only one image file may be uploaded",
            ));
        }
        let content_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_owned())
            .unwrap_or_default();
        if !content_type.starts_with("image/") {
            return Err(Error::validation(IMAGE_FIELD, "Only image files are allowed"));
        }
        let bytes = buffer(&mut field, MAX_UPLOAD_BYTES).await?;
        image = Some(UploadedImage::new(bytes, content_type, file_name));
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::test_support::{MULTIPART_BOUNDARY, MultipartPart, multipart_body};
    use actix_web::FromRequest;
    use actix_web::test::TestRequest;
    use rstest::rstest;
    use serde_json::json;

    async fn read(parts: &[MultipartPart<'_>]) -> Result<Option<UploadedImage>, Error> {
        let (req, mut payload) = TestRequest::post()
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            ))
            .set_payload(multipart_body(parts))
            .to_http_parts();
        let multipart = Multipart::from_request(&req, &mut payload)
            .await
            .expect("multipart extractor");
        read_image(&req, multipart).await
    }

    #[rstest]
    #[actix_web::test]
    async fn reads_the_image_field() {
        let image = read(&[
            MultipartPart::text("note", "lunch"),
            MultipartPart::file(IMAGE_FIELD, "meal.png", "image/png", b"\x89PNG"),
        ])
        .await
        .expect("reads")
        .expect("image present");
        assert_eq!(image.content_type(), "image/png");
        assert_eq!(image.file_name(), Some("meal.png"));
        assert_eq!(image.bytes(), b"\x89PNG");
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_image_field_yields_none() {
        let image = read(&[MultipartPart::text("note", "lunch")])
            .await
            .expect("reads");
        assert!(image.is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn non_image_types_are_rejected_while_streaming() {
        let err = read(&[MultipartPart::file(
            IMAGE_FIELD,
            "notes.txt",
            "text/plain",
            b"hello",
        )])
        .await
        .expect_err("not an image");
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.message(), "Only image files are allowed");
    }

    #[rstest]
    #[actix_web::test]
    async fn a_second_image_is_rejected() {
        let err = read(&[
            MultipartPart::file(IMAGE_FIELD, "a.png", "image/png", b"a"),
            MultipartPart::file(IMAGE_FIELD, "b.png", "image/png", b"b"),
        ])
        .await
        .expect_err("two images");
        assert_eq!(err.message(), "Only one image file may be uploaded");
    }

    #[rstest]
    #[actix_web::test]
    async fn files_under_other_names_are_rejected() {
        let err = read(&[
            MultipartPart::file(IMAGE_FIELD, "a.png", "image/png", b"a"),
            MultipartPart::file("other", "b.exe", "application/octet-stream", b"MZ"),
        ])
        .await
        .expect_err("stray file");
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.field(), Some("other"));
        assert_eq!(err.message(), "Unexpected file field");
    }

    #[rstest]
    #[actix_web::test]
    async fn oversized_images_stop_buffering() {
        let big = vec![0_u8; MAX_UPLOAD_BYTES + 1];
        let err = read(&[MultipartPart::file(IMAGE_FIELD, "big.jpg", "image/jpeg", &big)])
            .await
            .expect_err("too large");
        assert_eq!(err.field(), Some(IMAGE_FIELD));
        assert_eq!(err.details().get("maxSize"), Some(&json!("5MB")));
    }

    #[rstest]
    #[actix_web::test]
    async fn non_multipart_requests_carry_no_image() {
        let (req, mut payload) = TestRequest::post()
            .insert_header(("content-type", "application/json"))
            .set_payload("{}")
            .to_http_parts();
        let multipart = Multipart::from_request(&req, &mut payload)
            .await
            .expect("multipart extractor");
        let image = read_image(&req, multipart).await.expect("reads");
        assert!(image.is_none());
    }
}
