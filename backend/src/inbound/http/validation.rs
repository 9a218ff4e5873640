//! Request validators for the estimation endpoints.
//!
//! Each validator either yields a domain value or a `ValidationError` whose
//! `field` names the offending input.

use serde_json::Value;

use crate::domain::{
    ALLOWED_IMAGE_TYPES, DISH_NAME_MAX_LENGTH, DishName, DishNameError, Error, MAX_UPLOAD_BYTES,
    UploadedImage,
};

/// Field holding the dish name in `POST /estimate` bodies.
pub const DISH_FIELD: &str = "dish";
/// Multipart field holding the image in `POST /upload` requests.
pub const IMAGE_FIELD: &str = "image";

/// JSON type name of `value`, as reported in `received`.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Extract and validate the dish name from a decoded body.
///
/// # Errors
/// A `ValidationError` on `dish` when the field is missing, not a string,
/// blank, or longer than [`DISH_NAME_MAX_LENGTH`] characters.
///
/// # Examples
/// ```
/// use carbon_api::inbound::http::validation::validate_dish;
/// use serde_json::json;
///
/// let dish = validate_dish(&json!({ "dish": " Chicken Biryani " })).expect("valid");
/// assert_eq!(dish.as_str(), "Chicken Biryani");
/// assert!(validate_dish(&json!({})).is_err());
/// ```
pub fn validate_dish(body: &Value) -> Result<DishName, Error> {
    let raw = body
        .get(DISH_FIELD)
        .ok_or_else(|| Error::validation(DISH_FIELD, "Dish name is required"))?;
    let Value::String(raw) = raw else {
        return Err(Error::validation(DISH_FIELD, "Dish name must be a string")
            .with_detail("received", json_type_name(raw)));
    };
    DishName::parse(raw).map_err(|err| match err {
        DishNameError::Empty => Error::validation(DISH_FIELD, err.to_string()),
        DishNameError::TooLong { length } => Error::validation(DISH_FIELD, err.to_string())
            .with_detail("maxLength", DISH_NAME_MAX_LENGTH)
            .with_detail("length", length),
    })
}

/// Format a byte count as megabytes with two decimals, e.g. `5.00MB`.
#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "display-only rounding of an upload size"
)]
fn megabytes(bytes: usize) -> String {
    let megabytes = bytes as f64 / 1_048_576.0;
    format!("{megabytes:.2}MB")
}

/// Error for an upload over [`MAX_UPLOAD_BYTES`].
#[must_use]
pub fn file_too_large(actual_bytes: usize) -> Error {
    Error::validation(IMAGE_FIELD, "File size too large. Maximum size is 5MB")
        .with_detail("maxSize", "5MB")
        .with_detail("actualSize", megabytes(actual_bytes))
}

/// Check the uploaded image is present, of an allowed type and small enough.
///
/// # Errors
/// A `ValidationError` on `image` describing the first failed check.
pub fn validate_upload(image: Option<UploadedImage>) -> Result<UploadedImage, Error> {
    let image = image.ok_or_else(|| Error::validation(IMAGE_FIELD, "Image file is required"))?;
    if !ALLOWED_IMAGE_TYPES.contains(&image.content_type()) {
        return Err(Error::validation(
            IMAGE_FIELD,
            "Invalid file type. Only JPEG, JPG, and PNG are allowed",
        )
        .with_detail("allowedTypes", ALLOWED_IMAGE_TYPES.to_vec()));
    }
    if image.size() > MAX_UPLOAD_BYTES {
        return Err(file_too_large(image.size()));
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;
    use serde_json::json;

    fn image(content_type: &str, size: usize) -> UploadedImage {
        UploadedImage::new(vec![0; size], content_type, Some("meal".to_owned()))
    }

    #[rstest]
    fn missing_dish_is_required() {
        let err = validate_dish(&json!({ "other": "x" })).expect_err("missing");
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.message(), "Dish name is required");
        assert_eq!(err.field(), Some("dish"));
    }

    #[rstest]
    #[case(json!({ "dish": 123 }), "number")]
    #[case(json!({ "dish": null }), "null")]
    #[case(json!({ "dish": true }), "boolean")]
    #[case(json!({ "dish": ["a"] }), "array")]
    #[case(json!({ "dish": { "name": "x" } }), "object")]
    fn non_string_dish_reports_received_type(#[case] body: Value, #[case] received: &str) {
        let err = validate_dish(&body).expect_err("wrong type");
        assert_eq!(err.message(), "Dish name must be a string");
        assert_eq!(err.details().get("received"), Some(&json!(received)));
    }

    #[rstest]
    fn blank_dish_is_rejected() {
        let err = validate_dish(&json!({ "dish": "   " })).expect_err("blank");
        assert_eq!(err.message(), "Dish name cannot be empty or whitespace");
        assert_eq!(err.field(), Some("dish"));
    }

    #[rstest]
    fn long_dish_reports_lengths() {
        let err = validate_dish(&json!({ "dish": "x".repeat(150) })).expect_err("too long");
        assert_eq!(err.message(), "Dish name must be 100 characters or less");
        assert_eq!(err.details().get("maxLength"), Some(&json!(100)));
        assert_eq!(err.details().get("length"), Some(&json!(150)));
    }

    #[rstest]
    fn non_object_bodies_lack_the_field() {
        let err = validate_dish(&json!(["dish"])).expect_err("array body");
        assert_eq!(err.message(), "Dish name is required");
    }

    #[rstest]
    fn missing_image_is_required() {
        let err = validate_upload(None).expect_err("missing");
        assert_eq!(err.message(), "Image file is required");
        assert_eq!(err.field(), Some("image"));
    }

    #[rstest]
    #[case("image/gif")]
    #[case("image/webp")]
    fn unsupported_image_types_are_rejected(#[case] content_type: &str) {
        let err = validate_upload(Some(image(content_type, 10))).expect_err("bad type");
        assert_eq!(
            err.message(),
            "Invalid file type. Only JPEG, JPG, and PNG are allowed"
        );
        assert_eq!(
            err.details().get("allowedTypes"),
            Some(&json!(["image/jpeg", "image/png", "image/jpg"]))
        );
    }

    #[rstest]
    fn oversized_images_report_sizes() {
        let err =
            validate_upload(Some(image("image/png", MAX_UPLOAD_BYTES + 1))).expect_err("too big");
        assert_eq!(err.message(), "File size too large. Maximum size is 5MB");
        assert_eq!(err.details().get("maxSize"), Some(&json!("5MB")));
        assert_eq!(err.details().get("actualSize"), Some(&json!("5.00MB")));
    }

    #[rstest]
    #[case("image/jpeg")]
    #[case("image/jpg")]
    #[case("image/png")]
    fn allowed_images_pass(#[case] content_type: &str) {
        let accepted = validate_upload(Some(image(content_type, MAX_UPLOAD_BYTES))).expect("valid");
        assert_eq!(accepted.content_type(), content_type);
    }

    #[rstest]
    #[case(0, "0.00MB")]
    #[case(1_572_864, "1.50MB")]
    #[case(7_340_032, "7.00MB")]
    fn megabytes_use_two_decimals(#[case] bytes: usize, #[case] expected: &str) {
        assert_eq!(megabytes(bytes), expected);
    }
}
