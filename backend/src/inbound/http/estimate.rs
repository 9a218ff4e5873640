//! Estimation endpoints.
//!
//! ```text
//! POST /estimate {"dish":"Chicken Biryani"}
//! POST /upload   multipart/form-data; image=<file>
//! ```
//!
//! Both require Basic authentication, which is checked before the body is
//! read.

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, post, web};
use tracing::info;

use crate::domain::Error;

use super::ApiResult;
use super::auth::Authenticated;
use super::body::read_body;
use super::multipart::read_image;
use super::schemas::{
    CarbonEstimateSchema, ErrorResponseSchema, EstimateRequestSchema, ImageUploadSchema,
};
use super::state::HttpState;
use super::validation::{validate_dish, validate_upload};

const DISH_ESTIMATION_FAILED: &str = "Could not estimate carbon footprint for the given dish";
const IMAGE_ESTIMATION_FAILED: &str = "Could not estimate carbon footprint from the provided image";
const IMAGE_SUGGESTION: &str = "Please try with a clearer image of the food item";

/// Estimate the carbon footprint of a named dish.
#[utoipa::path(
    post,
    path = "/estimate",
    request_body(
        content = EstimateRequestSchema,
        description = "Dish to estimate",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Carbon footprint estimate", body = CarbonEstimateSchema),
        (status = 400, description = "Invalid dish name", body = ErrorResponseSchema),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponseSchema),
        (status = 404, description = "Nothing could be estimated", body = ErrorResponseSchema),
        (status = 413, description = "Request body too large", body = ErrorResponseSchema),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponseSchema),
        (status = 500, description = "Internal server error", body = ErrorResponseSchema)
    ),
    tags = ["estimation"],
    operation_id = "estimateDish",
    security(("basicAuth" = []))
)]
#[post("/estimate")]
pub async fn estimate(
    user: Authenticated,
    req: HttpRequest,
    state: web::Data<HttpState>,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let body = read_body(&req, payload).await?;
    let dish = validate_dish(&body)?;
    let result = state.estimator.estimate_dish(&dish).await?;
    if result.ingredients().is_empty() {
        return Err(Error::estimation(DISH_ESTIMATION_FAILED).with_detail("dish", dish.as_str()));
    }
    info!(
        user = user.username(),
        dish = result.dish(),
        total_centikilograms = result.estimated_carbon_kg().centikilograms(),
        "dish estimated"
    );
    Ok(HttpResponse::Ok().json(result))
}

/// Estimate the carbon footprint of the dish in an uploaded photo.
#[utoipa::path(
    post,
    path = "/upload",
    request_body(
        content = ImageUploadSchema,
        description = "Food image, JPEG or PNG up to 5MB",
        content_type = "multipart/form-data"
    ),
    responses(
        (status = 200, description = "Carbon footprint estimate", body = CarbonEstimateSchema),
        (status = 400, description = "Missing, invalid or oversized image", body = ErrorResponseSchema),
        (status = 401, description = "Missing or invalid credentials", body = ErrorResponseSchema),
        (status = 404, description = "Nothing could be estimated", body = ErrorResponseSchema),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponseSchema),
        (status = 500, description = "Internal server error", body = ErrorResponseSchema)
    ),
    tags = ["estimation"],
    operation_id = "estimateImage",
    security(("basicAuth" = []))
)]
#[post("/upload")]
pub async fn upload(
    user: Authenticated,
    req: HttpRequest,
    state: web::Data<HttpState>,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let image = validate_upload(read_image(&req, payload).await?)?;
    let result = state.estimator.estimate_image(&image).await?;
    if result.ingredients().is_empty() {
        return Err(Error::estimation(IMAGE_ESTIMATION_FAILED)
            .with_detail("suggestion", IMAGE_SUGGESTION));
    }
    info!(
        user = user.username(),
        bytes = image.size(),
        content_type = image.content_type(),
        dish = result.dish(),
        "image estimated"
    );
    Ok(HttpResponse::Ok().json(result))
}
