//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their wire shape and live in the inbound adapter
//! layer where framework concerns belong.

use utoipa::ToSchema;

/// A single ingredient and its carbon contribution.
#[derive(ToSchema)]
#[schema(as = Ingredient)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct IngredientSchema {
    /// Ingredient name.
    #[schema(example = "Rice")]
    name: String,
    /// Carbon footprint in kg CO2e.
    #[schema(example = 1.1)]
    carbon_kg: f64,
}

/// Carbon estimate for a dish.
#[derive(ToSchema)]
#[schema(as = CarbonEstimate)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CarbonEstimateSchema {
    /// Name of the dish.
    #[schema(example = "Chicken Biryani")]
    dish: String,
    /// Total estimated carbon footprint in kg CO2e.
    #[schema(example = 4.2)]
    estimated_carbon_kg: f64,
    /// Ingredients contributing to the total.
    ingredients: Vec<IngredientSchema>,
}

/// Request body for `POST /estimate`.
#[derive(ToSchema)]
#[schema(as = EstimateRequest)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct EstimateRequestSchema {
    /// Name of the dish to estimate.
    #[schema(example = "Chicken Biryani", max_length = 100)]
    dish: String,
}

/// Multipart body for `POST /upload`.
#[derive(ToSchema)]
#[schema(as = ImageUpload)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ImageUploadSchema {
    /// JPEG or PNG image of the food item, at most 5MB.
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

/// Error response payload.
///
/// Context keys such as `field`, `maxLength` or `allowedTypes` appear at the
/// top level next to `error` and `message`.
#[derive(ToSchema)]
#[schema(as = ErrorResponse)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorResponseSchema {
    /// Stable error kind.
    #[schema(example = "ValidationError")]
    error: String,
    /// Human-readable message.
    #[schema(example = "Dish name is required")]
    message: String,
    /// Offending request field, for validation errors.
    #[schema(example = "dish", required = false)]
    field: String,
    /// Error and cause chain, outside production only.
    #[schema(required = false)]
    stack: String,
}

/// Body of `GET /health`.
#[derive(ToSchema)]
#[schema(as = Health)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct HealthSchema {
    /// Always `ok`.
    #[schema(example = "ok")]
    status: String,
    /// RFC 3339 UTC timestamp.
    #[schema(example = "2024-01-01T00:00:00.000Z")]
    timestamp: String,
    /// Seconds since the server started.
    #[schema(example = 12.5)]
    uptime: f64,
    /// Deployment mode.
    #[schema(example = "development")]
    environment: String,
}

/// Body of `GET /api/version`.
#[derive(ToSchema)]
#[schema(as = VersionInfo)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct VersionSchema {
    /// API version.
    #[schema(example = "1.0.0")]
    version: String,
    /// Always `active`.
    #[schema(example = "active")]
    status: String,
    /// RFC 3339 UTC timestamp.
    #[schema(example = "2024-01-01T00:00:00.000Z")]
    timestamp: String,
}
