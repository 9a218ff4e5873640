//! Domain primitives for carbon estimation.
//!
//! Purpose: hold the estimate model, the validated inputs the estimator
//! accepts, and the transport-agnostic error taxonomy. Nothing here knows
//! about HTTP.
//!
//! Public surface:
//! - Error / ErrorCode: error payload and its stable kind.
//! - DishName: trimmed, tag-stripped dish name.
//! - Estimate / Ingredient / CarbonMass: the estimate returned to clients.
//! - UploadedImage: image bytes plus declared MIME type.
//! - CarbonEstimator: port implemented by [`RuleTableEstimator`].

pub mod dish;
pub mod error;
pub mod estimate;
pub mod ports;
pub mod upload;

pub use self::dish::{DISH_NAME_MAX_LENGTH, DishName, DishNameError};
pub use self::error::{DEFAULT_INTERNAL_MESSAGE, Error, ErrorCode, TRACE_ID_HEADER};
pub use self::estimate::{
    CarbonMass, DishMatcher, ESTIMATION_RULES, Estimate, EstimationRule, IMAGE_FALLBACK_DISH,
    Ingredient, estimate_dish, estimate_with_rules,
};
pub use self::ports::{CarbonEstimator, RuleTableEstimator};
pub use self::upload::{ALLOWED_IMAGE_TYPES, MAX_UPLOAD_BYTES, UploadedImage};

