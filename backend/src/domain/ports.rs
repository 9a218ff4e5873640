//! Driving ports consumed by the HTTP adapter.

use async_trait::async_trait;

use super::{DishName, Error, Estimate, IMAGE_FALLBACK_DISH, UploadedImage, estimate_dish};

/// Produces carbon estimates for dishes and food photos.
///
/// The HTTP layer owns an `Arc<dyn CarbonEstimator>`, so a model-backed
/// implementation can replace the rule table without touching handlers.
#[async_trait]
pub trait CarbonEstimator: Send + Sync {
    /// Estimate a validated dish name.
    async fn estimate_dish(&self, dish: &DishName) -> Result<Estimate, Error>;

    /// Estimate the dish shown in an uploaded image.
    async fn estimate_image(&self, image: &UploadedImage) -> Result<Estimate, Error>;
}

/// Estimator backed by the static rule table.
///
/// Images are not inspected: every upload is reported as
/// [`IMAGE_FALLBACK_DISH`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleTableEstimator;

#[async_trait]
impl CarbonEstimator for RuleTableEstimator {
    async fn estimate_dish(&self, dish: &DishName) -> Result<Estimate, Error> {
        Ok(estimate_dish(dish.as_str()))
    }

    async fn estimate_image(&self, _image: &UploadedImage) -> Result<Estimate, Error> {
        Ok(estimate_dish(IMAGE_FALLBACK_DISH))
    }
}
