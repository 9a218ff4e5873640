//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{CarbonEstimator, RuleTableEstimator};
use crate::settings::Environment;

use super::auth::BasicCredentials;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Estimation port.
    pub estimator: Arc<dyn CarbonEstimator>,
    /// Accepted Basic credentials.
    pub credentials: BasicCredentials,
    /// Deployment mode.
    pub environment: Environment,
    /// Time source for timestamps and uptime.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// When the process started serving.
    pub started_at: DateTime<Utc>,
}

impl HttpState {
    /// Build state around the rule-table estimator and the system clock.
    #[must_use]
    pub fn new(credentials: BasicCredentials, environment: Environment) -> Self {
        Self::with_clock(credentials, environment, Arc::new(DefaultClock))
    }

    /// Build state with an explicit clock; `started_at` is read from it.
    #[must_use]
    pub fn with_clock(
        credentials: BasicCredentials,
        environment: Environment,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            estimator: Arc::new(RuleTableEstimator),
            credentials,
            environment,
            started_at: clock.utc(),
            clock,
        }
    }

    /// Swap the estimation port.
    #[must_use]
    pub fn with_estimator(mut self, estimator: Arc<dyn CarbonEstimator>) -> Self {
        self.estimator = estimator;
        self
    }
}

impl std::fmt::Debug for HttpState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpState")
            .field("environment", &self.environment)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}
