//! Long-lived pricing entry point for a hosting process.
//!
//! The service owns the current model handle. Requests take a snapshot of the handle,
//! so a swap after retraining never disturbs a request already in flight.

use super::optimizer::PriceOptimizer;
use crate::application::ml::demand_model::DemandModel;
use crate::domain::errors::{PricingError, PricingResult};
use crate::domain::ports::DemandPredictor;
use crate::domain::pricing::{OptimizationRequest, PriceRange, PriceRecommendation};
use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{info, warn};

pub struct PricingService {
    model: RwLock<Arc<dyn DemandPredictor>>,
    defaults: PriceRange,
    timeout: Duration,
}

impl PricingService {
    pub fn new(model: Arc<dyn DemandPredictor>, defaults: PriceRange, timeout: Duration) -> Self {
        Self {
            model: RwLock::new(model),
            defaults,
            timeout,
        }
    }

    /// Loads the artifact at `path`; startup fails if it is missing or malformed.
    pub fn load(path: &Path, defaults: PriceRange, timeout: Duration) -> PricingResult<Self> {
        let model = DemandModel::load(path)?;
        Ok(Self::new(Arc::new(model), defaults, timeout))
    }

    pub fn defaults(&self) -> &PriceRange {
        &self.defaults
    }

    /// Snapshot of the current model handle.
    pub fn current_model(&self) -> Arc<dyn DemandPredictor> {
        let guard = self.model.read().unwrap_or_else(|e| e.into_inner());
        guard.clone()
    }

    /// Replaces the model handle and returns the previous one.
    pub fn swap_model(&self, model: Arc<dyn DemandPredictor>) -> Arc<dyn DemandPredictor> {
        let mut guard = self.model.write().unwrap_or_else(|e| e.into_inner());
        info!(
            "Swapping demand model {} -> {}",
            guard.version(),
            model.version()
        );
        std::mem::replace(&mut *guard, model)
    }

    /// Loads a new artifact and swaps it in. On failure the current model stays in place.
    pub fn reload(&self, path: &Path) -> PricingResult<()> {
        match DemandModel::load(path) {
            Ok(model) => {
                self.swap_model(Arc::new(model));
                Ok(())
            }
            Err(e) => {
                warn!("Model reload from {:?} failed, keeping current model: {}", path, e);
                Err(e)
            }
        }
    }

    pub fn recommend(&self, request: &OptimizationRequest) -> PricingResult<PriceRecommendation> {
        PriceOptimizer::new(self.current_model()).optimize_request(request, &self.defaults)
    }

    /// Runs the sweep on the blocking pool, bounded by the configured timeout.
    pub async fn recommend_with_timeout(
        &self,
        request: OptimizationRequest,
    ) -> PricingResult<PriceRecommendation> {
        let optimizer = PriceOptimizer::new(self.current_model());
        let defaults = self.defaults;
        let task =
            tokio::task::spawn_blocking(move || optimizer.optimize_request(&request, &defaults));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(PricingError::Inference {
                reason: join_err.to_string(),
            }),
            Err(_) => Err(PricingError::Timeout {
                duration_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}
