use super::evaluation::RegressionMetrics;
use super::gradient_boosting::{BoostingParams, FitReport, GradientBoostingRegressor};
use crate::domain::errors::{PricingError, PricingResult};
use crate::domain::ml::feature_registry::{self, FeatureSchema, FeatureVector};
use crate::domain::ports::DemandPredictor;
use crate::infrastructure::persistence;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Bumped whenever the artifact layout changes incompatibly.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

const MODEL_NAME: &str = "Gradient Boosted Demand Trees";

/// Training provenance stored with the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_id: String,
    pub trained_at: DateTime<Utc>,
    pub training_samples: usize,
    pub holdout_samples: usize,
    pub price_min: f64,
    pub price_max: f64,
    pub params: BoostingParams,
    pub fit: FitReport,
    pub holdout_metrics: Option<RegressionMetrics>,
}

/// Trained demand model and its self-describing artifact representation.
///
/// Immutable once built; share it behind an `Arc` and replace the handle on retrain.
#[derive(Debug, Serialize, Deserialize)]
pub struct DemandModel {
    format_version: u32,
    schema: FeatureSchema,
    metadata: ModelMetadata,
    booster: GradientBoostingRegressor,
}

impl DemandModel {
    pub fn new(booster: GradientBoostingRegressor, metadata: ModelMetadata) -> PricingResult<Self> {
        let schema = FeatureSchema::current();
        if booster.n_features() != schema.width() {
            return Err(PricingError::Schema {
                expected: schema.to_string(),
                found: format!("booster with {} columns", booster.n_features()),
            });
        }
        Ok(Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            schema,
            metadata,
            booster,
        })
    }

    /// Loads an artifact written by `save`.
    ///
    /// Fails with `ModelNotFound` when nothing exists at `path`, and with `Schema` when the
    /// artifact was trained against a different feature layout.
    pub fn load(path: &Path) -> PricingResult<Self> {
        if !path.exists() {
            return Err(PricingError::ModelNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| PricingError::Artifact {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let model: DemandModel =
            serde_json::from_str(&content).map_err(|e| PricingError::Artifact {
                path: path.to_path_buf(),
                reason: format!("failed to parse model JSON: {}", e),
            })?;

        if model.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(PricingError::Artifact {
                path: path.to_path_buf(),
                reason: format!(
                    "unsupported format version {} (expected {})",
                    model.format_version, ARTIFACT_FORMAT_VERSION
                ),
            });
        }
        model.schema.ensure_current()?;
        if model.booster.n_features() != model.schema.width() {
            return Err(PricingError::Schema {
                expected: model.schema.to_string(),
                found: format!("booster with {} columns", model.booster.n_features()),
            });
        }

        info!(
            "Loaded demand model {} from {:?} ({} trees, trained {})",
            model.metadata.model_id,
            path,
            model.booster.n_trees(),
            model.metadata.trained_at.format("%Y-%m-%d %H:%M:%S")
        );
        Ok(model)
    }

    pub fn save(&self, path: &Path) -> PricingResult<()> {
        let json = serde_json::to_string(self).map_err(|e| PricingError::Artifact {
            path: path.to_path_buf(),
            reason: format!("failed to serialize model: {}", e),
        })?;
        persistence::write_atomic(path, json.as_bytes())?;
        info!(
            "Saved demand model {} to {:?}",
            self.metadata.model_id, path
        );
        Ok(())
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn n_trees(&self) -> usize {
        self.booster.n_trees()
    }
}

impl DemandPredictor for DemandModel {
    fn predict(&self, features: &[FeatureVector]) -> PricingResult<Vec<f64>> {
        let rows = feature_registry::to_rows(features);
        let raw = self.booster.predict(&rows)?;
        // Trees can undershoot near zero demand
        Ok(raw.into_iter().map(|units| units.max(0.0)).collect())
    }

    fn training_price_range(&self) -> Option<(f64, f64)> {
        Some((self.metadata.price_min, self.metadata.price_max))
    }

    fn name(&self) -> &str {
        MODEL_NAME
    }

    fn version(&self) -> &str {
        &self.metadata.model_id
    }
}
