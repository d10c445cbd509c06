use crate::domain::errors::PricingResult;
use crate::domain::ml::feature_registry::FeatureVector;

/// Interface for demand models consumed by the price optimizer.
pub trait DemandPredictor: Send + Sync {
    /// Predicted units sold per feature vector, same length and order as the input, each >= 0.
    fn predict(&self, features: &[FeatureVector]) -> PricingResult<Vec<f64>>;

    /// Lowest and highest price seen in training, if known.
    fn training_price_range(&self) -> Option<(f64, f64)> {
        None
    }

    /// Get model name/type
    fn name(&self) -> &str;

    /// Get model version/id
    fn version(&self) -> &str;
}
