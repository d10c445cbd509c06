use crate::domain::errors::{PricingError, PricingResult};
use crate::domain::ml::feature_registry;
use crate::domain::ports::DemandPredictor;
use crate::domain::pricing::{OptimizationRequest, PricePoint, PriceRange, PriceRecommendation};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};

/// Relative tolerance under which two revenues count as tied.
pub const REVENUE_TIE_TOLERANCE: f64 = 1e-9;

/// Picks the revenue-maximizing point. Among points tied within tolerance the lowest price wins.
///
/// `curve` must be ascending by price.
pub fn select_optimal(curve: &[PricePoint]) -> Option<&PricePoint> {
    let max_revenue = curve
        .iter()
        .map(|p| p.predicted_revenue)
        .fold(f64::NEG_INFINITY, f64::max);
    if !max_revenue.is_finite() {
        return curve.first();
    }
    let tolerance = REVENUE_TIE_TOLERANCE * max_revenue.abs().max(1.0);
    curve
        .iter()
        .find(|p| p.predicted_revenue >= max_revenue - tolerance)
}

/// Grid-search price optimizer over an injected demand model.
///
/// Holds no mutable state; every call is a pure function of (date, model, range).
#[derive(Clone)]
pub struct PriceOptimizer {
    model: Arc<dyn DemandPredictor>,
}

impl PriceOptimizer {
    pub fn new(model: Arc<dyn DemandPredictor>) -> Self {
        Self { model }
    }

    pub fn optimize(&self, date: NaiveDate, range: &PriceRange) -> PricingResult<PriceRecommendation> {
        let prices = range.candidates()?;
        let features = feature_registry::build_many(date, &prices)?;

        // One batched call so every candidate sees the same model instance
        let units = self.model.predict(&features)?;
        if units.len() != prices.len() {
            return Err(PricingError::Schema {
                expected: format!("{} predictions", prices.len()),
                found: format!("{} predictions from {}", units.len(), self.model.name()),
            });
        }

        let curve: Vec<PricePoint> = prices
            .iter()
            .zip(units)
            .map(|(&price, u)| PricePoint::new(price, u.max(0.0)))
            .collect();

        let training_range = self.model.training_price_range();
        let within_training_range = match training_range {
            Some((lo, hi)) if range.low < lo || range.high > hi => {
                warn!(
                    "Sweep {:.2}..{:.2} extends beyond training prices {:.2}..{:.2}; predictions there are extrapolated",
                    range.low, range.high, lo, hi
                );
                false
            }
            _ => true,
        };

        let best = *select_optimal(&curve).ok_or_else(|| PricingError::InvalidRange {
            reason: "sweep produced no candidates".to_string(),
        })?;
        let optimal_extrapolated =
            training_range.is_some_and(|(lo, hi)| best.price < lo || best.price > hi);
        if optimal_extrapolated {
            warn!(
                "Optimal price {:.2} for {} lies outside the training prices",
                best.price, date
            );
        }
        debug!(
            "Optimal price for {}: {:.2} (revenue {:.2}, units {:.2})",
            date, best.price, best.predicted_revenue, best.predicted_units
        );

        Ok(PriceRecommendation {
            date,
            optimal_price: best.price,
            max_revenue: best.predicted_revenue,
            curve,
            within_training_range,
            optimal_extrapolated,
        })
    }

    pub fn optimize_request(
        &self,
        request: &OptimizationRequest,
        defaults: &PriceRange,
    ) -> PricingResult<PriceRecommendation> {
        self.optimize(request.date, &request.resolve(defaults))
    }
}
