use crate::domain::errors::{PricingError, PricingResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRICE_LOW: f64 = 50.0;
pub const DEFAULT_PRICE_HIGH: f64 = 200.0;
pub const DEFAULT_NUM_POINTS: usize = 151;
/// Upper bound on sweep size; larger grids are rejected before allocation.
pub const MAX_NUM_POINTS: usize = 100_000;

/// Discretized price sweep over `[low, high]`, both endpoints included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
    pub num_points: usize,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            low: DEFAULT_PRICE_LOW,
            high: DEFAULT_PRICE_HIGH,
            num_points: DEFAULT_NUM_POINTS,
        }
    }
}

impl PriceRange {
    pub fn new(low: f64, high: f64, num_points: usize) -> Self {
        Self {
            low,
            high,
            num_points,
        }
    }

    pub fn validate(&self) -> PricingResult<()> {
        if !self.low.is_finite() || !self.high.is_finite() {
            return Err(PricingError::InvalidRange {
                reason: format!("bounds must be finite (low={}, high={})", self.low, self.high),
            });
        }
        if self.low <= 0.0 {
            return Err(PricingError::InvalidRange {
                reason: format!("price_low must be positive, got {}", self.low),
            });
        }
        if self.low >= self.high {
            return Err(PricingError::InvalidRange {
                reason: format!(
                    "price_low ({}) must be below price_high ({})",
                    self.low, self.high
                ),
            });
        }
        if self.num_points < 2 {
            return Err(PricingError::InvalidRange {
                reason: format!("num_points must be at least 2, got {}", self.num_points),
            });
        }
        if self.num_points > MAX_NUM_POINTS {
            return Err(PricingError::InvalidRange {
                reason: format!(
                    "num_points must be at most {}, got {}",
                    MAX_NUM_POINTS, self.num_points
                ),
            });
        }
        Ok(())
    }

    /// Evenly spaced candidate prices, ascending. Validates the range first.
    pub fn candidates(&self) -> PricingResult<Vec<f64>> {
        self.validate()?;
        let last = self.num_points - 1;
        let step = (self.high - self.low) / last as f64;
        Ok((0..self.num_points)
            .map(|i| {
                if i == last {
                    self.high
                } else {
                    self.low + step * i as f64
                }
            })
            .collect())
    }
}

/// A pricing request as received from a caller. Missing sweep fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub price_low: Option<f64>,
    #[serde(default)]
    pub price_high: Option<f64>,
    #[serde(default)]
    pub num_points: Option<usize>,
}

impl OptimizationRequest {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            price_low: None,
            price_high: None,
            num_points: None,
        }
    }

    /// Parses a `YYYY-MM-DD` date into a request with default sweep settings.
    pub fn parse(date: &str) -> PricingResult<Self> {
        let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
            PricingError::InvalidDate {
                input: date.to_string(),
            }
        })?;
        Ok(Self::for_date(parsed))
    }

    pub fn with_range(mut self, low: f64, high: f64, num_points: usize) -> Self {
        self.price_low = Some(low);
        self.price_high = Some(high);
        self.num_points = Some(num_points);
        self
    }

    pub fn resolve(&self, defaults: &PriceRange) -> PriceRange {
        PriceRange {
            low: self.price_low.unwrap_or(defaults.low),
            high: self.price_high.unwrap_or(defaults.high),
            num_points: self.num_points.unwrap_or(defaults.num_points),
        }
    }
}

/// One point of the price/revenue curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: f64,
    pub predicted_units: f64,
    pub predicted_revenue: f64,
}

impl PricePoint {
    pub fn new(price: f64, predicted_units: f64) -> Self {
        Self {
            price,
            predicted_units,
            predicted_revenue: price * predicted_units,
        }
    }
}

/// Result of a sweep: the revenue-maximizing price and the full curve, ascending by price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecommendation {
    pub date: NaiveDate,
    pub optimal_price: f64,
    pub max_revenue: f64,
    pub curve: Vec<PricePoint>,
    /// False when part of the sweep lies outside the prices seen during training.
    pub within_training_range: bool,
    /// True when the chosen price itself lies outside the training prices.
    #[serde(default)]
    pub optimal_extrapolated: bool,
}

impl PriceRecommendation {
    pub fn optimal_point(&self) -> Option<&PricePoint> {
        self.curve.iter().find(|p| p.price == self.optimal_price)
    }

    /// Curve points ranked by predicted revenue, highest first; ties keep ascending price order.
    pub fn top_points(&self, n: usize) -> Vec<PricePoint> {
        let mut ranked = self.curve.clone();
        ranked.sort_by(|a, b| b.predicted_revenue.total_cmp(&a.predicted_revenue));
        ranked.truncate(n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_range_candidates() {
        let candidates = PriceRange::default().candidates().unwrap();
        assert_eq!(candidates.len(), 151);
        assert_eq!(candidates[0], 50.0);
        assert_eq!(candidates[150], 200.0);
        assert!((candidates[1] - 51.0).abs() < 1e-9);
        assert!(candidates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_endpoints_exact_for_awkward_steps() {
        let candidates = PriceRange::new(0.1, 0.7, 7).candidates().unwrap();
        assert_eq!(candidates[0], 0.1);
        assert_eq!(*candidates.last().unwrap(), 0.7);
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(matches!(
            PriceRange::new(100.0, 50.0, 10).validate(),
            Err(PricingError::InvalidRange { .. })
        ));
        assert!(matches!(
            PriceRange::new(50.0, 200.0, 1).validate(),
            Err(PricingError::InvalidRange { .. })
        ));
        assert!(PriceRange::new(50.0, 50.0, 10).validate().is_err());
        assert!(PriceRange::new(0.0, 50.0, 10).validate().is_err());
        assert!(PriceRange::new(10.0, f64::INFINITY, 10).validate().is_err());
        assert!(PriceRange::new(50.0, 200.0, 2).validate().is_ok());
        assert!(PriceRange::new(50.0, 200.0, MAX_NUM_POINTS).validate().is_ok());
        assert!(matches!(
            PriceRange::new(50.0, 200.0, MAX_NUM_POINTS + 1).candidates(),
            Err(PricingError::InvalidRange { .. })
        ));
        assert!(matches!(
            PriceRange::new(50.0, 200.0, usize::MAX).candidates(),
            Err(PricingError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_request_resolution() {
        let req = OptimizationRequest::parse("2024-12-24").unwrap();
        assert_eq!(req.resolve(&PriceRange::default()), PriceRange::default());

        let req = req.with_range(60.0, 120.0, 61);
        assert_eq!(
            req.resolve(&PriceRange::default()),
            PriceRange::new(60.0, 120.0, 61)
        );
    }

    #[test]
    fn test_request_from_json_uses_defaults() {
        let req: OptimizationRequest =
            serde_json::from_str(r#"{"date":"2024-07-04","num_points":11}"#).unwrap();
        let range = req.resolve(&PriceRange::default());
        assert_eq!(range.low, DEFAULT_PRICE_LOW);
        assert_eq!(range.high, DEFAULT_PRICE_HIGH);
        assert_eq!(range.num_points, 11);
    }

    #[test]
    fn test_invalid_date() {
        assert!(matches!(
            OptimizationRequest::parse("24/12/2024"),
            Err(PricingError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_top_points_ranking() {
        let rec = PriceRecommendation {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            optimal_price: 20.0,
            max_revenue: 200.0,
            curve: vec![
                PricePoint::new(10.0, 5.0),
                PricePoint::new(20.0, 10.0),
                PricePoint::new(30.0, 1.0),
            ],
            within_training_range: true,
            optimal_extrapolated: false,
        };
        let top = rec.top_points(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].price, 20.0);
        assert_eq!(top[1].price, 10.0);
        assert_eq!(rec.optimal_point().unwrap().predicted_units, 10.0);
    }
}
