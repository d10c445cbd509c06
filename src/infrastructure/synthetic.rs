//! Seeded synthetic sales history for bootstrapping a first model.
//!
//! Demand decays exponentially with price around a base price, is lifted on
//! Friday to Sunday and multiplied by 2.5x to 3.5x in December, plus Gaussian noise.

use crate::domain::errors::{PricingError, PricingResult};
use crate::domain::sales::SalesRecord;
use chrono::{Datelike, Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Demand multiplier per weekday, Monday first.
const WEEKDAY_EFFECT: [f64; 7] = [1.0, 1.0, 1.0, 1.0, 1.2, 1.8, 1.6];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSalesGenerator {
    pub start: NaiveDate,
    pub days: usize,
    pub seed: u64,
    pub base_price: f64,
    /// Prices are drawn uniformly from `base_price ± price_spread`
    pub price_spread: f64,
    pub base_demand: f64,
    pub elasticity: f64,
    pub noise_std: f64,
}

impl Default for SyntheticSalesGenerator {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
            days: 365 * 2,
            seed: 42,
            base_price: 100.0,
            price_spread: 30.0,
            base_demand: 80.0,
            elasticity: 2.5,
            noise_std: 5.0,
        }
    }
}

impl SyntheticSalesGenerator {
    /// Expected (noise-free) units sold on `date` at `price`.
    pub fn expected_demand(&self, date: NaiveDate, price: f64, december_factor: f64) -> f64 {
        let weekday = WEEKDAY_EFFECT[date.weekday().num_days_from_monday() as usize];
        let month = if date.month() == 12 {
            december_factor
        } else {
            1.0
        };
        self.base_demand
            * (-self.elasticity * (price - self.base_price) / self.base_price).exp()
            * weekday
            * month
    }

    pub fn generate(&self) -> PricingResult<Vec<SalesRecord>> {
        if self.price_spread <= 0.0 || self.price_spread >= self.base_price {
            return Err(PricingError::InvalidRange {
                reason: format!(
                    "price_spread must be in (0, base_price), got {} for base {}",
                    self.price_spread, self.base_price
                ),
            });
        }
        let noise = Normal::new(0.0, self.noise_std).map_err(|e| PricingError::Training {
            reason: format!("invalid noise distribution: {}", e),
        })?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut records = Vec::with_capacity(self.days);
        for day in 0..self.days {
            let date = self
                .start
                .checked_add_days(Days::new(day as u64))
                .ok_or_else(|| PricingError::InvalidDate {
                    input: format!("{} + {} days", self.start, day),
                })?;
            let price = self.base_price + rng.random_range(-self.price_spread..self.price_spread);
            let december = if date.month() == 12 {
                rng.random_range(2.5..3.5)
            } else {
                1.0
            };
            let demand = self.expected_demand(date, price, december) + noise.sample(&mut rng);
            records.push(SalesRecord::new(date, price, demand.max(0.0) as u32));
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_contiguous_days() {
        let records = SyntheticSalesGenerator {
            days: 30,
            ..Default::default()
        }
        .generate()
        .unwrap();

        assert_eq!(records.len(), 30);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
        assert!(records.windows(2).all(|w| w[1].date == w[0].date + Days::new(1)));
        assert!(records.iter().all(|r| r.price >= 70.0 && r.price < 130.0));
    }

    #[test]
    fn test_same_seed_same_data() {
        let generator = SyntheticSalesGenerator {
            days: 100,
            ..Default::default()
        };
        assert_eq!(generator.generate().unwrap(), generator.generate().unwrap());

        let other = SyntheticSalesGenerator {
            seed: 7,
            ..generator.clone()
        };
        assert_ne!(generator.generate().unwrap(), other.generate().unwrap());
    }

    #[test]
    fn test_expected_demand_shape() {
        let generator = SyntheticSalesGenerator::default();
        // 2024-06-03 is a Monday, 2024-06-08 a Saturday
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2024, 6, 8).unwrap();

        assert!((generator.expected_demand(monday, 100.0, 3.0) - 80.0).abs() < 1e-9);
        assert!(
            generator.expected_demand(monday, 70.0, 1.0)
                > generator.expected_demand(monday, 130.0, 1.0)
        );
        assert!(
            (generator.expected_demand(saturday, 100.0, 1.0) - 80.0 * 1.8).abs() < 1e-9
        );
    }

    #[test]
    fn test_rejects_bad_spread() {
        let generator = SyntheticSalesGenerator {
            price_spread: 150.0,
            ..Default::default()
        };
        assert!(generator.generate().is_err());
    }
}
