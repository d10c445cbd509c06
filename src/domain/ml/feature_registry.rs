use crate::domain::errors::{PricingError, PricingResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Ordered list of feature names.
/// This order MUST match the column order of every trained model artifact.
/// Any change here is a breaking change and requires bumping `FEATURE_SCHEMA_VERSION`.
pub const FEATURE_NAMES: &[&str] = &["price", "day_of_week", "month", "day_of_year", "year"];

pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// Model input for one (date, price) pair.
///
/// `day_of_week` uses the Monday = 0 convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub price: f64,
    pub day_of_week: u32,
    pub month: u32,
    pub day_of_year: u32,
    pub year: i32,
}

impl FeatureVector {
    /// Flattens the vector in `FEATURE_NAMES` order.
    pub fn to_f64_vector(&self) -> Vec<f64> {
        vec![
            self.price,
            self.day_of_week as f64,
            self.month as f64,
            self.day_of_year as f64,
            self.year as f64,
        ]
    }
}

/// Schema stamp stored alongside a trained model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: u32,
    pub names: Vec<String>,
}

impl FeatureSchema {
    pub fn current() -> Self {
        Self {
            version: FEATURE_SCHEMA_VERSION,
            names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.names.len()
    }

    /// Fails with `PricingError::Schema` unless this schema equals the one compiled into the crate.
    pub fn ensure_current(&self) -> PricingResult<()> {
        let current = Self::current();
        if *self != current {
            return Err(PricingError::Schema {
                expected: current.to_string(),
                found: self.to_string(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{} [{}]", self.version, self.names.join(", "))
    }
}

fn validate_price(price: f64) -> PricingResult<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(PricingError::InvalidPrice { price });
    }
    Ok(())
}

/// Builds the feature vector for a single (date, price) pair.
pub fn build(date: NaiveDate, price: f64) -> PricingResult<FeatureVector> {
    validate_price(price)?;
    Ok(FeatureVector {
        price,
        day_of_week: date.weekday().num_days_from_monday(),
        month: date.month(),
        day_of_year: date.ordinal(),
        year: date.year(),
    })
}

/// Builds one feature vector per price; the date-derived fields are shared.
pub fn build_many(date: NaiveDate, prices: &[f64]) -> PricingResult<Vec<FeatureVector>> {
    if let Some(&bad) = prices.iter().find(|p| !p.is_finite() || **p <= 0.0) {
        return Err(PricingError::InvalidPrice { price: bad });
    }
    let template = FeatureVector {
        price: 0.0,
        day_of_week: date.weekday().num_days_from_monday(),
        month: date.month(),
        day_of_year: date.ordinal(),
        year: date.year(),
    };
    Ok(prices
        .iter()
        .map(|&price| FeatureVector { price, ..template })
        .collect())
}

/// Converts a batch of feature vectors into row-major matrix rows.
pub fn to_rows(features: &[FeatureVector]) -> Vec<Vec<f64>> {
    features.iter().map(FeatureVector::to_f64_vector).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_feature_vector_length() {
        let fv = build(date(2024, 3, 15), 99.0).unwrap();
        assert_eq!(fv.to_f64_vector().len(), FEATURE_NAMES.len());
        assert_eq!(FeatureSchema::current().width(), FEATURE_NAMES.len());
    }

    #[test]
    fn test_calendar_fields() {
        // 2024-12-31 is a Tuesday in a leap year
        let fv = build(date(2024, 12, 31), 120.0).unwrap();
        assert_eq!(fv.day_of_week, 1);
        assert_eq!(fv.month, 12);
        assert_eq!(fv.day_of_year, 366);
        assert_eq!(fv.year, 2024);

        // Monday is 0, Sunday is 6
        assert_eq!(build(date(2024, 1, 1), 1.0).unwrap().day_of_week, 0);
        assert_eq!(build(date(2024, 1, 7), 1.0).unwrap().day_of_week, 6);
    }

    #[test]
    fn test_feature_consistency() {
        let fv = build(date(2023, 6, 1), 75.5).unwrap();
        let vec = fv.to_f64_vector();
        // price is index 0
        assert_eq!(vec[0], 75.5);
        // year is last index (4)
        assert_eq!(vec[4], 2023.0);
    }

    #[test]
    fn test_build_many_matches_build() {
        let d = date(2022, 11, 25);
        let prices = [50.0, 99.99, 200.0];
        let batch = build_many(d, &prices).unwrap();

        assert_eq!(batch.len(), prices.len());
        for (fv, &p) in batch.iter().zip(prices.iter()) {
            assert_eq!(*fv, build(d, p).unwrap());
        }
    }

    #[test]
    fn test_rejects_non_positive_prices() {
        let d = date(2024, 1, 1);
        assert!(matches!(
            build(d, 0.0),
            Err(PricingError::InvalidPrice { .. })
        ));
        assert!(matches!(
            build(d, -5.0),
            Err(PricingError::InvalidPrice { .. })
        ));
        assert!(matches!(
            build(d, f64::NAN),
            Err(PricingError::InvalidPrice { .. })
        ));
        assert!(build_many(d, &[10.0, f64::INFINITY]).is_err());
    }

    #[test]
    fn test_schema_mismatch_detected() {
        let mut reordered = FeatureSchema::current();
        reordered.names.swap(0, 1);
        assert!(matches!(
            reordered.ensure_current(),
            Err(PricingError::Schema { .. })
        ));

        let mut bumped = FeatureSchema::current();
        bumped.version += 1;
        assert!(bumped.ensure_current().is_err());

        assert!(FeatureSchema::current().ensure_current().is_ok());
    }
}
