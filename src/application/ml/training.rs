//! Offline training pipeline: sales records in, fitted `DemandModel` out.

use super::demand_model::{DemandModel, ModelMetadata};
use super::evaluation::{CrossValidationSummary, RegressionMetrics};
use super::gradient_boosting::{BoostingParams, GradientBoostingRegressor};
use crate::domain::errors::{PricingError, PricingResult};
use crate::domain::ml::feature_registry;
use crate::domain::sales::SalesRecord;
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub params: BoostingParams,
    /// Fraction of records held out for early stopping and evaluation
    pub holdout_fraction: f64,
    pub min_records: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            params: BoostingParams::default(),
            holdout_fraction: 0.2,
            min_records: 10,
        }
    }
}

/// Feature matrix and targets built from sales records
struct Dataset {
    x: Vec<Vec<f64>>,
    y: Vec<f64>,
    prices: Vec<f64>,
}

impl Dataset {
    fn from_records(records: &[&SalesRecord]) -> PricingResult<Self> {
        let mut x = Vec::with_capacity(records.len());
        let mut y = Vec::with_capacity(records.len());
        let mut prices = Vec::with_capacity(records.len());
        for record in records {
            // Same builder the optimizer uses at serving time
            let features = feature_registry::build(record.date, record.price)?;
            x.push(features.to_f64_vector());
            y.push(record.units_sold as f64);
            prices.push(record.price);
        }
        Ok(Self { x, y, prices })
    }
}

pub struct TrainingPipeline {
    config: TrainingConfig,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Seeded shuffle split into (training, held-out).
    pub fn split<'a>(
        &self,
        records: &'a [SalesRecord],
    ) -> PricingResult<(Vec<&'a SalesRecord>, Vec<&'a SalesRecord>)> {
        let frac = self.config.holdout_fraction;
        if !(0.0..1.0).contains(&frac) {
            return Err(PricingError::Training {
                reason: format!("holdout_fraction must be in [0, 1), got {}", frac),
            });
        }

        let n = records.len();
        let mut holdout = (n as f64 * frac).round() as usize;
        if frac > 0.0 {
            holdout = holdout.max(1);
        }
        if holdout >= n {
            return Err(PricingError::InsufficientData {
                reason: format!(
                    "{} records leave no training rows after holding out {}",
                    n, holdout
                ),
            });
        }

        let mut order: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.config.params.seed);
        order.shuffle(&mut rng);

        let held_out = order[..holdout].iter().map(|&i| &records[i]).collect();
        let training = order[holdout..].iter().map(|&i| &records[i]).collect();
        Ok((training, held_out))
    }

    fn check_records(&self, records: &[SalesRecord]) -> PricingResult<()> {
        if records.len() < self.config.min_records {
            return Err(PricingError::InsufficientData {
                reason: format!(
                    "need at least {} sales records, got {}",
                    self.config.min_records,
                    records.len()
                ),
            });
        }
        let mut seen = HashSet::with_capacity(records.len());
        let duplicates = records.iter().filter(|r| !seen.insert(r.date)).count();
        if duplicates > 0 {
            warn!(
                "{} sales records share a date with an earlier record",
                duplicates
            );
        }
        Ok(())
    }

    /// Trains a demand model with early stopping on the held-out subset.
    pub fn train(&self, records: &[SalesRecord]) -> PricingResult<DemandModel> {
        self.check_records(records)?;
        let (training, held_out) = self.split(records)?;
        let train = Dataset::from_records(&training)?;
        let eval = Dataset::from_records(&held_out)?;

        let price_variance = train.prices.iter().population_variance();
        if !(price_variance > 0.0) {
            return Err(PricingError::InsufficientData {
                reason: "training prices have zero variance, price elasticity is unlearnable"
                    .to_string(),
            });
        }

        let params = &self.config.params;
        info!(
            "Training on {} samples, {} held out (lr={}, depth={}, max rounds={}, patience={})",
            train.x.len(),
            eval.x.len(),
            params.learning_rate,
            params.max_depth,
            params.max_rounds,
            params.early_stopping_rounds
        );

        let eval_set = if eval.x.is_empty() {
            None
        } else {
            Some((eval.x.as_slice(), eval.y.as_slice()))
        };
        let (booster, fit) = GradientBoostingRegressor::fit(&train.x, &train.y, eval_set, params)?;

        if fit.stopped_early {
            info!(
                "Early stopping after {} rounds, keeping {}",
                fit.rounds_trained, fit.best_round
            );
        } else {
            info!("Trained all {} rounds", fit.rounds_trained);
        }

        let holdout_metrics = if eval.x.is_empty() {
            None
        } else {
            let predictions: Vec<f64> = booster
                .predict(&eval.x)?
                .into_iter()
                .map(|p| p.max(0.0))
                .collect();
            RegressionMetrics::compute(&predictions, &eval.y)
        };
        if let Some(m) = &holdout_metrics {
            info!(
                "Held-out (n={}): RMSE={:.3}, MAE={:.3}, R²={:.4}",
                m.samples, m.rmse, m.mae, m.r2
            );
        }

        let metadata = ModelMetadata {
            model_id: Uuid::new_v4().to_string(),
            trained_at: Utc::now(),
            training_samples: train.x.len(),
            holdout_samples: eval.x.len(),
            price_min: train.prices.iter().cloned().fold(f64::INFINITY, f64::min),
            price_max: train
                .prices
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max),
            params: params.clone(),
            fit,
            holdout_metrics,
        };
        DemandModel::new(booster, metadata)
    }

    /// Expanding-window time-series cross-validation.
    ///
    /// Fold `i` tests on a slice of the chronologically sorted records between 20% and 80%
    /// and trains on everything before it minus a 5% gap. Each fold trains for the full
    /// round budget. Folds run in parallel and are reported in order.
    pub fn cross_validate(
        &self,
        records: &[SalesRecord],
        folds: usize,
    ) -> PricingResult<Option<CrossValidationSummary>> {
        self.check_records(records)?;
        if folds < 2 {
            return Ok(None);
        }

        let mut sorted: Vec<&SalesRecord> = records.iter().collect();
        sorted.sort_by_key(|r| r.date);
        let data = Dataset::from_records(&sorted)?;
        let n = data.x.len();
        let gap = (n as f64 * 0.05).floor() as usize;

        let bounds: Vec<(usize, usize, usize)> = (0..folds)
            .filter_map(|fold| {
                let test_start =
                    (n as f64 * (0.2 + (fold as f64 / folds as f64) * 0.6)).floor() as usize;
                let test_end = ((n as f64 * (0.2 + ((fold + 1) as f64 / folds as f64) * 0.6))
                    .floor() as usize)
                    .min(n);
                let train_end = test_start.saturating_sub(gap).min(n);
                (train_end >= self.config.min_records && test_end > test_start)
                    .then_some((train_end, test_start, test_end))
            })
            .collect();

        let params = &self.config.params;
        let fold_rmse: Vec<f64> = bounds
            .par_iter()
            .map(|&(train_end, test_start, test_end)| -> PricingResult<f64> {
                let (model, _) = GradientBoostingRegressor::fit(
                    &data.x[..train_end],
                    &data.y[..train_end],
                    None,
                    params,
                )?;
                let predictions: Vec<f64> = model
                    .predict(&data.x[test_start..test_end])?
                    .into_iter()
                    .map(|p| p.max(0.0))
                    .collect();
                Ok(RegressionMetrics::compute(&predictions, &data.y[test_start..test_end])
                    .map(|m| m.rmse)
                    .unwrap_or(f64::NAN))
            })
            .collect::<PricingResult<Vec<f64>>>()?;

        let summary = CrossValidationSummary::from_folds(fold_rmse);
        match &summary {
            Some(s) => {
                info!(
                    "CV OOS RMSE over {} folds: mean={:.3}, std={:.3}",
                    s.fold_rmse.len(),
                    s.mean_rmse,
                    s.std_rmse
                );
                if s.is_unstable() {
                    warn!("Model unstable across folds (std > 50% of mean)");
                }
            }
            None => warn!("CV: no valid folds for {} records", n),
        }
        Ok(summary)
    }
}

impl Default for TrainingPipeline {
    fn default() -> Self {
        Self::new(TrainingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};

    fn records(n: usize, price: impl Fn(usize) -> f64) -> Vec<SalesRecord> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let p = price(i);
                let units = (200.0 - p).max(0.0) as u32;
                SalesRecord::new(start + Days::new(i as u64), p, units)
            })
            .collect()
    }

    fn quick_config() -> TrainingConfig {
        TrainingConfig {
            params: BoostingParams {
                learning_rate: 0.2,
                max_rounds: 60,
                early_stopping_rounds: 10,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_split_is_seeded_and_disjoint() {
        let data = records(50, |i| 50.0 + i as f64);
        let pipeline = TrainingPipeline::new(quick_config());

        let (train_a, hold_a) = pipeline.split(&data).unwrap();
        let (train_b, hold_b) = pipeline.split(&data).unwrap();

        assert_eq!(train_a.len(), 40);
        assert_eq!(hold_a.len(), 10);
        assert_eq!(train_a, train_b);
        assert_eq!(hold_a, hold_b);
        for r in &hold_a {
            assert!(!train_a.contains(r));
        }
    }

    #[test]
    fn test_rejects_too_few_records() {
        let data = records(5, |i| 50.0 + i as f64);
        let result = TrainingPipeline::new(quick_config()).train(&data);
        assert!(matches!(
            result,
            Err(PricingError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_rejects_constant_prices() {
        let data = records(40, |_| 99.0);
        let result = TrainingPipeline::new(quick_config()).train(&data);
        assert!(matches!(
            result,
            Err(PricingError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_holdout() {
        let data = records(40, |i| 50.0 + i as f64);
        let config = TrainingConfig {
            holdout_fraction: 1.0,
            ..quick_config()
        };
        assert!(TrainingPipeline::new(config).split(&data).is_err());
    }

    #[test]
    fn test_train_records_metadata() {
        let data = records(100, |i| 60.0 + (i % 50) as f64);
        let model = TrainingPipeline::new(quick_config()).train(&data).unwrap();
        let meta = model.metadata();

        assert_eq!(meta.training_samples, 80);
        assert_eq!(meta.holdout_samples, 20);
        assert!(meta.price_min >= 60.0 && meta.price_max <= 109.0);
        assert!(meta.holdout_metrics.is_some());
        assert!(meta.fit.best_round <= meta.fit.rounds_trained);
        assert_eq!(model.n_trees(), meta.fit.best_round);
    }

    #[test]
    fn test_cross_validation_folds() {
        let data = records(120, |i| 60.0 + (i % 40) as f64);
        let pipeline = TrainingPipeline::new(quick_config());

        let summary = pipeline.cross_validate(&data, 3).unwrap().unwrap();
        assert_eq!(summary.fold_rmse.len(), 3);
        assert!(summary.fold_rmse.iter().all(|r| r.is_finite() && *r >= 0.0));

        assert!(pipeline.cross_validate(&data, 1).unwrap().is_none());
    }
}
