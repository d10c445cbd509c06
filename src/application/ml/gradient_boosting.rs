//! Gradient-boosted regression trees with a squared-error objective.
//!
//! Each boosting round fits a shallow SmartCore decision tree to the current
//! residuals on a seeded row/column sample and adds it with a small learning
//! rate. When a held-out set is given, training stops once its RMSE has not
//! improved for `early_stopping_rounds` rounds and only the rounds up to the
//! best score are kept.

use crate::domain::errors::{PricingError, PricingResult};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_regressor::{
    DecisionTreeRegressor, DecisionTreeRegressorParameters,
};
use tracing::debug;

type Tree = DecisionTreeRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Boosting hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingParams {
    pub learning_rate: f64,
    pub max_rounds: usize,
    pub max_depth: u16,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Fraction of rows sampled per round
    pub subsample: f64,
    /// Fraction of feature columns sampled per tree
    pub colsample: f64,
    pub early_stopping_rounds: usize,
    pub seed: u64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            max_rounds: 1000,
            max_depth: 6,
            min_samples_split: 2,
            min_samples_leaf: 1,
            subsample: 0.7,
            colsample: 0.7,
            early_stopping_rounds: 50,
            seed: 42,
        }
    }
}

impl BoostingParams {
    pub fn validate(&self) -> PricingResult<()> {
        let invalid = |reason: String| Err(PricingError::Training { reason });
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return invalid(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            ));
        }
        if self.max_rounds == 0 {
            return invalid("max_rounds must be at least 1".to_string());
        }
        if self.max_depth == 0 {
            return invalid("max_depth must be at least 1".to_string());
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return invalid(format!("subsample must be in (0, 1], got {}", self.subsample));
        }
        if !(self.colsample > 0.0 && self.colsample <= 1.0) {
            return invalid(format!("colsample must be in (0, 1], got {}", self.colsample));
        }
        if self.early_stopping_rounds == 0 {
            return invalid("early_stopping_rounds must be at least 1".to_string());
        }
        Ok(())
    }

    fn tree_params(&self) -> DecisionTreeRegressorParameters {
        DecisionTreeRegressorParameters::default()
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
    }
}

/// One boosting round: a tree fitted on a subset of the feature columns.
#[derive(Debug, Serialize, Deserialize)]
pub struct BoostedTree {
    pub columns: Vec<usize>,
    pub tree: Tree,
}

impl BoostedTree {
    fn predict_rows(&self, rows: &[Vec<f64>]) -> PricingResult<Vec<f64>> {
        let projected: Vec<Vec<f64>> = rows
            .iter()
            .map(|row| self.columns.iter().map(|&c| row[c]).collect())
            .collect();
        let matrix = DenseMatrix::from_2d_vec(&projected).map_err(|e| PricingError::Training {
            reason: format!("Matrix creation failed: {}", e),
        })?;
        self.tree
            .predict(&matrix)
            .map_err(|e| PricingError::Training {
                reason: format!("Prediction failed: {}", e),
            })
    }
}

/// Summary of a `fit` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub rounds_trained: usize,
    /// Rounds kept in the model (0 means only the base score)
    pub best_round: usize,
    pub best_eval_rmse: Option<f64>,
    pub stopped_early: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    base_score: f64,
    learning_rate: f64,
    n_features: usize,
    trees: Vec<BoostedTree>,
}

fn rmse(predictions: &[f64], targets: &[f64]) -> f64 {
    let sq_err: f64 = predictions
        .iter()
        .zip(targets.iter())
        .map(|(p, t)| (p - t).powi(2))
        .sum();
    (sq_err / predictions.len() as f64).sqrt()
}

fn check_shape(x: &[Vec<f64>], y: &[f64], width: usize, label: &str) -> PricingResult<()> {
    if x.len() != y.len() {
        return Err(PricingError::Training {
            reason: format!(
                "{} set has {} rows but {} targets",
                label,
                x.len(),
                y.len()
            ),
        });
    }
    if let Some(row) = x.iter().find(|row| row.len() != width) {
        return Err(PricingError::Schema {
            expected: format!("{} columns", width),
            found: format!("{} columns in {} set", row.len(), label),
        });
    }
    Ok(())
}

impl GradientBoostingRegressor {
    /// Fits the ensemble on `(x, y)`, early-stopping on `eval` when provided.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        eval: Option<(&[Vec<f64>], &[f64])>,
        params: &BoostingParams,
    ) -> PricingResult<(Self, FitReport)> {
        params.validate()?;
        if x.is_empty() {
            return Err(PricingError::InsufficientData {
                reason: "training set is empty".to_string(),
            });
        }
        let n_features = x[0].len();
        if n_features == 0 {
            return Err(PricingError::Schema {
                expected: "at least one feature column".to_string(),
                found: "0 columns".to_string(),
            });
        }
        check_shape(x, y, n_features, "training")?;
        let eval = match eval {
            Some((ex, ey)) if !ex.is_empty() => {
                check_shape(ex, ey, n_features, "held-out")?;
                Some((ex, ey))
            }
            _ => None,
        };

        let n = x.len();
        let base_score = y.iter().sum::<f64>() / n as f64;
        let mut model = Self {
            base_score,
            learning_rate: params.learning_rate,
            n_features,
            trees: Vec::new(),
        };

        let mut rng = StdRng::seed_from_u64(params.seed);
        let tree_params = params.tree_params();
        let n_rows = ((n as f64 * params.subsample).round() as usize).clamp(1, n);
        let n_cols = ((n_features as f64 * params.colsample).floor() as usize).clamp(1, n_features);

        let mut train_pred = vec![base_score; n];
        let mut eval_pred = eval.map(|(ex, _)| vec![base_score; ex.len()]);
        let mut best_eval_rmse = eval.map(|(_, ey)| rmse(eval_pred.as_deref().unwrap_or(&[]), ey));
        let mut best_round = 0;
        let mut since_best = 0;
        let mut stopped_early = false;

        let mut row_idx: Vec<usize> = (0..n).collect();
        let mut col_idx: Vec<usize> = (0..n_features).collect();

        for round in 0..params.max_rounds {
            row_idx.shuffle(&mut rng);
            col_idx.shuffle(&mut rng);
            let mut rows: Vec<usize> = row_idx[..n_rows].to_vec();
            rows.sort_unstable();
            let mut columns: Vec<usize> = col_idx[..n_cols].to_vec();
            columns.sort_unstable();

            let sample_x: Vec<Vec<f64>> = rows
                .iter()
                .map(|&r| columns.iter().map(|&c| x[r][c]).collect())
                .collect();
            let residuals: Vec<f64> = rows.iter().map(|&r| y[r] - train_pred[r]).collect();

            let matrix =
                DenseMatrix::from_2d_vec(&sample_x).map_err(|e| PricingError::Training {
                    reason: format!("Matrix error: {}", e),
                })?;
            let tree = Tree::fit(&matrix, &residuals, tree_params.clone()).map_err(|e| {
                PricingError::Training {
                    reason: format!("Tree fit failed in round {}: {}", round, e),
                }
            })?;
            let stage = BoostedTree { columns, tree };

            for (p, u) in train_pred.iter_mut().zip(stage.predict_rows(x)?) {
                *p += params.learning_rate * u;
            }
            model.trees.push(stage);

            let (Some((ex, ey)), Some(preds)) = (eval, eval_pred.as_mut()) else {
                best_round = model.trees.len();
                continue;
            };
            let stage = &model.trees[model.trees.len() - 1];
            for (p, u) in preds.iter_mut().zip(stage.predict_rows(ex)?) {
                *p += params.learning_rate * u;
            }
            let score = rmse(preds, ey);
            if best_eval_rmse.is_none_or(|best| score < best) {
                best_eval_rmse = Some(score);
                best_round = model.trees.len();
                since_best = 0;
            } else {
                since_best += 1;
                if since_best >= params.early_stopping_rounds {
                    debug!(
                        "Early stopping at round {} (best round {}, held-out RMSE {:.4})",
                        round + 1,
                        best_round,
                        best_eval_rmse.unwrap_or(f64::NAN)
                    );
                    stopped_early = true;
                    break;
                }
            }
        }

        let rounds_trained = model.trees.len();
        model.trees.truncate(best_round);

        Ok((
            model,
            FitReport {
                rounds_trained,
                best_round,
                best_eval_rmse,
                stopped_early,
            },
        ))
    }

    /// Raw (unclamped) predictions for row-major feature rows.
    pub fn predict(&self, rows: &[Vec<f64>]) -> PricingResult<Vec<f64>> {
        if let Some(row) = rows.iter().find(|row| row.len() != self.n_features) {
            return Err(PricingError::Schema {
                expected: format!("{} columns", self.n_features),
                found: format!("{} columns", row.len()),
            });
        }
        let mut out = vec![self.base_score; rows.len()];
        if rows.is_empty() {
            return Ok(out);
        }
        for stage in &self.trees {
            for (p, u) in out.iter_mut().zip(stage.predict_rows(rows)?) {
                *p += self.learning_rate * u;
            }
        }
        Ok(out)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }
}
