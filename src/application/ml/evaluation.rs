use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Held-out regression metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub samples: usize,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    /// Computes RMSE, MAE and R² (R² is 0 when the targets have no variance).
    pub fn compute(predictions: &[f64], actuals: &[f64]) -> Option<Self> {
        let n = predictions.len().min(actuals.len());
        if n == 0 {
            return None;
        }
        let predictions = &predictions[..n];
        let actuals = &actuals[..n];

        let mse = predictions
            .iter()
            .zip(actuals)
            .map(|(p, t)| (p - t).powi(2))
            .sum::<f64>()
            / n as f64;
        let mae = predictions
            .iter()
            .zip(actuals)
            .map(|(p, t)| (p - t).abs())
            .sum::<f64>()
            / n as f64;
        let var_y = actuals.iter().population_variance();
        let r2 = if var_y > 0.0 { 1.0 - mse / var_y } else { 0.0 };

        Some(Self {
            samples: n,
            rmse: mse.sqrt(),
            mae,
            r2,
        })
    }
}

/// Mean and sample standard deviation of out-of-sample RMSE across CV folds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationSummary {
    pub fold_rmse: Vec<f64>,
    pub mean_rmse: f64,
    pub std_rmse: f64,
}

impl CrossValidationSummary {
    pub fn from_folds(fold_rmse: Vec<f64>) -> Option<Self> {
        if fold_rmse.is_empty() {
            return None;
        }
        let mean_rmse = fold_rmse.iter().mean();
        let std_rmse = if fold_rmse.len() > 1 {
            fold_rmse.iter().std_dev()
        } else {
            0.0
        };
        Some(Self {
            fold_rmse,
            mean_rmse,
            std_rmse,
        })
    }

    /// Fold scores vary by more than half their mean.
    pub fn is_unstable(&self) -> bool {
        self.mean_rmse > 0.0 && self.std_rmse > 0.5 * self.mean_rmse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_predictions() {
        let y = [1.0, 2.0, 3.0, 4.0];
        let m = RegressionMetrics::compute(&y, &y).unwrap();
        assert_eq!(m.samples, 4);
        assert_relative_eq!(m.rmse, 0.0);
        assert_relative_eq!(m.mae, 0.0);
        assert_relative_eq!(m.r2, 1.0);
    }

    #[test]
    fn test_known_errors() {
        let pred = [2.0, 2.0, 2.0, 2.0];
        let actual = [1.0, 3.0, 1.0, 3.0];
        let m = RegressionMetrics::compute(&pred, &actual).unwrap();
        assert_relative_eq!(m.rmse, 1.0);
        assert_relative_eq!(m.mae, 1.0);
        // predicting the mean gives R² = 0
        assert_relative_eq!(m.r2, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(RegressionMetrics::compute(&[], &[]).is_none());
        assert!(CrossValidationSummary::from_folds(vec![]).is_none());
    }

    #[test]
    fn test_cv_stability() {
        let stable = CrossValidationSummary::from_folds(vec![10.0, 11.0, 9.0]).unwrap();
        assert_relative_eq!(stable.mean_rmse, 10.0);
        assert!(!stable.is_unstable());

        let unstable = CrossValidationSummary::from_folds(vec![1.0, 20.0, 2.0]).unwrap();
        assert!(unstable.is_unstable());
    }
}
