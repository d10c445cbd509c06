//! Boosting and split parameters for the training binary.

use super::parse_var;
use crate::application::ml::gradient_boosting::BoostingParams;
use crate::application::ml::training::TrainingConfig;
use anyhow::{Context, Result};

/// Training environment configuration
#[derive(Debug, Clone)]
pub struct TrainingEnvConfig {
    pub config: TrainingConfig,
}

impl TrainingEnvConfig {
    pub fn from_vars(vars: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let d = BoostingParams::default();
        let params = BoostingParams {
            learning_rate: parse_var(vars, "TRAIN_LEARNING_RATE", d.learning_rate)?,
            max_rounds: parse_var(vars, "TRAIN_MAX_ROUNDS", d.max_rounds)?,
            max_depth: parse_var(vars, "TRAIN_MAX_DEPTH", d.max_depth)?,
            subsample: parse_var(vars, "TRAIN_SUBSAMPLE", d.subsample)?,
            colsample: parse_var(vars, "TRAIN_COLSAMPLE", d.colsample)?,
            early_stopping_rounds: parse_var(vars, "TRAIN_EARLY_STOPPING", d.early_stopping_rounds)?,
            seed: parse_var(vars, "TRAIN_SEED", d.seed)?,
            ..d
        };
        params
            .validate()
            .context("Invalid TRAIN_* boosting parameters")?;

        let defaults = TrainingConfig::default();
        Ok(Self {
            config: TrainingConfig {
                params,
                holdout_fraction: parse_var(vars, "TRAIN_HOLDOUT", defaults.holdout_fraction)?,
                min_records: defaults.min_records,
            },
        })
    }
}
