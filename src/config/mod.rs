//! Configuration module for Rustprice.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Model artifacts, Pricing sweep, and Training.

mod model_config;
mod pricing_config;
mod training_config;

pub use model_config::ModelEnvConfig;
pub use pricing_config::PricingEnvConfig;
pub use training_config::TrainingEnvConfig;

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Parses `name` from `vars`, falling back to `default` when unset or blank.
pub(crate) fn parse_var<T>(vars: &dyn Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match vars(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value for {}: '{}'", name, raw)),
        _ => Ok(default),
    }
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub model: ModelEnvConfig,
    pub pricing: PricingEnvConfig,
    pub training: TrainingEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(&|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_vars(vars: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let model = ModelEnvConfig::from_vars(vars);
        let pricing = PricingEnvConfig::from_vars(vars).context("Failed to load pricing config")?;
        let training =
            TrainingEnvConfig::from_vars(vars).context("Failed to load training config")?;

        Ok(Self {
            model,
            pricing,
            training,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_vars(&|_| None).unwrap();

        assert_eq!(
            config.model.model_path.to_str(),
            Some("model/demand_model.json")
        );
        assert_eq!(config.pricing.range.low, 50.0);
        assert_eq!(config.pricing.range.high, 200.0);
        assert_eq!(config.pricing.range.num_points, 151);
        assert_eq!(config.training.config.params.max_rounds, 1000);
        assert_eq!(config.training.config.holdout_fraction, 0.2);
    }

    #[test]
    fn test_overrides() {
        let env = vars(&[
            ("MODEL_PATH", "/srv/models/m.json"),
            ("PRICE_LOW", "20"),
            ("PRICE_HIGH", "80"),
            ("PRICE_POINTS", "61"),
            ("TRAIN_LEARNING_RATE", "0.05"),
            ("TRAIN_SEED", "7"),
        ]);
        let config = Config::from_vars(&|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.model.model_path.to_str(), Some("/srv/models/m.json"));
        assert_eq!(config.pricing.range.low, 20.0);
        assert_eq!(config.pricing.range.num_points, 61);
        assert_eq!(config.training.config.params.learning_rate, 0.05);
        assert_eq!(config.training.config.params.seed, 7);
    }

    #[test]
    fn test_invalid_value_names_variable() {
        let env = vars(&[("PRICE_POINTS", "many")]);
        let err = Config::from_vars(&|k| env.get(k).cloned()).unwrap_err();
        assert!(format!("{:#}", err).contains("PRICE_POINTS"));
    }

    #[test]
    fn test_invalid_default_range_rejected() {
        let env = vars(&[("PRICE_LOW", "300")]);
        assert!(Config::from_vars(&|k| env.get(k).cloned()).is_err());
    }
}
