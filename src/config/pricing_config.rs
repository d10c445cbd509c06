//! Default price sweep and serving limits.

use super::parse_var;
use crate::domain::pricing::{DEFAULT_NUM_POINTS, DEFAULT_PRICE_HIGH, DEFAULT_PRICE_LOW, PriceRange};
use anyhow::{Context, Result};
use std::time::Duration;

/// Pricing environment configuration
#[derive(Debug, Clone)]
pub struct PricingEnvConfig {
    pub range: PriceRange,
    pub inference_timeout: Duration,
}

impl PricingEnvConfig {
    pub fn from_vars(vars: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let range = PriceRange::new(
            parse_var(vars, "PRICE_LOW", DEFAULT_PRICE_LOW)?,
            parse_var(vars, "PRICE_HIGH", DEFAULT_PRICE_HIGH)?,
            parse_var(vars, "PRICE_POINTS", DEFAULT_NUM_POINTS)?,
        );
        range
            .validate()
            .context("PRICE_LOW/PRICE_HIGH/PRICE_POINTS do not form a valid sweep")?;

        let timeout_ms: u64 = parse_var(vars, "INFERENCE_TIMEOUT_MS", 2000)?;

        Ok(Self {
            range,
            inference_timeout: Duration::from_millis(timeout_ms),
        })
    }
}
