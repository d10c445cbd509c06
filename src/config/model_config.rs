//! Model artifact and training data locations.

use std::path::PathBuf;

pub const DEFAULT_MODEL_PATH: &str = "model/demand_model.json";
pub const DEFAULT_SALES_DATA_PATH: &str = "data/sales.csv";

/// Model environment configuration
#[derive(Debug, Clone)]
pub struct ModelEnvConfig {
    pub model_path: PathBuf,
    pub sales_data_path: PathBuf,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            sales_data_path: PathBuf::from(DEFAULT_SALES_DATA_PATH),
        }
    }
}

impl ModelEnvConfig {
    pub fn from_vars(vars: &dyn Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            model_path: vars("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            sales_data_path: vars("SALES_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.sales_data_path),
        }
    }
}
