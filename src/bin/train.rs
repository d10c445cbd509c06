//! Demand Model Trainer
//!
//! Fits the gradient-boosted demand model on a sales CSV and writes the artifact
//! the `recommend` binary serves from.

use anyhow::{Context, Result};
use clap::Parser;
use rustprice::application::ml::gradient_boosting::BoostingParams;
use rustprice::application::ml::training::TrainingPipeline;
use rustprice::config::Config;
use rustprice::infrastructure::reporting;
use rustprice::infrastructure::sales_csv;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Train the demand model", long_about = None)]
struct Args {
    /// Path to sales CSV (defaults to SALES_DATA_PATH)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Path to output model file (defaults to MODEL_PATH)
    #[arg(long)]
    output: Option<PathBuf>,

    /// TOML file with boosting parameters, overriding TRAIN_* variables
    #[arg(long)]
    params: Option<PathBuf>,

    /// Time-series cross-validation folds (e.g. 5). When > 1, reports OOS mean and std of RMSE.
    #[arg(long, default_value_t = 0)]
    cv_folds: usize,
}

fn load_params(path: &Path) -> Result<BoostingParams> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read params file {:?}", path))?;
    let params: BoostingParams =
        toml::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))?;
    params
        .validate()
        .with_context(|| format!("Invalid boosting parameters in {:?}", path))?;
    Ok(params)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let args = Args::parse();
    let config = Config::from_env()?;

    let input = args.input.unwrap_or(config.model.sales_data_path);
    let output = args.output.unwrap_or(config.model.model_path);
    let mut training_config = config.training.config;
    if let Some(path) = &args.params {
        training_config.params = load_params(path)?;
        info!("Using boosting parameters from {:?}", path);
    }

    let records = sales_csv::load_sales(&input)
        .with_context(|| format!("Failed to load training data from {:?}", input))?;
    let pipeline = TrainingPipeline::new(training_config);

    if args.cv_folds > 1 {
        match pipeline.cross_validate(&records, args.cv_folds)? {
            Some(summary) => reporting::print_cv_summary(&summary),
            None => warn!("CV: No valid folds."),
        }
    }

    let model = pipeline.train(&records).context("Training failed")?;
    model
        .save(&output)
        .with_context(|| format!("Failed to save model to {:?}", output))?;

    reporting::print_training_summary(model.metadata());
    println!("Model saved to {:?}", output);
    Ok(())
}
