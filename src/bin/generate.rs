//! Synthetic Sales Generator
//!
//! Writes a seeded daily sales history suitable for bootstrapping a first demand model.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use rustprice::infrastructure::sales_csv;
use rustprice::infrastructure::synthetic::SyntheticSalesGenerator;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate synthetic sales history", long_about = None)]
struct Args {
    /// Path to output CSV
    #[arg(long, default_value = "data/sales.csv")]
    output: PathBuf,

    /// Number of consecutive days to generate
    #[arg(long, default_value_t = 730)]
    days: usize,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// First day (YYYY-MM-DD)
    #[arg(long, default_value = "2022-01-01")]
    start: String,
}

fn main() -> Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let args = Args::parse();
    let start = NaiveDate::parse_from_str(&args.start, "%Y-%m-%d")
        .with_context(|| format!("Invalid --start date: {}", args.start))?;

    let generator = SyntheticSalesGenerator {
        start,
        days: args.days,
        seed: args.seed,
        ..Default::default()
    };
    let records = generator
        .generate()
        .context("Failed to generate synthetic sales")?;
    sales_csv::save_sales(&args.output, &records)
        .with_context(|| format!("Failed to write {:?}", args.output))?;

    info!(
        "Generated {} days of sales from {} (seed {})",
        records.len(),
        start,
        args.seed
    );
    Ok(())
}
