//! Price Recommendation Binary
//!
//! Loads the trained demand model, sweeps the price range for one date and reports the
//! revenue-maximizing price together with the price/revenue curve.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use rustprice::application::pricing::service::PricingService;
use rustprice::config::Config;
use rustprice::domain::pricing::OptimizationRequest;
use rustprice::infrastructure::reporting::RecommendationReporter;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recommend a revenue-maximizing price", long_about = None)]
struct Args {
    /// Date to price (YYYY-MM-DD), defaults to today
    #[arg(short, long)]
    date: Option<String>,

    /// Lowest candidate price (defaults to PRICE_LOW)
    #[arg(long)]
    low: Option<f64>,

    /// Highest candidate price (defaults to PRICE_HIGH)
    #[arg(long)]
    high: Option<f64>,

    /// Number of evenly spaced candidates (defaults to PRICE_POINTS)
    #[arg(long)]
    points: Option<usize>,

    /// Output JSON file for the full recommendation
    #[arg(long)]
    json: Option<String>,

    /// Output CSV file for the price/revenue curve
    #[arg(long)]
    csv: Option<String>,

    /// Number of top price points to display
    #[arg(short, long, default_value = "10")]
    top_n: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
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

    let service = PricingService::load(
        &config.model.model_path,
        config.pricing.range,
        config.pricing.inference_timeout,
    )
    .with_context(|| format!("Failed to load model from {:?}", config.model.model_path))?;

    let date = args
        .date
        .unwrap_or_else(|| Utc::now().date_naive().format("%Y-%m-%d").to_string());
    let mut request = OptimizationRequest::parse(&date)?;
    request.price_low = args.low;
    request.price_high = args.high;
    request.num_points = args.points;

    let range = request.resolve(service.defaults());
    let model = service.current_model();
    let reporter = RecommendationReporter::default();
    reporter.print_header(&date, &range, model.name(), model.version());

    info!("Sweeping {} candidate prices for {}", range.num_points, date);
    let recommendation = service.recommend_with_timeout(request).await?;

    reporter.print_summary(&recommendation);
    reporter.print_curve_table(&recommendation.top_points(args.top_n), args.top_n);

    if let Some(path) = &args.json {
        reporter.export_json(&recommendation, path)?;
    }
    if let Some(path) = &args.csv {
        reporter.export_curve_csv(&recommendation, path)?;
    }
    Ok(())
}
