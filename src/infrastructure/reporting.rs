//! Reporting utilities for price recommendations and training runs.
//!
//! Provides formatted console output plus JSON and CSV export of the price/revenue curve.

use crate::application::ml::demand_model::ModelMetadata;
use crate::application::ml::evaluation::CrossValidationSummary;
use crate::domain::pricing::{PricePoint, PriceRange, PriceRecommendation};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Reporter for recommendation output.
pub struct RecommendationReporter {
    output_dir: String,
}

impl RecommendationReporter {
    /// Creates a new reporter with the given output directory.
    pub fn new(output_dir: &str) -> Self {
        Self {
            output_dir: output_dir.to_string(),
        }
    }

    fn resolve(&self, filename: &str) -> PathBuf {
        if filename.contains('/') || filename.contains('\\') {
            PathBuf::from(filename)
        } else {
            Path::new(&self.output_dir).join(filename)
        }
    }

    fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {:?}", parent))?;
        }
        Ok(())
    }

    /// Prints the header banner for a recommendation run.
    pub fn print_header(&self, date: &str, range: &PriceRange, model: &str, version: &str) {
        println!("{}", "=".repeat(80));
        println!("💡 DYNAMIC PRICE RECOMMENDATION");
        println!("{}", "=".repeat(80));
        println!("Date:         {}", date);
        println!(
            "Sweep:        {:.2} .. {:.2} ({} points)",
            range.low, range.high, range.num_points
        );
        println!("Model:        {} ({})", model, version);
        println!("{}", "=".repeat(80));
    }

    /// Prints the headline numbers.
    pub fn print_summary(&self, rec: &PriceRecommendation) {
        println!(
            "\n🏆 Price Recommendation for {}",
            rec.date.format("%B %d, %Y")
        );
        println!("  Optimal Price:              {:.2}", rec.optimal_price);
        println!("  Predicted Maximum Revenue:  {:.2}", rec.max_revenue);
        if let Some(point) = rec.optimal_point() {
            println!("  Predicted Units Sold:       {:.2}", point.predicted_units);
        }
        if let Some(note) = Self::extrapolation_note(rec) {
            println!("  ⚠️  {}", note);
        }
        println!();
    }

    /// Warning line for recommendations that rely on extrapolated demand.
    pub fn extrapolation_note(rec: &PriceRecommendation) -> Option<String> {
        if rec.optimal_extrapolated {
            Some(format!(
                "The optimum sits on an extrapolated edge: {:.2} lies outside the prices seen in training.",
                rec.optimal_price
            ))
        } else if !rec.within_training_range {
            Some("Part of the sweep lies outside the prices seen in training.".to_string())
        } else {
            None
        }
    }

    /// Prints a formatted table of the best curve points.
    pub fn print_curve_table(&self, points: &[PricePoint], top_n: usize) {
        println!("{}", "=".repeat(60));
        println!("📈 Top {} Price Points by Predicted Revenue", top_n);
        println!("{}", "=".repeat(60));
        println!(
            "{:<4} | {:>12} | {:>14} | {:>16}",
            "#", "Price", "Units", "Revenue"
        );
        println!("{}", "-".repeat(60));
        for (i, p) in points.iter().enumerate() {
            println!(
                "{:<4} | {:>12.2} | {:>14.2} | {:>16.2}",
                i + 1,
                p.price,
                p.predicted_units,
                p.predicted_revenue
            );
        }
        println!("{}\n", "=".repeat(60));
    }

    /// Exports the full recommendation to a JSON file.
    pub fn export_json(&self, rec: &PriceRecommendation, filename: &str) -> Result<PathBuf> {
        let output_path = self.resolve(filename);
        Self::ensure_parent(&output_path)?;

        let json_output = serde_json::to_string_pretty(rec)
            .context("Failed to serialize recommendation to JSON")?;
        std::fs::write(&output_path, json_output)
            .context(format!("Failed to write recommendation to {:?}", output_path))?;

        println!("💾 Recommendation saved to: {}", output_path.display());
        Ok(output_path)
    }

    /// Exports the curve (price, predicted_units, predicted_revenue) to CSV for charting.
    pub fn export_curve_csv(&self, rec: &PriceRecommendation, filename: &str) -> Result<PathBuf> {
        let output_path = self.resolve(filename);
        Self::ensure_parent(&output_path)?;

        let mut wtr = csv::Writer::from_path(&output_path)
            .context(format!("Failed to create {:?}", output_path))?;
        for point in &rec.curve {
            wtr.serialize(point)
                .context("Failed to serialize curve point")?;
        }
        wtr.flush().context("Failed to flush curve CSV")?;

        println!("💾 Curve saved to: {}", output_path.display());
        Ok(output_path)
    }
}

impl Default for RecommendationReporter {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Prints the training summary stored in a model's metadata.
pub fn print_training_summary(meta: &ModelMetadata) {
    println!("\n══════════════════════════════════════════════════════");
    println!("  TRAINING SUMMARY");
    println!("══════════════════════════════════════════════════════");
    println!("  Model id:        {}", meta.model_id);
    println!(
        "  Samples:         {} train / {} held out",
        meta.training_samples, meta.holdout_samples
    );
    println!(
        "  Price range:     {:.2} .. {:.2}",
        meta.price_min, meta.price_max
    );
    println!(
        "  Rounds:          {} trained, {} kept{}",
        meta.fit.rounds_trained,
        meta.fit.best_round,
        if meta.fit.stopped_early {
            " (early stop)"
        } else {
            ""
        }
    );
    match &meta.holdout_metrics {
        Some(m) => println!(
            "  Held-out:        RMSE={:.3}  MAE={:.3}  R²={:.4}",
            m.rmse, m.mae, m.r2
        ),
        None => println!("  Held-out:        (none)"),
    }
    println!("══════════════════════════════════════════════════════\n");
}

pub fn print_cv_summary(summary: &CrossValidationSummary) {
    println!(
        "CV OOS RMSE: mean={:.3}, std={:.3} over {} folds",
        summary.mean_rmse,
        summary.std_rmse,
        summary.fold_rmse.len()
    );
    if summary.is_unstable() {
        println!(
            "WARNING: Model unstable (std > 50% of mean). Consider more data or simpler model."
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn recommendation() -> PriceRecommendation {
        PriceRecommendation {
            date: NaiveDate::from_ymd_opt(2024, 12, 24).unwrap(),
            optimal_price: 60.0,
            max_revenue: 2400.0,
            curve: vec![
                PricePoint::new(50.0, 45.0),
                PricePoint::new(60.0, 40.0),
                PricePoint::new(70.0, 30.0),
            ],
            within_training_range: true,
            optimal_extrapolated: false,
        }
    }

    #[test]
    fn test_extrapolation_note() {
        let mut rec = recommendation();
        assert_eq!(RecommendationReporter::extrapolation_note(&rec), None);

        rec.within_training_range = false;
        let note = RecommendationReporter::extrapolation_note(&rec).unwrap();
        assert!(note.starts_with("Part of the sweep"));

        rec.optimal_extrapolated = true;
        let note = RecommendationReporter::extrapolation_note(&rec).unwrap();
        assert!(note.contains("extrapolated edge"));
        assert!(note.contains("60.00"));
    }

    #[test]
    fn test_export_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = RecommendationReporter::new(dir.path().to_str().unwrap());

        let path = reporter.export_json(&recommendation(), "rec.json").unwrap();
        let restored: PriceRecommendation =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(restored, recommendation());
    }

    #[test]
    fn test_export_curve_csv() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = RecommendationReporter::new(dir.path().to_str().unwrap());

        let path = reporter
            .export_curve_csv(&recommendation(), "curve.csv")
            .unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        let mut lines = content.lines();

        assert_eq!(
            lines.next(),
            Some("price,predicted_units,predicted_revenue")
        );
        assert_eq!(lines.count(), 3);
    }
}
