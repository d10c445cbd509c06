use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the pricing engine: model lifecycle, training and per-request validation.
#[derive(Debug, Error)]
pub enum PricingError {
    #[error(
        "Demand model not found at {path:?}. Run the `train` binary first to produce a model artifact."
    )]
    ModelNotFound { path: PathBuf },

    #[error("Feature schema mismatch: expected {expected}, found {found}")]
    Schema { expected: String, found: String },

    #[error("Insufficient training data: {reason}")]
    InsufficientData { reason: String },

    #[error("Invalid price range: {reason}")]
    InvalidRange { reason: String },

    #[error("Invalid price {price}: must be a finite value greater than zero")]
    InvalidPrice { price: f64 },

    #[error("Invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("Inference timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    #[error("Model artifact at {path:?} is unreadable: {reason}")]
    Artifact { path: PathBuf, reason: String },

    #[error("Inference task failed: {reason}")]
    Inference { reason: String },

    #[error("Training failed: {reason}")]
    Training { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PricingError {
    /// Whether the error only affects the current request and leaves shared state usable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PricingError::InvalidRange { .. }
                | PricingError::InvalidPrice { .. }
                | PricingError::InvalidDate { .. }
                | PricingError::Timeout { .. }
        )
    }
}

pub type PricingResult<T> = Result<T, PricingError>;
