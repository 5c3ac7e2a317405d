//! Data loading and preprocessing
//!
//! Monthly reservoir tables, rolling-window feature engineering and the
//! multi-scale windowed dataset consumed by the model.

pub mod dataset;
pub mod features;
pub mod loader;

pub use dataset::{DamBatch, DamBatcher, DamDataset, DamSample};
pub use features::FeatureEngine;
pub use loader::{generate_synthetic, load_csv, MonthlyTable};

/// Errors produced while loading or preparing data
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("column `{0}` not found in table")]
    MissingColumn(String),

    #[error("scale {scale} exceeds available history ({rows} rows)")]
    InsufficientHistory { scale: usize, rows: usize },

    #[error("invalid scale: {0}")]
    InvalidScale(String),

    #[error("malformed row {row}: {message}")]
    Malformed { row: usize, message: String },
}
