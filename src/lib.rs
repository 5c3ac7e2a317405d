//! Dam Forecast
//!
//! Multi-scale transformer forecasting of reservoir water levels from
//! historical monthly rainfall and level measurements.
//!
//! # Pipeline
//!
//! - **data**: monthly table loading, rolling-window feature engineering,
//!   normalized multi-scale windowed dataset
//! - **model**: per-scale encoder + transformer branches fused into a
//!   single level prediction
//! - **training**: fixed-epoch MSE fit loop with a trailing 12-epoch
//!   rolling loss report
//!
//! # Example
//!
//! ```no_run
//! use burn::backend::{Autodiff, NdArray};
//! use dam_forecast::data::{generate_synthetic, DamDataset};
//! use dam_forecast::model::{ModelConfig, MultiScaleModel};
//! use dam_forecast::training::{train_model, TrainingConfig};
//!
//! type Backend = Autodiff<NdArray>;
//!
//! let table = generate_synthetic(240, 42);
//! let dataset = DamDataset::new(&table, &[12, 24, 36, 48], &[12, 24, 36]).unwrap();
//!
//! let device = Default::default();
//! let config = ModelConfig {
//!     input_size: dataset.feature_width(),
//!     num_scales: dataset.num_scales(),
//!     ..Default::default()
//! };
//! let model = MultiScaleModel::<Backend>::new(&device, &config);
//!
//! let (_model, result) = train_model(model, &dataset, &TrainingConfig::default(), &device);
//! println!("final loss: {}", result.epoch_losses.last().unwrap());
//! ```

pub mod data;
pub mod model;
pub mod training;

// Re-export main types for convenience
pub use data::{
    generate_synthetic, DamBatcher, DamDataset, DamSample, DataError, FeatureEngine, MonthlyTable,
};
pub use model::{ModelConfig, MultiScaleModel, SequenceEncoder};
pub use training::{train_model, LossWindow, TrainingConfig, TrainingResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default hyperparameters
pub mod defaults {
    /// Trailing window lengths (months) sampled as model input
    pub const INPUT_SCALES: [usize; 4] = [12, 24, 36, 48];

    /// Trailing window lengths (months) used for derived rolling features
    pub const FEATURE_SCALES: [usize; 3] = [12, 24, 36];

    /// Hidden layer dimension
    pub const HIDDEN_SIZE: usize = 32;

    /// Number of transformer blocks per branch
    pub const NUM_LAYERS: usize = 2;

    /// Number of attention heads
    pub const NUM_HEADS: usize = 4;

    /// Output dimension
    pub const OUTPUT_SIZE: usize = 1;

    /// Dropout rate
    pub const DROPOUT: f64 = 0.1;

    /// Learning rate
    pub const LEARNING_RATE: f64 = 0.001;

    /// Number of epochs
    pub const EPOCHS: usize = 1000;

    /// Batch size
    pub const BATCH_SIZE: usize = 64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_consistent() {
        assert_eq!(defaults::HIDDEN_SIZE % defaults::NUM_HEADS, 0);
        assert!(defaults::FEATURE_SCALES.iter().all(|s| *s > 0));
        assert!(defaults::INPUT_SCALES.windows(2).all(|w| w[0] < w[1]));
    }
}
