//! Multi-scale windowed dataset
//!
//! Wraps the engineered monthly table and produces, per configured input
//! scale, a trailing window of normalized feature rows plus the dam level
//! at the window's end as the training label.

use burn::data::dataloader::batcher::Batcher;
use burn::prelude::*;
use ndarray::{s, Array2};

use super::features::FeatureEngine;
use super::loader::{MonthlyTable, DAM_LEVEL_COLUMN};
use super::DataError;

/// Columns excluded from normalization (time identifiers)
const TIME_COLUMNS: usize = 2;

/// Mean / standard deviation of one normalized column
#[derive(Debug, Clone, Copy)]
pub struct ColumnStats {
    pub mean: f64,
    pub std: f64,
}

/// A single training sample: one trailing window per input scale plus
/// the normalized dam level at the window's end.
#[derive(Debug, Clone)]
pub struct DamSample {
    /// One `[scale, feature_width]` window per input scale
    pub windows: Vec<Array2<f64>>,
    /// Normalized dam level at the sample index
    pub target: f64,
}

/// Windowed multi-scale dataset over an engineered, normalized table.
///
/// Construction engineers the rolling features, drops the leading rows
/// where derived columns are undefined, normalizes every column except
/// the two time identifiers (statistics fixed once, over the full
/// dataset), and splits the label column out of the feature matrix.
///
/// Sample indices start at `max(input_scales) - 1` within the trimmed
/// table, so every window of scale `s` holds exactly `s` rows; indices
/// with shorter histories are excluded rather than padded.
#[derive(Debug, Clone)]
pub struct DamDataset {
    features: Array2<f64>,
    labels: Vec<f64>,
    input_scales: Vec<usize>,
    offset: usize,
    stats: Vec<ColumnStats>,
}

impl DamDataset {
    /// Build a dataset from a raw monthly table.
    pub fn new(
        table: &MonthlyTable,
        input_scales: &[usize],
        feature_scales: &[usize],
    ) -> Result<Self, DataError> {
        if input_scales.is_empty() {
            return Err(DataError::InvalidScale("no input scales configured".to_string()));
        }
        if let Some(&zero) = input_scales.iter().find(|s| **s == 0) {
            return Err(DataError::InvalidScale(format!("scale must be positive, got {}", zero)));
        }

        let engine = FeatureEngine::new(feature_scales.to_vec());
        let engineered = engine.engineer(table)?;

        // Drop the prefix where derived columns are undefined
        let defined_from = engine.defined_from();
        let mut values = engineered
            .values()
            .slice(s![defined_from.., ..])
            .to_owned();
        let rows = values.nrows();

        let max_scale = *input_scales.iter().max().expect("input_scales is non-empty");
        if max_scale > rows {
            return Err(DataError::InsufficientHistory {
                scale: max_scale,
                rows,
            });
        }

        // Normalize everything except the time identifiers; statistics
        // are computed once here and never recomputed per batch.
        let mut stats = Vec::with_capacity(values.ncols() - TIME_COLUMNS);
        for c in TIME_COLUMNS..values.ncols() {
            let column = values.column(c);
            let mean = column.sum() / rows as f64;
            let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                / (rows as f64 - 1.0).max(1.0);
            let std = var.sqrt();
            // Constant columns are centered only
            let divisor = if std > 1e-8 { std } else { 1.0 };

            for v in values.column_mut(c).iter_mut() {
                *v = (*v - mean) / divisor;
            }
            stats.push(ColumnStats { mean, std });
        }

        // Hold the label column out of the feature matrix
        let label_idx = engineered
            .column_index(DAM_LEVEL_COLUMN)
            .ok_or_else(|| DataError::MissingColumn(DAM_LEVEL_COLUMN.to_string()))?;
        let labels: Vec<f64> = values.column(label_idx).to_vec();

        let width = values.ncols() - 1;
        let mut features = Array2::zeros((rows, width));
        for r in 0..rows {
            let mut w = 0;
            for c in 0..values.ncols() {
                if c == label_idx {
                    continue;
                }
                features[[r, w]] = values[[r, c]];
                w += 1;
            }
        }

        Ok(Self {
            features,
            labels,
            input_scales: input_scales.to_vec(),
            offset: max_scale - 1,
            stats,
        })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.features.nrows() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Width of each window row (label column excluded)
    pub fn feature_width(&self) -> usize {
        self.features.ncols()
    }

    /// Number of input scales (model branches)
    pub fn num_scales(&self) -> usize {
        self.input_scales.len()
    }

    /// Configured input scales
    pub fn input_scales(&self) -> &[usize] {
        &self.input_scales
    }

    /// Normalization statistics, one per normalized column
    pub fn stats(&self) -> &[ColumnStats] {
        &self.stats
    }

    /// Normalized feature matrix (for inspection and tests)
    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    /// Normalized labels, one per table row
    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    /// Get one sample by index.
    ///
    /// For each input scale `s`, slices the trailing `s` feature rows
    /// ending at the sample's table row, inclusive.
    pub fn get(&self, index: usize) -> Option<DamSample> {
        if index >= self.len() {
            return None;
        }
        let end = index + self.offset;

        let windows = self
            .input_scales
            .iter()
            .map(|&scale| {
                self.features
                    .slice(s![end + 1 - scale..=end, ..])
                    .to_owned()
            })
            .collect();

        Some(DamSample {
            windows,
            target: self.labels[end],
        })
    }
}

/// Batch of multi-scale windows: one `[batch, scale, width]` tensor per
/// input scale, targets as `[batch, 1]`.
#[derive(Clone, Debug)]
pub struct DamBatch<B: Backend> {
    pub windows: Vec<Tensor<B, 3>>,
    pub targets: Tensor<B, 2>,
}

/// Batcher stacking samples into per-scale tensors
#[derive(Clone, Debug)]
pub struct DamBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> DamBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<DamSample, DamBatch<B>> for DamBatcher<B> {
    fn batch(&self, items: Vec<DamSample>) -> DamBatch<B> {
        assert!(!items.is_empty(), "cannot batch zero samples");

        let batch_size = items.len();
        let num_scales = items[0].windows.len();

        let windows = (0..num_scales)
            .map(|k| {
                let seq_len = items[0].windows[k].nrows();
                let width = items[0].windows[k].ncols();

                let flat: Vec<f32> = items
                    .iter()
                    .flat_map(|s| s.windows[k].iter().map(|&v| v as f32))
                    .collect();

                Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device)
                    .reshape([batch_size, seq_len, width])
            })
            .collect();

        let targets_flat: Vec<f32> = items.iter().map(|s| s.target as f32).collect();
        let targets =
            Tensor::<B, 1>::from_floats(targets_flat.as_slice(), &self.device)
                .reshape([batch_size, 1]);

        DamBatch { windows, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::generate_synthetic;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_dataset_construction() {
        let table = generate_synthetic(120, 42);
        let dataset = DamDataset::new(&table, &[12, 24, 36], &[6, 12]).unwrap();

        // 120 rows, 11 trimmed for feature history, 35 excluded for the
        // largest input window.
        assert_eq!(dataset.len(), 120 - 11 - 35);
        // 5 raw columns + 4 derived - 1 label
        assert_eq!(dataset.feature_width(), 8);
        assert_eq!(dataset.num_scales(), 3);
    }

    #[test]
    fn test_normalization_stats() {
        let table = generate_synthetic(200, 3);
        let dataset = DamDataset::new(&table, &[12], &[6]).unwrap();

        let rows = dataset.features().nrows();

        // Every normalized feature column has mean ~0 and sample std ~1;
        // the first two (year, month) stay raw.
        for c in 2..dataset.feature_width() {
            let column = dataset.features().column(c);
            let mean = column.sum() / rows as f64;
            let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (rows as f64 - 1.0);

            assert!(mean.abs() < 1e-9, "column {} mean {}", c, mean);
            assert!((var.sqrt() - 1.0).abs() < 1e-9, "column {} std {}", c, var.sqrt());
        }

        let label_mean = dataset.labels().iter().sum::<f64>() / rows as f64;
        assert!(label_mean.abs() < 1e-9);
    }

    #[test]
    fn test_window_lengths_exact() {
        let table = generate_synthetic(150, 5);
        let scales = [12usize, 24, 48];
        let dataset = DamDataset::new(&table, &scales, &[12]).unwrap();

        for idx in [0, 1, dataset.len() / 2, dataset.len() - 1] {
            let sample = dataset.get(idx).unwrap();
            assert_eq!(sample.windows.len(), scales.len());
            for (k, &scale) in scales.iter().enumerate() {
                assert_eq!(sample.windows[k].nrows(), scale);
                assert_eq!(sample.windows[k].ncols(), dataset.feature_width());
            }
        }

        assert!(dataset.get(dataset.len()).is_none());
    }

    #[test]
    fn test_insufficient_history() {
        let table = generate_synthetic(40, 1);
        // 40 rows - 11 trimmed = 29 available, scale 36 cannot fit
        let err = DamDataset::new(&table, &[12, 36], &[12]).unwrap_err();
        assert!(matches!(err, DataError::InsufficientHistory { scale: 36, .. }));
    }

    #[test]
    fn test_rejects_zero_scale() {
        let table = generate_synthetic(60, 1);
        let err = DamDataset::new(&table, &[0, 12], &[6]).unwrap_err();
        assert!(matches!(err, DataError::InvalidScale(_)));
    }

    #[test]
    fn test_batcher_shapes() {
        let table = generate_synthetic(120, 9);
        let scales = [6usize, 12];
        let dataset = DamDataset::new(&table, &scales, &[6]).unwrap();

        let device = Default::default();
        let batcher = DamBatcher::<TestBackend>::new(device);

        let samples: Vec<_> = (0..4).map(|i| dataset.get(i).unwrap()).collect();
        let batch = batcher.batch(samples);

        assert_eq!(batch.windows.len(), 2);
        for (k, &scale) in scales.iter().enumerate() {
            assert_eq!(batch.windows[k].dims(), [4, scale, dataset.feature_width()]);
        }
        assert_eq!(batch.targets.dims(), [4, 1]);
    }
}
