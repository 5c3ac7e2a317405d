//! Data loading utilities
//!
//! Monthly table representation, CSV loading and synthetic data
//! generation for tests and demos.

use std::path::Path;

use ndarray::{Array2, ArrayView1};
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::DataError;

/// Rainfall column name expected in the input table
pub const RAINFALL_COLUMN: &str = "Rainfall";

/// Dam level column name; doubles as the training label
pub const DAM_LEVEL_COLUMN: &str = "Dam_Level";

/// A monthly observation table with named numeric columns.
///
/// One row per calendar month, ordered chronologically by row position.
/// The first two columns are time identifiers (`year`, `month`) and are
/// excluded from normalization downstream.
#[derive(Debug, Clone)]
pub struct MonthlyTable {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl MonthlyTable {
    /// Create a table from column names and a values matrix
    pub fn new(columns: Vec<String>, values: Array2<f64>) -> Result<Self, DataError> {
        if columns.len() != values.ncols() {
            return Err(DataError::Malformed {
                row: 0,
                message: format!(
                    "{} column names for {} value columns",
                    columns.len(),
                    values.ncols()
                ),
            });
        }
        Ok(Self { columns, values })
    }

    /// Column names, in table order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// View of a single column
    pub fn column(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.column(index)
    }

    /// Underlying values matrix [rows, columns]
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn num_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_columns(&self) -> usize {
        self.values.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }
}

/// Load a monthly table from a CSV file.
///
/// Expected format: a header row naming the columns (`year`, `month`,
/// `Rainfall`, `Dam_Level`, plus any additional numeric covariates),
/// followed by one numeric row per month in chronological order.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<MonthlyTable, DataError> {
    let content = std::fs::read_to_string(&path)?;
    let mut lines = content.lines().enumerate();

    let columns: Vec<String> = match lines.next() {
        Some((_, header)) => header.split(',').map(|c| c.trim().to_string()).collect(),
        None => {
            return Err(DataError::Malformed {
                row: 0,
                message: "empty file".to_string(),
            })
        }
    };

    let width = columns.len();
    let mut rows: Vec<f64> = Vec::new();
    let mut num_rows = 0;

    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() != width {
            return Err(DataError::Malformed {
                row: idx,
                message: format!("expected {} fields, got {}", width, parts.len()),
            });
        }

        for part in parts {
            let value: f64 = part.trim().parse().map_err(|e| DataError::Malformed {
                row: idx,
                message: format!("invalid number `{}`: {}", part.trim(), e),
            })?;
            rows.push(value);
        }
        num_rows += 1;
    }

    let values =
        Array2::from_shape_vec((num_rows, width), rows).map_err(|e| DataError::Malformed {
            row: num_rows,
            message: e.to_string(),
        })?;

    MonthlyTable::new(columns, values)
}

/// Generate a synthetic monthly reservoir table for tests and demos.
///
/// Rainfall follows a seasonal cycle with noise; the dam level integrates
/// rainfall with a slow decay, so the series carry a learnable signal.
pub fn generate_synthetic(n_months: usize, seed: u64) -> MonthlyTable {
    let mut rng = StdRng::seed_from_u64(seed);

    let columns = vec![
        "year".to_string(),
        "month".to_string(),
        RAINFALL_COLUMN.to_string(),
        DAM_LEVEL_COLUMN.to_string(),
        "Inflow".to_string(),
    ];

    let mut values = Array2::zeros((n_months, columns.len()));
    let mut level = 55.0;

    for i in 0..n_months {
        let year = 2000 + (i / 12) as i32;
        let month = (i % 12) as f64 + 1.0;

        // Seasonal rainfall, wetter mid-year
        let season = ((month - 1.0) / 12.0 * std::f64::consts::TAU).sin();
        let rainfall = (80.0 + 50.0 * season + rng.gen_range(-25.0..25.0)).max(0.0);

        let inflow = rainfall * rng.gen_range(0.4..0.7);
        level = (level * 0.97 + inflow * 0.05 + rng.gen_range(-1.0..1.0)).clamp(5.0, 100.0);

        values[[i, 0]] = year as f64;
        values[[i, 1]] = month;
        values[[i, 2]] = rainfall;
        values[[i, 3]] = level;
        values[[i, 4]] = inflow;
    }

    MonthlyTable::new(columns, values).expect("synthetic table is well-formed")
}
