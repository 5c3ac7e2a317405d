//! Feature engineering
//!
//! Rolling-window aggregate features over the monthly table: per scale,
//! total rainfall (trailing sum) and average dam level (trailing mean).

use ndarray::Array2;

use super::loader::{MonthlyTable, DAM_LEVEL_COLUMN, RAINFALL_COLUMN};
use super::DataError;

/// Fixed-size ring buffer with an incrementally maintained running sum.
///
/// Pushing is O(1): the value leaving the window is subtracted from the
/// sum instead of rescanning the buffer.
#[derive(Debug, Clone)]
struct RollingWindow {
    values: Vec<f64>,
    cursor: usize,
    sum: f64,
    count: usize,
}

impl RollingWindow {
    fn new(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
            cursor: 0,
            sum: 0.0,
            count: 0,
        }
    }

    fn push(&mut self, value: f64) {
        if self.count == self.values.len() {
            self.sum -= self.values[self.cursor];
        } else {
            self.count += 1;
        }
        self.values[self.cursor] = value;
        self.sum += value;
        self.cursor = (self.cursor + 1) % self.values.len();
    }

    fn is_full(&self) -> bool {
        self.count == self.values.len()
    }

    fn sum(&self) -> f64 {
        self.sum
    }

    fn mean(&self) -> f64 {
        self.sum / self.values.len() as f64
    }
}

/// Rolling-window feature engineering over a monthly table.
///
/// For each configured scale `s`, two columns are appended:
/// `Total_Rainfall_{s}` (sum of rainfall over the trailing `s` rows) and
/// `Avg_Dam_Level_{s}` (mean dam level over the same rows).
///
/// Derived values are defined from row index `max(scales) - 1` onward,
/// the first row where every configured window is completely filled.
/// Earlier rows hold `f64::NAN` as an explicit undefined marker.
pub struct FeatureEngine {
    scales: Vec<usize>,
}

impl FeatureEngine {
    pub fn new(scales: Vec<usize>) -> Self {
        Self { scales }
    }

    /// Configured aggregation scales
    pub fn scales(&self) -> &[usize] {
        &self.scales
    }

    /// Compute the augmented table.
    ///
    /// Pure transform: the input table is left untouched and a new table
    /// with the derived columns appended is returned.
    pub fn engineer(&self, table: &MonthlyTable) -> Result<MonthlyTable, DataError> {
        if self.scales.is_empty() {
            return Err(DataError::InvalidScale("no scales configured".to_string()));
        }
        if let Some(&zero) = self.scales.iter().find(|s| **s == 0) {
            return Err(DataError::InvalidScale(format!("scale must be positive, got {}", zero)));
        }

        let rainfall_idx = table
            .column_index(RAINFALL_COLUMN)
            .ok_or_else(|| DataError::MissingColumn(RAINFALL_COLUMN.to_string()))?;
        let dam_level_idx = table
            .column_index(DAM_LEVEL_COLUMN)
            .ok_or_else(|| DataError::MissingColumn(DAM_LEVEL_COLUMN.to_string()))?;

        let n = table.num_rows();
        let max_scale = *self.scales.iter().max().expect("scales is non-empty");
        if max_scale > n {
            return Err(DataError::InsufficientHistory {
                scale: max_scale,
                rows: n,
            });
        }

        let base_width = table.num_columns();
        let width = base_width + 2 * self.scales.len();
        let mut values = Array2::from_elem((n, width), f64::NAN);

        let mut rainfall_windows: Vec<RollingWindow> =
            self.scales.iter().map(|&s| RollingWindow::new(s)).collect();
        let mut dam_level_windows: Vec<RollingWindow> =
            self.scales.iter().map(|&s| RollingWindow::new(s)).collect();

        for i in 0..n {
            for c in 0..base_width {
                values[[i, c]] = table.values()[[i, c]];
            }

            let rainfall = table.values()[[i, rainfall_idx]];
            let dam_level = table.values()[[i, dam_level_idx]];

            for k in 0..self.scales.len() {
                rainfall_windows[k].push(rainfall);
                dam_level_windows[k].push(dam_level);
            }

            // All windows are full once the largest one is
            if i + 1 >= max_scale {
                for k in 0..self.scales.len() {
                    debug_assert!(rainfall_windows[k].is_full());
                    values[[i, base_width + 2 * k]] = rainfall_windows[k].sum();
                    values[[i, base_width + 2 * k + 1]] = dam_level_windows[k].mean();
                }
            }
        }

        let mut columns = table.columns().to_vec();
        for &scale in &self.scales {
            columns.push(format!("Total_Rainfall_{}", scale));
            columns.push(format!("Avg_Dam_Level_{}", scale));
        }

        MonthlyTable::new(columns, values)
    }

    /// First row index with defined derived columns
    pub fn defined_from(&self) -> usize {
        self.scales.iter().max().map_or(0, |&m| m - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::generate_synthetic;
    use ndarray::Array2;

    fn constant_table(n: usize, rainfall: f64, dam_level: f64) -> MonthlyTable {
        let columns = vec![
            "year".to_string(),
            "month".to_string(),
            "Rainfall".to_string(),
            "Dam_Level".to_string(),
        ];
        let mut values = Array2::zeros((n, 4));
        for i in 0..n {
            values[[i, 0]] = 2000.0 + (i / 12) as f64;
            values[[i, 1]] = (i % 12) as f64 + 1.0;
            values[[i, 2]] = rainfall;
            values[[i, 3]] = dam_level;
        }
        MonthlyTable::new(columns, values).unwrap()
    }

    #[test]
    fn test_constant_table_aggregates() {
        // 60 rows of Rainfall=10, Dam_Level=5 with scales [12, 24, 36]:
        // from row 35 onward Total_Rainfall_s == 10*s and Avg_Dam_Level_s == 5.
        let table = constant_table(60, 10.0, 5.0);
        let engine = FeatureEngine::new(vec![12, 24, 36]);
        let out = engine.engineer(&table).unwrap();

        assert_eq!(engine.defined_from(), 35);

        for (k, &scale) in [12usize, 24, 36].iter().enumerate() {
            let total_idx = out.column_index(&format!("Total_Rainfall_{}", scale)).unwrap();
            let avg_idx = out.column_index(&format!("Avg_Dam_Level_{}", scale)).unwrap();
            assert_eq!(total_idx, 4 + 2 * k);

            for i in 35..60 {
                assert!((out.values()[[i, total_idx]] - 10.0 * scale as f64).abs() < 1e-9);
                assert!((out.values()[[i, avg_idx]] - 5.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_undefined_prefix_is_nan() {
        let table = constant_table(60, 10.0, 5.0);
        let out = FeatureEngine::new(vec![12, 24, 36]).engineer(&table).unwrap();

        for i in 0..35 {
            for c in 4..out.num_columns() {
                assert!(out.values()[[i, c]].is_nan(), "row {} col {} should be undefined", i, c);
            }
        }
    }

    #[test]
    fn test_aggregates_match_brute_force() {
        let table = generate_synthetic(90, 11);
        let scales = vec![6usize, 13, 24];
        let out = FeatureEngine::new(scales.clone()).engineer(&table).unwrap();

        let rainfall = table.column(2);
        let dam_level = table.column(3);
        let max_scale = 24;

        for &s in &scales {
            let total_idx = out.column_index(&format!("Total_Rainfall_{}", s)).unwrap();
            let avg_idx = out.column_index(&format!("Avg_Dam_Level_{}", s)).unwrap();

            for i in (max_scale - 1)..table.num_rows() {
                let total: f64 = (i + 1 - s..=i).map(|j| rainfall[j]).sum();
                let avg: f64 = (i + 1 - s..=i).map(|j| dam_level[j]).sum::<f64>() / s as f64;

                assert!((out.values()[[i, total_idx]] - total).abs() < 1e-9);
                assert!((out.values()[[i, avg_idx]] - avg).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_input_table_untouched() {
        let table = constant_table(40, 3.0, 7.0);
        let before = table.values().clone();
        let _ = FeatureEngine::new(vec![12]).engineer(&table).unwrap();
        assert_eq!(table.values(), &before);
        assert_eq!(table.num_columns(), 4);
    }

    #[test]
    fn test_missing_column() {
        let columns = vec!["year".to_string(), "month".to_string(), "Rainfall".to_string()];
        let table = MonthlyTable::new(columns, Array2::zeros((20, 3))).unwrap();

        let err = FeatureEngine::new(vec![12]).engineer(&table).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(name) if name == "Dam_Level"));
    }

    #[test]
    fn test_scale_exceeds_history() {
        let table = constant_table(10, 1.0, 1.0);
        let err = FeatureEngine::new(vec![12]).engineer(&table).unwrap_err();
        assert!(matches!(err, DataError::InsufficientHistory { scale: 12, rows: 10 }));
    }

    #[test]
    fn test_zero_scale_rejected() {
        let table = constant_table(10, 1.0, 1.0);
        let err = FeatureEngine::new(vec![0]).engineer(&table).unwrap_err();
        assert!(matches!(err, DataError::InvalidScale(_)));
    }

    #[test]
    fn test_rolling_window_evicts() {
        let mut w = RollingWindow::new(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            w.push(v);
        }
        assert!(w.is_full());
        assert!((w.sum() - 9.0).abs() < 1e-12);
        assert!((w.mean() - 3.0).abs() < 1e-12);
    }
}
