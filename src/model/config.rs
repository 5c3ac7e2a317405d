//! Model configuration

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Hyperparameters of the multi-scale model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Width of each window row (raw feature width)
    pub input_size: usize,
    /// Hidden dimension of every branch
    pub hidden_size: usize,
    /// Number of transformer blocks per branch
    pub num_layers: usize,
    /// Number of attention heads
    pub num_heads: usize,
    /// Feed-forward dimension inside each block
    pub ff_size: usize,
    /// Dropout probability
    pub dropout: f64,
    /// Output dimension (1 for level regression)
    pub output_size: usize,
    /// Number of branches (one per input scale)
    pub num_scales: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            input_size: 6,
            hidden_size: defaults::HIDDEN_SIZE,
            num_layers: defaults::NUM_LAYERS,
            num_heads: defaults::NUM_HEADS,
            ff_size: defaults::HIDDEN_SIZE * 4,
            dropout: defaults::DROPOUT,
            output_size: defaults::OUTPUT_SIZE,
            num_scales: defaults::INPUT_SCALES.len(),
        }
    }
}

impl ModelConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.hidden_size % self.num_heads != 0 {
            return Err(format!(
                "hidden_size ({}) must be divisible by num_heads ({})",
                self.hidden_size, self.num_heads
            ));
        }
        if self.input_size == 0
            || self.hidden_size == 0
            || self.num_layers == 0
            || self.output_size == 0
        {
            return Err("model dimensions must be positive".to_string());
        }
        if self.num_scales == 0 {
            return Err("num_scales must be positive".to_string());
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(format!("dropout must be in [0, 1), got {}", self.dropout));
        }
        Ok(())
    }

    /// Width of the fused branch representation fed to the decoder
    pub fn fused_size(&self) -> usize {
        self.hidden_size * self.num_scales
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(ModelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_heads() {
        let config = ModelConfig {
            hidden_size: 30,
            num_heads: 4,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fused_size() {
        let config = ModelConfig {
            hidden_size: 16,
            num_heads: 4,
            num_scales: 3,
            ..Default::default()
        };
        assert_eq!(config.fused_size(), 48);
    }
}
