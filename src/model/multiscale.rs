//! Multi-scale model
//!
//! One branch per input scale: a linear encoder projecting raw feature
//! rows to the hidden width followed by a transformer over the time
//! dimension. Branch outputs are fused by concatenation and decoded to a
//! single predicted level.

use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    prelude::*,
};

use super::config::ModelConfig;
use super::encoder::SequenceEncoder;

/// Multi-scale sequence-to-one predictor
#[derive(Module, Debug)]
pub struct MultiScaleModel<B: Backend> {
    /// Per-scale linear projections, raw width -> hidden width
    encoders: Vec<Linear<B>>,
    /// Per-scale sequence transformers
    transformers: Vec<SequenceEncoder<B>>,
    /// Shared decoder, hidden * num_scales -> output width
    decoder: Linear<B>,
}

impl<B: Backend> MultiScaleModel<B> {
    /// Create a new model from configuration
    pub fn new(device: &B::Device, config: &ModelConfig) -> Self {
        config.validate().expect("invalid model configuration");

        let encoders = (0..config.num_scales)
            .map(|_| LinearConfig::new(config.input_size, config.hidden_size).init(device))
            .collect();

        let transformers = (0..config.num_scales)
            .map(|_| {
                SequenceEncoder::new(
                    device,
                    config.hidden_size,
                    config.num_heads,
                    config.ff_size,
                    config.num_layers,
                    config.dropout,
                )
            })
            .collect();

        let decoder = LinearConfig::new(config.fused_size(), config.output_size).init(device);

        Self {
            encoders,
            transformers,
            decoder,
        }
    }

    /// Number of branches
    pub fn num_scales(&self) -> usize {
        self.transformers.len()
    }

    /// Forward pass.
    ///
    /// # Arguments
    /// * `windows` - One `[batch, scale, input_size]` tensor per branch
    ///
    /// # Returns
    /// * Predictions of shape `[batch, output_size]`
    pub fn forward(&self, windows: &[Tensor<B, 3>]) -> Tensor<B, 2> {
        assert_eq!(
            windows.len(),
            self.num_scales(),
            "expected {} scale windows, got {}",
            self.num_scales(),
            windows.len()
        );

        let outs: Vec<Tensor<B, 2>> = windows
            .iter()
            .zip(self.encoders.iter().zip(self.transformers.iter()))
            .map(|(window, (encoder, transformer))| {
                let encoded = encoder.forward(window.clone());
                let transformed = transformer.forward(encoded);

                // Branch representation: the final timestep's hidden state
                let [batch_size, seq_len, hidden] = transformed.dims();
                transformed
                    .slice([0..batch_size, (seq_len - 1)..seq_len, 0..hidden])
                    .reshape([batch_size, hidden])
            })
            .collect();

        let fused = Tensor::cat(outs, 1);
        self.decoder.forward(fused)
    }
}
