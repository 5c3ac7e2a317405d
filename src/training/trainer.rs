//! Training loop
//!
//! Fixed-epoch mean-squared-error fit with Adam updates and a trailing
//! 12-epoch rolling loss report.

use burn::{
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::{backend::AutodiffBackend, ElementConversion},
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::{debug, info, warn};

use super::TrainingConfig;
use crate::data::{DamBatcher, DamDataset, DamSample};
use crate::model::MultiScaleModel;

use burn::data::dataloader::batcher::Batcher;

/// Trailing ring buffer of per-epoch losses, indexed by `epoch % 12`.
///
/// The reported average always divides by all 12 slots; slots not yet
/// written stay zero, so early-epoch averages are biased downward. That
/// bias is part of the reporting contract.
#[derive(Debug, Clone, Default)]
pub struct LossWindow {
    slots: [f32; 12],
}

impl LossWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a loss into the slot for the given epoch
    pub fn record(&mut self, epoch: usize, loss: f32) {
        self.slots[epoch % 12] = loss;
    }

    /// Average over all 12 slots, zero-filled or not
    pub fn average(&self) -> f32 {
        self.slots.iter().sum::<f32>() / self.slots.len() as f32
    }
}

/// Results of a training run
#[derive(Debug, Clone)]
pub struct TrainingResult {
    /// Mean batch loss per epoch
    pub epoch_losses: Vec<f32>,
    /// Rolling 12-epoch average after the final batch
    pub final_rolling_loss: f32,
}

/// Train the model for a fixed number of epochs.
///
/// Per epoch the sample order is reshuffled (seeded when the config
/// carries a seed); per batch the loop computes the MSE loss, records it
/// into the rolling window, prints `Epoch: <n>, Loss: <rolling average>`
/// and applies one Adam step. Errors during the forward/backward pass
/// are not caught; NaN losses are logged but not guarded.
pub fn train_model<B: AutodiffBackend>(
    model: MultiScaleModel<B>,
    dataset: &DamDataset,
    config: &TrainingConfig,
    device: &B::Device,
) -> (MultiScaleModel<B>, TrainingResult) {
    config.validate().expect("invalid training configuration");

    info!(
        "starting training: {} epochs, {} samples, batch size {}",
        config.epochs,
        dataset.len(),
        config.batch_size
    );

    let mut model = model;
    let mut optimizer = AdamConfig::new().init();
    let batcher = DamBatcher::<B>::new(device.clone());

    let mut loss_window = LossWindow::new();
    let mut epoch_losses = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        let mut indices: Vec<usize> = (0..dataset.len()).collect();
        match config.seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(epoch as u64));
                indices.shuffle(&mut rng);
            }
            None => indices.shuffle(&mut rand::thread_rng()),
        }

        let mut epoch_loss = 0.0;
        let mut batch_count = 0;

        for chunk in indices.chunks(config.batch_size) {
            let samples: Vec<DamSample> = chunk
                .iter()
                .map(|&i| dataset.get(i).expect("index within dataset range"))
                .collect();
            let batch = batcher.batch(samples);

            let predictions = model.forward(&batch.windows);
            let loss = (predictions - batch.targets).powf_scalar(2.0).mean();
            let loss_value = loss.clone().into_scalar().elem::<f32>();

            if !loss_value.is_finite() {
                warn!("non-finite loss at epoch {}", epoch);
            }

            loss_window.record(epoch, loss_value);
            println!("Epoch: {}, Loss: {}", epoch, loss_window.average());

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optimizer.step(config.learning_rate, model, grads);

            epoch_loss += loss_value;
            batch_count += 1;
        }

        let mean_loss = epoch_loss / batch_count.max(1) as f32;
        epoch_losses.push(mean_loss);
        debug!("epoch {} mean batch loss {:.6}", epoch, mean_loss);
    }

    let result = TrainingResult {
        final_rolling_loss: loss_window.average(),
        epoch_losses,
    };

    info!(
        "training complete, final rolling loss {:.6}",
        result.final_rolling_loss
    );

    (model, result)
}
