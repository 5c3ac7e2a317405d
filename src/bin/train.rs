//! Train the multi-scale dam level model
//!
//! Usage:
//!   cargo run --bin train -- --data data/dam_levels.csv --epochs 200
//!   cargo run --bin train -- --synthetic-months 240 --seed 42

use anyhow::{Context, Result};
use burn::backend::{Autodiff, NdArray};
use clap::Parser;
use dam_forecast::data::{generate_synthetic, load_csv, DamDataset};
use dam_forecast::model::{ModelConfig, MultiScaleModel};
use dam_forecast::training::{train_model, TrainingConfig};
use dam_forecast::defaults;

type Backend = Autodiff<NdArray>;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the monthly CSV table (year,month,Rainfall,Dam_Level,...)
    #[arg(short, long)]
    data: Option<String>,

    /// Generate a synthetic table with this many months instead
    #[arg(long, default_value_t = 240)]
    synthetic_months: usize,

    /// Trailing window lengths (months) sampled as model input
    #[arg(long, value_delimiter = ',', default_values_t = defaults::INPUT_SCALES)]
    scales: Vec<usize>,

    /// Trailing window lengths (months) for derived rolling features
    #[arg(long, value_delimiter = ',', default_values_t = defaults::FEATURE_SCALES)]
    feature_scales: Vec<usize>,

    /// Hidden layer dimension
    #[arg(long, default_value_t = defaults::HIDDEN_SIZE)]
    hidden_size: usize,

    /// Number of transformer blocks per branch
    #[arg(long, default_value_t = defaults::NUM_LAYERS)]
    num_layers: usize,

    /// Number of attention heads
    #[arg(long, default_value_t = defaults::NUM_HEADS)]
    num_heads: usize,

    /// Dropout rate
    #[arg(long, default_value_t = defaults::DROPOUT)]
    dropout: f64,

    /// Number of training epochs
    #[arg(short, long, default_value_t = defaults::EPOCHS)]
    epochs: usize,

    /// Batch size
    #[arg(short, long, default_value_t = defaults::BATCH_SIZE)]
    batch_size: usize,

    /// Learning rate
    #[arg(short = 'r', long, default_value_t = defaults::LEARNING_RATE)]
    learning_rate: f64,

    /// Shuffle seed (runs are only reproducible when set)
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let table = match &args.data {
        Some(path) => load_csv(path).with_context(|| format!("failed to load {}", path))?,
        None => generate_synthetic(args.synthetic_months, args.seed.unwrap_or(42)),
    };
    println!(
        "Loaded {} months, {} columns",
        table.num_rows(),
        table.num_columns()
    );

    let dataset = DamDataset::new(&table, &args.scales, &args.feature_scales)
        .context("failed to build dataset")?;
    println!(
        "Dataset: {} samples, feature width {}, scales {:?}",
        dataset.len(),
        dataset.feature_width(),
        dataset.input_scales()
    );

    let device = Default::default();
    let model_config = ModelConfig {
        input_size: dataset.feature_width(),
        hidden_size: args.hidden_size,
        num_layers: args.num_layers,
        num_heads: args.num_heads,
        ff_size: args.hidden_size * 4,
        dropout: args.dropout,
        output_size: defaults::OUTPUT_SIZE,
        num_scales: dataset.num_scales(),
    };
    model_config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid model configuration: {}", e))?;

    let model = MultiScaleModel::<Backend>::new(&device, &model_config);

    let training_config = TrainingConfig {
        epochs: args.epochs,
        batch_size: args.batch_size,
        learning_rate: args.learning_rate,
        seed: args.seed,
    };

    let (_model, result) = train_model(model, &dataset, &training_config, &device);

    println!(
        "Done: {} epochs, final rolling loss {:.6}",
        result.epoch_losses.len(),
        result.final_rolling_loss
    );

    Ok(())
}
