//! Multi-scale sequence model
//!
//! Per-scale linear encoders and transformer branches fused by a shared
//! linear decoder into a single level prediction.

pub mod config;
pub mod encoder;
pub mod multiscale;

pub use config::ModelConfig;
pub use encoder::{EncoderLayer, FeedForward, SequenceEncoder};
pub use multiscale::MultiScaleModel;
