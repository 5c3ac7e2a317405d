//! Sequence encoder
//!
//! Pre-norm transformer blocks over the time dimension of one branch:
//! multi-head self-attention plus a feed-forward network with residual
//! connections. The window's time order is the sequence order; no
//! positional encoding or masking is applied.

use burn::{
    module::Module,
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig, Gelu, LayerNorm, LayerNormConfig, Linear, LinearConfig,
    },
    prelude::*,
};

/// Feed-forward network
#[derive(Module, Debug)]
pub struct FeedForward<B: Backend> {
    linear1: Linear<B>,
    linear2: Linear<B>,
    dropout: Dropout,
    activation: Gelu,
}

impl<B: Backend> FeedForward<B> {
    pub fn new(device: &B::Device, d_model: usize, d_ff: usize, dropout: f64) -> Self {
        Self {
            linear1: LinearConfig::new(d_model, d_ff).init(device),
            linear2: LinearConfig::new(d_ff, d_model).init(device),
            dropout: DropoutConfig::new(dropout).init(),
            activation: Gelu::new(),
        }
    }

    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let x = self.linear1.forward(x);
        let x = self.activation.forward(x);
        let x = self.dropout.forward(x);
        self.linear2.forward(x)
    }
}

/// A single pre-norm transformer block
#[derive(Module, Debug)]
pub struct EncoderLayer<B: Backend> {
    attention: MultiHeadAttention<B>,
    feed_forward: FeedForward<B>,
    norm1: LayerNorm<B>,
    norm2: LayerNorm<B>,
    dropout: Dropout,
}

impl<B: Backend> EncoderLayer<B> {
    pub fn new(
        device: &B::Device,
        d_model: usize,
        n_heads: usize,
        d_ff: usize,
        dropout: f64,
    ) -> Self {
        Self {
            attention: MultiHeadAttentionConfig::new(d_model, n_heads)
                .with_dropout(dropout)
                .init(device),
            feed_forward: FeedForward::new(device, d_model, d_ff, dropout),
            norm1: LayerNormConfig::new(d_model).init(device),
            norm2: LayerNormConfig::new(d_model).init(device),
            dropout: DropoutConfig::new(dropout).init(),
        }
    }

    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        // Pre-LN: Norm -> Attention/FFN -> Residual
        let residual = x.clone();
        let x = self.norm1.forward(x);
        let x = self.attention.forward(MhaInput::self_attn(x)).context;
        let x = self.dropout.forward(x) + residual;

        let residual = x.clone();
        let x = self.norm2.forward(x);
        let x = self.feed_forward.forward(x);
        self.dropout.forward(x) + residual
    }
}

/// Stack of transformer blocks over one branch's window
#[derive(Module, Debug)]
pub struct SequenceEncoder<B: Backend> {
    layers: Vec<EncoderLayer<B>>,
    final_norm: LayerNorm<B>,
}

impl<B: Backend> SequenceEncoder<B> {
    pub fn new(
        device: &B::Device,
        d_model: usize,
        n_heads: usize,
        d_ff: usize,
        n_layers: usize,
        dropout: f64,
    ) -> Self {
        let layers = (0..n_layers)
            .map(|_| EncoderLayer::new(device, d_model, n_heads, d_ff, dropout))
            .collect();

        Self {
            layers,
            final_norm: LayerNormConfig::new(d_model).init(device),
        }
    }

    pub fn forward(&self, mut x: Tensor<B, 3>) -> Tensor<B, 3> {
        for layer in &self.layers {
            x = layer.forward(x);
        }
        self.final_norm.forward(x)
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }
}
