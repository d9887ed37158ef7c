//! Discriminator network
//!
//! The Discriminator assesses whether an image is a real MNIST digit or a
//! generated one.

use tch::{nn, nn::Module, nn::ModuleT, Tensor};

use super::leaky_relu;
use super::trainable::TrainableModel;

/// Discriminator network configuration
#[derive(Debug, Clone)]
pub struct DiscriminatorConfig {
    /// Number of feature maps in both convolutions
    pub base_filters: i64,
    /// Dropout rate
    pub dropout: f64,
    /// Negative slope of the LeakyReLU activations
    pub negative_slope: f64,
}

impl Default for DiscriminatorConfig {
    fn default() -> Self {
        Self {
            base_filters: 64,
            dropout: 0.4,
            negative_slope: 0.2,
        }
    }
}

/// Spatial size after two unpadded 3x3 stride-2 convolutions (28 -> 13 -> 6)
const FEATURE_SIZE: i64 = 6;

/// Discriminator network
///
/// Architecture:
/// 1. Two stride-2 Conv2d layers with LeakyReLU and Dropout
/// 2. Flatten, Dense layer to a single logit, Sigmoid
#[derive(Debug)]
pub struct Discriminator {
    config: DiscriminatorConfig,
    conv1: nn::Conv2D,
    conv2: nn::Conv2D,
    fc: nn::Linear,
}

impl Discriminator {
    /// Create a new Discriminator network
    pub fn new(vs: &nn::Path, config: DiscriminatorConfig) -> Self {
        let base = config.base_filters;

        let conv_config = nn::ConvConfig {
            stride: 2,
            ..Default::default()
        };

        let conv1 = nn::conv2d(vs / "conv1", 1, base, 3, conv_config);
        let conv2 = nn::conv2d(vs / "conv2", base, base, 3, conv_config);

        let flat_size = base * FEATURE_SIZE * FEATURE_SIZE;
        let fc = nn::linear(vs / "fc", flat_size, 1, Default::default());

        Self {
            config,
            conv1,
            conv2,
            fc,
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    ///
    /// * `images` - Tensor of shape (batch_size, 1, 28, 28)
    /// * `train` - Whether in training mode (affects dropout)
    ///
    /// # Returns
    ///
    /// Tensor of shape (batch_size, 1) with probabilities of being real
    pub fn forward_t(&self, images: &Tensor, train: bool) -> Tensor {
        let slope = self.config.negative_slope;
        let dropout = self.config.dropout;

        let x = self.conv1.forward(images);
        let x = leaky_relu(&x, slope).dropout(dropout, train);

        let x = self.conv2.forward(&x);
        let x = leaky_relu(&x, slope).dropout(dropout, train);

        let x = x.flatten(1, -1);
        self.fc.forward(&x).sigmoid()
    }

    /// Classify images (inference mode, no gradients)
    pub fn classify(&self, images: &Tensor) -> Tensor {
        self.predict(images, false)
    }

    /// Get configuration
    pub fn config(&self) -> &DiscriminatorConfig {
        &self.config
    }
}

impl ModuleT for Discriminator {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        Discriminator::forward_t(self, xs, train)
    }
}

impl TrainableModel for Discriminator {}
