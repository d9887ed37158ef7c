//! Generator network
//!
//! The Generator upsamples a latent seed into a 28x28 grayscale digit.

use tch::{nn, nn::Module, nn::ModuleT, Tensor};

use super::leaky_relu;
use super::trainable::TrainableModel;

/// Generator network configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Size of the latent vector
    pub latent_dim: i64,
    /// Number of feature maps in the hidden layers
    pub base_filters: i64,
    /// Negative slope of the LeakyReLU activations
    pub negative_slope: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            latent_dim: 100,
            base_filters: 128,
            negative_slope: 0.2,
        }
    }
}

/// Side length of the feature map produced by the dense projection
const SEED_SIZE: i64 = 7;

/// Generator network
///
/// Architecture:
/// 1. Dense projection of the latent vector to a 7x7 feature volume
/// 2. Two stride-2 ConvTranspose2d stages (7 -> 16 -> 34), each with
///    BatchNorm and LeakyReLU
/// 3. A 7x7 Conv2d down to one channel (34 -> 28) with Tanh
#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    fc: nn::Linear,
    bn0: nn::BatchNorm,
    up1: nn::ConvTranspose2D,
    bn1: nn::BatchNorm,
    up2: nn::ConvTranspose2D,
    bn2: nn::BatchNorm,
    conv: nn::Conv2D,
}

impl Generator {
    /// Create a new Generator network
    pub fn new(vs: &nn::Path, config: GeneratorConfig) -> Self {
        let base = config.base_filters;
        let seed_volume = base * SEED_SIZE * SEED_SIZE;

        let fc = nn::linear(vs / "fc", config.latent_dim, seed_volume, Default::default());
        let bn0 = nn::batch_norm1d(vs / "bn0", seed_volume, Default::default());

        let up_config = nn::ConvTransposeConfig {
            stride: 2,
            ..Default::default()
        };

        let up1 = nn::conv_transpose2d(vs / "up1", base, base, 4, up_config);
        let bn1 = nn::batch_norm2d(vs / "bn1", base, Default::default());

        let up2 = nn::conv_transpose2d(vs / "up2", base, base, 4, up_config);
        let bn2 = nn::batch_norm2d(vs / "bn2", base, Default::default());

        let conv = nn::conv2d(vs / "conv", base, 1, 7, Default::default());

        Self {
            config,
            fc,
            bn0,
            up1,
            bn1,
            up2,
            bn2,
            conv,
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    ///
    /// * `latent` - Tensor of shape (batch_size, latent_dim)
    /// * `train` - Whether in training mode (affects batch norm)
    ///
    /// # Returns
    ///
    /// Tensor of shape (batch_size, 1, 28, 28) with values in [-1, 1]
    pub fn forward_t(&self, latent: &Tensor, train: bool) -> Tensor {
        let slope = self.config.negative_slope;

        let x = self.fc.forward(latent);
        let x = self.bn0.forward_t(&x, train);
        let x = leaky_relu(&x, slope);

        let x = x.view([-1, self.config.base_filters, SEED_SIZE, SEED_SIZE]);

        let x = self.up1.forward(&x);
        let x = self.bn1.forward_t(&x, train);
        let x = leaky_relu(&x, slope);

        let x = self.up2.forward(&x);
        let x = self.bn2.forward_t(&x, train);
        let x = leaky_relu(&x, slope);

        self.conv.forward(&x).tanh()
    }

    /// Generate images without tracking gradients (evaluation mode)
    pub fn generate(&self, latent: &Tensor) -> Tensor {
        self.predict(latent, false)
    }

    /// Get configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

impl ModuleT for Generator {
    fn forward_t(&self, xs: &Tensor, train: bool) -> Tensor {
        Generator::forward_t(self, xs, train)
    }
}

impl TrainableModel for Generator {}
