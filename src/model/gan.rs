//! GAN wrapper combining Generator and Discriminator
//!
//! Each network keeps its own variable store so that an optimizer built on
//! one of them can never update the other.

use anyhow::Result;
use tch::{nn, nn::OptimizerConfig, nn::VarStore, Device, Tensor};

use super::discriminator::{Discriminator, DiscriminatorConfig};
use super::generator::{Generator, GeneratorConfig};
use crate::data::generate_latent_points;

/// Adam hyperparameters shared by both optimizers
#[derive(Debug, Clone, Copy)]
pub struct AdamConfig {
    pub lr: f64,
    pub beta1: f64,
    pub beta2: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            lr: 2e-4,
            beta1: 0.5,
            beta2: 0.999,
        }
    }
}

impl AdamConfig {
    fn build(&self, vs: &VarStore) -> Result<nn::Optimizer> {
        let optimizer = nn::Adam::default()
            .beta1(self.beta1)
            .beta2(self.beta2)
            .build(vs, self.lr)?;
        Ok(optimizer)
    }
}

/// Complete GAN model
pub struct MnistGan {
    /// Generator network
    pub generator: Generator,
    /// Discriminator network
    pub discriminator: Discriminator,
    /// Variable store for generator
    pub gen_vs: VarStore,
    /// Variable store for discriminator
    pub disc_vs: VarStore,
    /// Device (CPU/GPU)
    pub device: Device,
}

impl MnistGan {
    /// Create a new GAN on `device`
    pub fn new(gen_config: GeneratorConfig, disc_config: DiscriminatorConfig, device: Device) -> Self {
        let gen_vs = VarStore::new(device);
        let disc_vs = VarStore::new(device);

        let generator = Generator::new(&gen_vs.root(), gen_config);
        let discriminator = Discriminator::new(&disc_vs.root(), disc_config);

        Self {
            generator,
            discriminator,
            gen_vs,
            disc_vs,
            device,
        }
    }

    /// Create a GAN with the default architecture for a given latent size
    pub fn with_defaults(latent_dim: i64, device: Device) -> Self {
        let gen_config = GeneratorConfig {
            latent_dim,
            ..Default::default()
        };
        Self::new(gen_config, DiscriminatorConfig::default(), device)
    }

    /// Generate `num_samples` images from fresh latent points
    ///
    /// # Returns
    ///
    /// Tensor of shape (num_samples, 1, 28, 28)
    pub fn generate(&self, num_samples: i64) -> Tensor {
        let latent = generate_latent_points(num_samples, self.latent_dim(), self.device);
        self.generator.generate(&latent)
    }

    /// Probability of each image being real
    pub fn discriminate(&self, images: &Tensor) -> Tensor {
        self.discriminator.classify(images)
    }

    /// Adam optimizer over the generator's parameters only
    pub fn gen_optimizer(&self, config: &AdamConfig) -> Result<nn::Optimizer> {
        config.build(&self.gen_vs)
    }

    /// Adam optimizer over the discriminator's parameters only
    pub fn disc_optimizer(&self, config: &AdamConfig) -> Result<nn::Optimizer> {
        config.build(&self.disc_vs)
    }

    /// Get latent dimension
    pub fn latent_dim(&self) -> i64 {
        self.generator.config().latent_dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gan_creation() {
        let gan = MnistGan::with_defaults(100, Device::Cpu);

        assert_eq!(gan.latent_dim(), 100);
        assert!(!gan.gen_vs.trainable_variables().is_empty());
        assert!(!gan.disc_vs.trainable_variables().is_empty());
    }

    #[test]
    fn test_gan_generate_and_discriminate() {
        let gan = MnistGan::with_defaults(100, Device::Cpu);

        let samples = gan.generate(4);
        assert_eq!(samples.size(), vec![4, 1, 28, 28]);

        let probs = gan.discriminate(&samples);
        assert_eq!(probs.size(), vec![4, 1]);
    }

    #[test]
    fn test_optimizers_build() {
        let gan = MnistGan::with_defaults(100, Device::Cpu);
        let adam = AdamConfig::default();

        assert!(gan.gen_optimizer(&adam).is_ok());
        assert!(gan.disc_optimizer(&adam).is_ok());
    }
}
