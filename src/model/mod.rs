//! Model module containing the GAN components
//!
//! This module provides:
//! - Generator network turning latent seeds into digits
//! - Discriminator network telling real digits from generated ones
//! - The `TrainableModel` capability shared by both
//! - `MnistGan` wrapper owning both networks and their variable stores

mod discriminator;
mod gan;
mod generator;
mod trainable;

pub use discriminator::{Discriminator, DiscriminatorConfig};
pub use gan::{AdamConfig, MnistGan};
pub use generator::{Generator, GeneratorConfig};
pub use trainable::TrainableModel;

use tch::Tensor;

/// LeakyReLU with a configurable negative slope (0 < slope < 1)
pub(crate) fn leaky_relu(xs: &Tensor, negative_slope: f64) -> Tensor {
    xs.maximum(&(xs * negative_slope))
}
