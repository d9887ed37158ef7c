//! Data module for the MNIST training set
//!
//! This module provides:
//! - Download and loading of the MNIST IDX files
//! - DataLoader for shuffled half-batches of real images
//! - Latent space sampling for the generator

mod latent;
mod loader;
mod mnist;

pub use latent::generate_latent_points;
pub use loader::DataLoader;
pub use mnist::{load_mnist, MnistDataset, MnistStore, DEFAULT_MIRROR, IMAGE_SIZE, MNIST_FILES};
