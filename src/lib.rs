//! # MNIST GAN
//!
//! Generate handwritten digits by training a Generative Adversarial Network
//! on the MNIST dataset, and assemble the training snapshots into a video.
//!
//! ## Modules
//!
//! - `data`: MNIST download/loading, batching and latent sampling
//! - `model`: Generator and Discriminator networks
//! - `training`: Alternating adversarial training loop and metrics
//! - `snapshot`: Image grids of generated digits
//! - `video`: ffmpeg command construction for the video assembler
//! - `utils`: Configuration handling

pub mod data;
pub mod error;
pub mod model;
pub mod snapshot;
pub mod training;
pub mod utils;
pub mod video;

pub use data::{generate_latent_points, load_mnist, DataLoader, MnistDataset, MnistStore};
pub use error::GanError;
pub use model::{Discriminator, Generator, MnistGan, TrainableModel};
pub use snapshot::SnapshotWriter;
pub use training::{combined_labels, Trainer, TrainingConfig, TrainingMetrics};
pub use utils::Config;
pub use video::VideoCommand;
