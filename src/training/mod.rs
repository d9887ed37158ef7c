//! Training module for the GAN
//!
//! This module provides:
//! - Alternating discriminator/generator training loop
//! - Binary Cross Entropy loss and real/fake label construction
//! - Training configuration and metrics

mod losses;
mod metrics;
mod trainer;

pub use losses::{bce_loss, combined_labels, constant_labels};
pub use metrics::{LoggedStep, TrainingMetrics};
pub use trainer::{DiscriminatorStep, Trainer, TrainingConfig};
