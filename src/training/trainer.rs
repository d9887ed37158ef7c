//! Training loop implementation for the GAN
//!
//! Every batch runs one discriminator update on a half-real, half-fake
//! batch followed by one generator update through the discriminator.

use std::path::PathBuf;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tch::{nn, Device, Tensor};
use tracing::{info, warn};

use super::losses::{bce_loss, combined_labels, constant_labels};
use super::metrics::TrainingMetrics;
use crate::data::{generate_latent_points, DataLoader};
use crate::model::{AdamConfig, MnistGan, TrainableModel};
use crate::snapshot::SnapshotWriter;

/// Training configuration
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Number of training epochs
    pub epochs: usize,
    /// Full batch size; the discriminator sees half real, half fake
    pub batch_size: usize,
    /// Label for real images
    pub real_label: f64,
    /// Label for generated images
    pub fake_label: f64,
    /// Optimizer settings, shared by both networks
    pub adam: AdamConfig,
    /// Log and snapshot every N batches
    pub log_every: usize,
    /// Window for the mode collapse check, in logged steps
    pub collapse_window: usize,
    /// Where to write the metrics CSV once training ends
    pub metrics_path: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 20,
            batch_size: 200,
            real_label: 1.0,
            fake_label: 0.0,
            adam: AdamConfig::default(),
            log_every: 25,
            collapse_window: 10,
            metrics_path: None,
        }
    }
}

impl TrainingConfig {
    /// Number of real (and fake) images in a discriminator batch
    pub fn half_batch(&self) -> usize {
        self.batch_size / 2
    }
}

/// Outcome of a discriminator update
#[derive(Debug)]
pub struct DiscriminatorStep {
    /// Discriminator loss
    pub loss: f64,
    /// Generated images used as the fake half of the batch
    pub fake_images: Tensor,
}

/// GAN Trainer
pub struct Trainer {
    config: TrainingConfig,
    device: Device,
    metrics: TrainingMetrics,
    snapshots: Option<SnapshotWriter>,
}

impl Trainer {
    /// Create a new trainer
    pub fn new(config: TrainingConfig, device: Device) -> Self {
        Self {
            config,
            device,
            metrics: TrainingMetrics::new(),
            snapshots: None,
        }
    }

    /// Save a snapshot grid at every logged batch
    pub fn with_snapshots(mut self, writer: SnapshotWriter) -> Self {
        self.snapshots = Some(writer);
        self
    }

    /// Step 1: train the discriminator on real and generated images
    ///
    /// The fake images are produced without gradients, so the generator is
    /// untouched by this step.
    pub fn discriminator_step(
        &self,
        model: &MnistGan,
        real_images: &Tensor,
        disc_opt: &mut nn::Optimizer,
    ) -> DiscriminatorStep {
        let n_real = real_images.size()[0];

        let latent = generate_latent_points(n_real, model.latent_dim(), self.device);
        // Batch norm cannot use batch statistics for a single sample
        let fake_images = model.generator.predict(&latent, n_real > 1);

        let images = Tensor::cat(&[real_images.shallow_clone(), fake_images.shallow_clone()], 0);
        let labels = combined_labels(
            n_real,
            n_real,
            self.config.real_label,
            self.config.fake_label,
            self.device,
        );

        let loss = model
            .discriminator
            .train_on(&images, &labels, bce_loss, disc_opt);

        DiscriminatorStep {
            loss: loss.double_value(&[]),
            fake_images,
        }
    }

    /// Step 2: train the generator through the discriminator
    ///
    /// Generated images are labelled real. Gradients flow through the
    /// discriminator but only the generator's optimizer steps; the stale
    /// discriminator gradients are cleared by the next discriminator step.
    pub fn generator_step(&self, model: &MnistGan, gen_opt: &mut nn::Optimizer) -> f64 {
        let batch_size = self.config.batch_size as i64;

        gen_opt.zero_grad();

        let latent = generate_latent_points(batch_size, model.latent_dim(), self.device);
        let labels = constant_labels(batch_size, self.config.real_label, self.device);

        let generated = model.generator.forward_t(&latent, true);
        let probs = model.discriminator.forward_t(&generated, true);
        let loss = bce_loss(&probs, &labels);

        loss.backward();
        gen_opt.step();

        loss.double_value(&[])
    }

    /// Train the GAN for the configured number of epochs
    ///
    /// # Arguments
    ///
    /// * `model` - GAN to train
    /// * `data_loader` - DataLoader yielding half-batches of real images
    ///
    /// # Returns
    ///
    /// Training metrics
    pub fn train(&mut self, model: &mut MnistGan, data_loader: &mut DataLoader) -> Result<&TrainingMetrics> {
        let mut gen_opt = model.gen_optimizer(&self.config.adam)?;
        let mut disc_opt = model.disc_optimizer(&self.config.adam)?;

        let num_batches = data_loader.num_batches();
        let log_every = self.config.log_every.max(1);

        info!(
            "Starting training for {} epochs, {} batches per epoch",
            self.config.epochs, num_batches
        );

        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-");

        for epoch in 0..self.config.epochs {
            let pb = ProgressBar::new(num_batches as u64);
            pb.set_style(style.clone());

            for (i, real_images) in data_loader.iter().enumerate() {
                let real_images = real_images.to_device(self.device);

                let disc_step = self.discriminator_step(model, &real_images, &mut disc_opt);
                let gen_loss = self.generator_step(model, &mut gen_opt);

                pb.set_message(format!("G: {:.4}, D: {:.4}", gen_loss, disc_step.loss));
                pb.inc(1);

                if i % log_every == 0 {
                    pb.suspend(|| {
                        info!(
                            "Epoch: {:02}    Batch Number: {:03} / {:03}    Generator Loss: {:.9}    Discriminator Loss: {:.9}",
                            epoch, i, num_batches, gen_loss, disc_step.loss
                        );
                    });

                    self.metrics.record(epoch, i, gen_loss, disc_step.loss);

                    // Snapshot shows the fakes the discriminator was trained on
                    if let Some(writer) = &self.snapshots {
                        writer.save(&disc_step.fake_images, epoch, i)?;
                    }

                    if self.metrics.check_mode_collapse(self.config.collapse_window) {
                        pb.suspend(|| {
                            warn!("Possible mode collapse detected! Consider adjusting learning rates.");
                        });
                    }
                }
            }

            pb.finish_with_message("done");
        }

        if let Some(path) = &self.config.metrics_path {
            self.metrics.save_csv(path)?;
            info!("Saved training metrics to {}", path.display());
        }

        Ok(&self.metrics)
    }

    /// Get training metrics
    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }
}
