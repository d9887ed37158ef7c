//! Configuration management
//!
//! Provides unified configuration for dataset, model, training and
//! snapshots, loadable from TOML or JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GanError;
use crate::model::{AdamConfig, DiscriminatorConfig, GeneratorConfig};
use crate::snapshot::{GridLayout, SnapshotWriter};
use crate::training::TrainingConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data configuration
    pub data: DataConfig,
    /// Model configuration
    pub model: ModelConfig,
    /// Training configuration
    pub training: TrainingConfigFile,
    /// Snapshot configuration
    pub snapshot: SnapshotConfig,
}

/// Data-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory caching the MNIST IDX files
    pub data_dir: String,
    /// Download mirror for missing files
    pub mirror: String,
    /// Seed for batch shuffling and tensor initialisation
    pub seed: Option<u64>,
}

/// Model-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Latent dimension size
    pub latent_dim: i64,
    /// Feature maps in the generator's hidden layers
    pub gen_base_filters: i64,
    /// Feature maps in the discriminator's convolutions
    pub disc_base_filters: i64,
    /// Dropout rate for discriminator
    pub dropout: f64,
    /// LeakyReLU negative slope for both networks
    pub negative_slope: f64,
}

/// Training-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfigFile {
    /// Number of epochs
    pub epochs: usize,
    /// Full batch size (must be even)
    pub batch_size: usize,
    /// Label for real images
    pub real_label: f64,
    /// Label for generated images
    pub fake_label: f64,
    /// Adam learning rate for both networks
    pub learning_rate: f64,
    /// Adam beta1
    pub beta1: f64,
    /// Adam beta2
    pub beta2: f64,
    /// Log and snapshot every N batches
    pub log_every: usize,
    /// Logged steps compared by the mode collapse check
    pub collapse_window: usize,
    /// Device: "auto", "cpu" or "cuda"
    pub device: String,
    /// Optional CSV file receiving the logged losses
    pub metrics_path: Option<String>,
}

/// Snapshot-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Directory receiving the PNG snapshots
    pub figs_dir: String,
    /// Generated images per snapshot
    pub samples: usize,
    /// Grid rows
    pub rows: u32,
    /// Grid columns
    pub cols: u32,
    /// Blank pixels between tiles
    pub gutter: u32,
    /// Upscaling factor
    pub scale: u32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            mirror: crate::data::DEFAULT_MIRROR.to_string(),
            seed: None,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            latent_dim: 100,
            gen_base_filters: 128,
            disc_base_filters: 64,
            dropout: 0.4,
            negative_slope: 0.2,
        }
    }
}

impl Default for TrainingConfigFile {
    fn default() -> Self {
        Self {
            epochs: 20,
            batch_size: 200,
            real_label: 1.0,
            fake_label: 0.0,
            learning_rate: 2e-4,
            beta1: 0.5,
            beta2: 0.999,
            log_every: 25,
            collapse_window: 10,
            device: "auto".to_string(),
            metrics_path: None,
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            figs_dir: "figs".to_string(),
            samples: 30,
            rows: 6,
            cols: 6,
            gutter: 2,
            scale: 4,
        }
    }
}

impl Config {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_toml(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_toml(&self, path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn save_json(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from `path`, choosing the format by extension
    pub fn load(path: &str) -> anyhow::Result<Self> {
        if path.ends_with(".json") {
            Self::from_json(path)
        } else {
            Self::from_toml(path)
        }
    }

    /// Save to `path`, choosing the format by extension
    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        if path.ends_with(".json") {
            self.save_json(path)
        } else {
            self.save_toml(path)
        }
    }

    /// Get device from configuration
    pub fn get_device(&self) -> tch::Device {
        match self.training.device.to_lowercase().as_str() {
            "cpu" => tch::Device::Cpu,
            "cuda" | "gpu" => {
                if tch::Cuda::is_available() {
                    tch::Device::Cuda(0)
                } else {
                    tracing::warn!("CUDA requested but not available, falling back to CPU");
                    tch::Device::Cpu
                }
            }
            _ => tch::Device::cuda_if_available(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), GanError> {
        let invalid = |msg: &str| Err(GanError::InvalidConfig(msg.to_string()));

        if self.training.epochs == 0 {
            return invalid("number of epochs must be > 0");
        }
        if self.training.batch_size < 2 || self.training.batch_size % 2 != 0 {
            return invalid("batch size must be an even number >= 2");
        }
        if self.model.latent_dim <= 0 {
            return invalid("latent dimension must be > 0");
        }
        if self.training.log_every == 0 {
            return invalid("log_every must be > 0");
        }
        if self.training.collapse_window == 0 {
            return invalid("collapse_window must be > 0");
        }
        if !(0.0..1.0).contains(&self.model.dropout) {
            return invalid("dropout must be in [0, 1)");
        }
        if self.snapshot.rows == 0 || self.snapshot.cols == 0 || self.snapshot.scale == 0 {
            return invalid("snapshot grid rows, cols and scale must be > 0");
        }
        Ok(())
    }

    /// Generator architecture
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            latent_dim: self.model.latent_dim,
            base_filters: self.model.gen_base_filters,
            negative_slope: self.model.negative_slope,
        }
    }

    /// Discriminator architecture
    pub fn discriminator_config(&self) -> DiscriminatorConfig {
        DiscriminatorConfig {
            base_filters: self.model.disc_base_filters,
            dropout: self.model.dropout,
            negative_slope: self.model.negative_slope,
        }
    }

    /// Settings handed to the trainer
    pub fn training_config(&self) -> TrainingConfig {
        let t = &self.training;
        TrainingConfig {
            epochs: t.epochs,
            batch_size: t.batch_size,
            real_label: t.real_label,
            fake_label: t.fake_label,
            adam: AdamConfig {
                lr: t.learning_rate,
                beta1: t.beta1,
                beta2: t.beta2,
            },
            log_every: t.log_every,
            collapse_window: t.collapse_window,
            metrics_path: t.metrics_path.as_ref().map(PathBuf::from),
        }
    }

    /// Grid layout of the snapshots
    pub fn snapshot_layout(&self) -> GridLayout {
        let s = &self.snapshot;
        GridLayout {
            rows: s.rows,
            cols: s.cols,
            gutter: s.gutter,
            scale: s.scale,
        }
    }

    /// Writer for the training snapshots
    pub fn snapshot_writer(&self) -> SnapshotWriter {
        SnapshotWriter::with_layout(&self.snapshot.figs_dir, self.snapshot_layout(), self.snapshot.samples)
    }

    /// Directory caching the MNIST files
    pub fn data_dir(&self) -> &Path {
        Path::new(&self.data.data_dir)
    }
}
