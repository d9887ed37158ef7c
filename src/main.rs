//! MNIST GAN
//!
//! Main entry point providing CLI interface for:
//! - Training the GAN and writing progress snapshots
//! - Previewing the dataset and untrained networks
//! - Writing a default configuration file

use anyhow::Result;
use clap::{Parser, Subcommand};
use tch::Device;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use mnist_gan::{
    data::{generate_latent_points, load_mnist, DataLoader, MnistStore, IMAGE_SIZE},
    model::{MnistGan, TrainableModel},
    snapshot::SnapshotWriter,
    training::Trainer,
    utils::Config,
};

/// Generate handwritten digits by training a GAN on MNIST
#[derive(Parser)]
#[command(name = "mnist_gan")]
#[command(version = "0.1.0")]
#[command(about = "Generate handwritten digits by training a GAN on the MNIST dataset")]
struct Cli {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "mnist_gan.toml")]
    config: String,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the GAN, saving a snapshot every few batches
    Train {
        /// Number of epochs
        #[arg(short, long)]
        epochs: Option<usize>,

        /// Full batch size (half real, half generated)
        #[arg(short, long)]
        batch_size: Option<usize>,
    },

    /// Save sample images of the dataset, a latent seed and an untrained generator
    Preview {
        /// Number of training images to show
        #[arg(short, long, default_value = "12")]
        samples: i64,

        /// Output directory
        #[arg(short, long, default_value = "preview")]
        out_dir: String,
    },

    /// Initialize default configuration file
    Init {
        /// Output configuration file path
        #[arg(short, long, default_value = "mnist_gan.toml")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = match cli.verbosity.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Train { epochs, batch_size } => {
            train_model(&cli.config, epochs, batch_size).await?;
        }
        Commands::Preview { samples, out_dir } => {
            preview(&cli.config, samples, &out_dir).await?;
        }
        Commands::Init { output } => {
            init_config(&output)?;
        }
    }

    Ok(())
}

/// Load the configuration file, or the defaults if it does not exist
fn load_config(config_path: &str) -> Result<Config> {
    let config = if std::path::Path::new(config_path).exists() {
        Config::load(config_path)?
    } else {
        info!("Config file not found, using defaults");
        Config::default()
    };

    if let Some(seed) = config.data.seed {
        tch::manual_seed(seed as i64);
    }

    Ok(config)
}

/// Make sure MNIST is cached locally
async fn fetch_mnist(config: &Config) -> Result<MnistStore> {
    let store = MnistStore::with_mirror(config.data_dir(), &config.data.mirror);
    store.ensure().await?;
    Ok(store)
}

/// Train the GAN
async fn train_model(config_path: &str, epochs: Option<usize>, batch_size: Option<usize>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(epochs) = epochs {
        config.training.epochs = epochs;
    }
    if let Some(batch_size) = batch_size {
        config.training.batch_size = batch_size;
    }
    config.validate()?;

    let device = config.get_device();
    info!("Using device \"{:?}\" for training", device);

    let store = fetch_mnist(&config).await?;
    let dataset = load_mnist(store.dir(), device)?;

    let training_config = config.training_config();
    let half_batch = training_config.half_batch();

    let mut data_loader = match config.data.seed {
        Some(seed) => DataLoader::seeded(dataset.images, half_batch, true, false, seed),
        None => DataLoader::new(dataset.images, half_batch, true, false),
    };
    info!(
        "{} batches of {} real images per epoch",
        data_loader.num_batches(),
        data_loader.batch_size()
    );

    let mut model = MnistGan::new(config.generator_config(), config.discriminator_config(), device);

    let writer = config.snapshot_writer();
    info!("Writing snapshots to {}", writer.dir().display());

    let mut trainer = Trainer::new(training_config, device).with_snapshots(writer);
    trainer.train(&mut model, &mut data_loader)?;

    let metrics = trainer.metrics();

    info!(
        "Training complete. Final G_loss: {:.4}, D_loss: {:.4}",
        metrics.latest_gen_loss().unwrap_or(0.0),
        metrics.latest_disc_loss().unwrap_or(0.0)
    );

    Ok(())
}

/// Save a look at the training data and the untrained networks
async fn preview(config_path: &str, samples: i64, out_dir: &str) -> Result<()> {
    let config = load_config(config_path)?;
    config.validate()?;
    let store = fetch_mnist(&config).await?;
    let dataset = load_mnist(store.dir(), Device::Cpu)?;

    let n = samples.clamp(1, dataset.len() as i64);
    let layout = config.snapshot_layout();
    let writer = SnapshotWriter::with_layout(out_dir, layout, n as usize);

    // Training samples and their digit labels
    let cols = layout.cols.min(n as u32);
    let rows = (n as u32).div_ceil(cols);
    let path = writer.save_named(&dataset.images.narrow(0, 0, n), "real samples.png", rows, cols)?;
    let labels: Vec<i64> = dataset.labels.narrow(0, 0, n).try_into()?;
    info!("Saved {} training images to {}", n, path.display());
    info!("Labels: {:?}", labels);

    // A random seed rendered as an image
    let seed = generate_latent_points(1, IMAGE_SIZE * IMAGE_SIZE, Device::Cpu)
        .view([1, 1, IMAGE_SIZE, IMAGE_SIZE]);
    let path = writer.save_named(&seed, "latent seed.png", 1, 1)?;
    info!("Saved random latent seed to {}", path.display());

    // Untrained networks
    let gan = MnistGan::new(config.generator_config(), config.discriminator_config(), Device::Cpu);
    let latent = generate_latent_points(1, gan.latent_dim(), Device::Cpu);
    let generated = gan.generator.predict(&latent, false);
    let path = writer.save_named(&generated, "untrained generator.png", 1, 1)?;
    info!("Saved untrained generator output to {}", path.display());

    let prediction = gan.discriminate(&generated).double_value(&[0, 0]);
    info!("Discriminator Prediction: {:.6}", prediction);

    Ok(())
}

/// Initialize default configuration file
fn init_config(output_path: &str) -> Result<()> {
    let config = Config::default();
    config.save(output_path)?;

    info!("Created default configuration at {}", output_path);
    Ok(())
}
