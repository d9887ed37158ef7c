//! Video Generator Utility
//!
//! Stitches the training snapshots into a video with ffmpeg.
//!
//! Usage:
//!   cargo run --bin video_generator -- --figs figs/ --framerate 4 --out mnist-gan.mp4

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use mnist_gan::video::{VideoCommand, BANNER, DEFAULT_FIGS, DEFAULT_FRAMERATE, DEFAULT_OUT};

#[derive(Parser, Debug)]
#[command(name = "video_generator")]
#[command(about = "Generate videos from your training images")]
struct Args {
    /// Directory containing training figures
    #[arg(short, long, default_value = DEFAULT_FIGS)]
    figs: String,

    /// Amount of figures shown per second
    #[arg(short = 'r', long, default_value_t = DEFAULT_FRAMERATE, allow_negative_numbers = true)]
    framerate: i64,

    /// Filename of the video
    #[arg(short, long, default_value = DEFAULT_OUT)]
    out: String,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    println!("{}", BANNER);

    let args = Args::parse();
    let command = VideoCommand::new(args.figs, args.framerate, args.out);

    println!("{}", command);

    match command.run() {
        Ok(status) => info!("ffmpeg exited with {}", status),
        Err(e) => error!("Failed to run {}: {}", command.program(), e),
    }

    Ok(())
}
