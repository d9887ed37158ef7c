//! Error types raised by the crate itself
//!
//! Failures coming from libtorch or the filesystem are passed through
//! `anyhow` untouched.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GanError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to download {url}: HTTP {status}")]
    Download { url: String, status: u16 },
}
