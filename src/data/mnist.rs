//! MNIST dataset access
//!
//! The four IDX files are cached in a local directory and fetched from a
//! mirror the first time they are needed.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Result;
use flate2::read::GzDecoder;
use reqwest::Client;
use tch::{Device, Tensor};
use tracing::{debug, info};

use crate::error::GanError;

/// Default MNIST mirror (gzip-compressed IDX files)
pub const DEFAULT_MIRROR: &str = "https://ossci-datasets.s3.amazonaws.com/mnist";

/// Side length of an MNIST image
pub const IMAGE_SIZE: i64 = 28;

/// IDX files making up the dataset, as named on disk
pub const MNIST_FILES: [&str; 4] = [
    "train-images-idx3-ubyte",
    "train-labels-idx1-ubyte",
    "t10k-images-idx3-ubyte",
    "t10k-labels-idx1-ubyte",
];

/// Local MNIST cache backed by a download mirror
#[derive(Debug, Clone)]
pub struct MnistStore {
    client: Client,
    base_url: String,
    dir: PathBuf,
}

impl MnistStore {
    /// Create a store for `dir` using the default mirror
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_mirror(dir, DEFAULT_MIRROR)
    }

    /// Create a store for `dir` using a custom mirror
    pub fn with_mirror(dir: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            dir: dir.into(),
        }
    }

    /// Directory holding the IDX files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// IDX files not yet present in the cache directory
    pub fn missing_files(&self) -> Vec<&'static str> {
        MNIST_FILES
            .iter()
            .copied()
            .filter(|name| !self.dir.join(name).is_file())
            .collect()
    }

    /// Download every missing IDX file
    pub async fn ensure(&self) -> Result<()> {
        let missing = self.missing_files();
        if missing.is_empty() {
            debug!("MNIST already present in {}", self.dir.display());
            return Ok(());
        }

        std::fs::create_dir_all(&self.dir)?;

        for name in missing {
            self.download(name).await?;
        }

        Ok(())
    }

    async fn download(&self, name: &str) -> Result<()> {
        let url = format!("{}/{}.gz", self.base_url, name);
        info!("Downloading {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GanError::Download {
                url,
                status: status.as_u16(),
            }
            .into());
        }

        let compressed = response.bytes().await?;
        let raw = gunzip(&compressed)?;

        let path = self.dir.join(name);
        std::fs::write(&path, raw)?;
        info!("Saved {}", path.display());

        Ok(())
    }
}

/// Decompress a gzip payload
fn gunzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw)?;
    Ok(raw)
}

/// MNIST training split, normalized for the GAN
#[derive(Debug)]
pub struct MnistDataset {
    /// Images of shape (N, 1, 28, 28) with values in [-1, 1]
    pub images: Tensor,
    /// Digit labels of shape (N,)
    pub labels: Tensor,
}

impl MnistDataset {
    /// Build a dataset from images in [0, 1]
    ///
    /// Accepts either flat (N, 784) or (N, 1, 28, 28) images.
    pub fn from_unit_images(images: &Tensor, labels: Tensor) -> Self {
        let images = images.view([-1, 1, IMAGE_SIZE, IMAGE_SIZE]) * 2.0 - 1.0;
        Self { images, labels }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.images.size()[0] as usize
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move images and labels to a device
    pub fn to_device(self, device: Device) -> Self {
        Self {
            images: self.images.to_device(device),
            labels: self.labels.to_device(device),
        }
    }
}

/// Load the MNIST training split from a directory of IDX files
pub fn load_mnist(dir: &Path, device: Device) -> Result<MnistDataset> {
    let raw = tch::vision::mnist::load_dir(dir)?;
    let dataset = MnistDataset::from_unit_images(&raw.train_images, raw.train_labels);

    info!("Loaded {} MNIST training images", dataset.len());
    Ok(dataset.to_device(device))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use std::net::TcpListener;
    use tch::Kind;

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    /// Serve `files` (request path, body) over HTTP on a local port, 404 otherwise
    fn serve(files: Vec<(String, Vec<u8>)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let request = String::from_utf8_lossy(&request);
                let path = request.split_whitespace().nth(1).unwrap_or_default().to_string();
                let (status, body) = match files.iter().find(|(p, _)| *p == path) {
                    Some((_, body)) => ("200 OK", body.clone()),
                    None => ("404 Not Found", Vec::new()),
                };

                let header = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    body.len()
                );
                let _ = stream.write_all(header.as_bytes());
                let _ = stream.write_all(&body);
            }
        });

        format!("http://{}/mnist", addr)
    }

    #[test]
    fn test_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = MnistStore::new(dir.path());
        assert_eq!(store.missing_files().len(), 4);

        std::fs::write(dir.path().join("train-images-idx3-ubyte"), b"").unwrap();
        let missing = store.missing_files();
        assert_eq!(missing.len(), 3);
        assert!(!missing.contains(&"train-images-idx3-ubyte"));
    }

    #[test]
    fn test_mirror_trailing_slash() {
        let store = MnistStore::with_mirror("data", "https://example.org/mnist/");
        assert_eq!(store.base_url, "https://example.org/mnist");
    }

    #[test]
    fn test_gunzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&[0, 0, 8, 3, 42]).unwrap();
        let compressed = encoder.finish().unwrap();

        assert_eq!(gunzip(&compressed).unwrap(), vec![0, 0, 8, 3, 42]);
    }

    #[test]
    fn test_normalization() {
        let flat = Tensor::cat(
            &[
                Tensor::zeros([1, 784], (Kind::Float, Device::Cpu)),
                Tensor::ones([1, 784], (Kind::Float, Device::Cpu)),
            ],
            0,
        );
        let labels = Tensor::from_slice(&[3i64, 7]);
        let dataset = MnistDataset::from_unit_images(&flat, labels);

        assert_eq!(dataset.images.size(), vec![2, 1, 28, 28]);
        assert_eq!(dataset.images.get(0).min().double_value(&[]), -1.0);
        assert_eq!(dataset.images.get(1).max().double_value(&[]), 1.0);
        assert_eq!(dataset.len(), 2);
    }

    #[tokio::test]
    async fn test_ensure_downloads_missing_files() {
        let files: Vec<_> = MNIST_FILES
            .iter()
            .map(|name| (format!("/mnist/{}.gz", name), gzip(name.as_bytes())))
            .collect();
        let mirror = serve(files);

        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(data_dir.join("train-labels-idx1-ubyte"), b"cached").unwrap();

        let store = MnistStore::with_mirror(&data_dir, &mirror);
        store.ensure().await.unwrap();

        assert!(store.missing_files().is_empty());
        for name in MNIST_FILES {
            let saved = std::fs::read(data_dir.join(name)).unwrap();
            if name == "train-labels-idx1-ubyte" {
                assert_eq!(saved, b"cached");
            } else {
                assert_eq!(saved, name.as_bytes());
            }
        }
    }

    #[tokio::test]
    async fn test_ensure_reports_http_errors() {
        let mirror = serve(Vec::new());

        let dir = tempfile::tempdir().unwrap();
        let store = MnistStore::with_mirror(dir.path().join("data"), &mirror);
        let err = store.ensure().await.unwrap_err();

        match err.downcast_ref::<GanError>() {
            Some(GanError::Download { url, status }) => {
                assert_eq!(*status, 404);
                assert!(url.ends_with(".gz"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.missing_files().len(), 4);
    }
}
