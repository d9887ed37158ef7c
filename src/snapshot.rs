//! Snapshot grids of generated digits
//!
//! Snapshots are written as `plot  epoch NN  batch NNNNN.png` so that the
//! video assembler can pick them up in lexical order with a single glob.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use tch::{Device, Kind, Tensor};
use tracing::debug;

/// Background and gutter colour
const BACKGROUND: Luma<u8> = Luma([255]);

/// Layout of a snapshot grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: u32,
    pub cols: u32,
    /// Blank pixels between tiles and around the border
    pub gutter: u32,
    /// Integer upscaling factor applied to the finished grid
    pub scale: u32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            rows: 6,
            cols: 6,
            gutter: 2,
            scale: 4,
        }
    }
}

/// File name of the snapshot taken at `epoch`/`batch`
pub fn snapshot_file_name(epoch: usize, batch: usize) -> String {
    format!("plot  epoch {:02}  batch {:05}.png", epoch, batch)
}

/// Map a normalized pixel in [-1, 1] to an inverted gray level
///
/// Ink (high intensity) is drawn dark on a light background.
fn to_gray_r(value: f32) -> u8 {
    let unit = ((value + 1.0) / 2.0).clamp(0.0, 1.0);
    (255.0 * (1.0 - unit)).round() as u8
}

/// Render up to `rows * cols` images of shape (N, 1, H, W) into a grid
///
/// Images fill the grid row-major; unused cells stay blank.
pub fn render_grid(images: &Tensor, layout: &GridLayout) -> Result<GrayImage> {
    let size = images.size();
    if size.len() != 4 || size[1] != 1 {
        bail!("expected images of shape (N, 1, H, W), got {:?}", size);
    }

    let (n, h, w) = (size[0] as usize, size[2] as u32, size[3] as u32);
    let cells = (layout.rows * layout.cols) as usize;
    let shown = n.min(cells);

    let pixels: Vec<f32> = images
        .detach()
        .to_device(Device::Cpu)
        .to_kind(Kind::Float)
        .contiguous()
        .flatten(0, -1)
        .try_into()?;

    let gutter = layout.gutter;
    let width = layout.cols * w + (layout.cols + 1) * gutter;
    let height = layout.rows * h + (layout.rows + 1) * gutter;
    let mut grid = GrayImage::from_pixel(width, height, BACKGROUND);

    let tile_len = (h * w) as usize;
    for (k, tile) in pixels.chunks_exact(tile_len).take(shown).enumerate() {
        let row = k as u32 / layout.cols;
        let col = k as u32 % layout.cols;
        let x0 = gutter + col * (w + gutter);
        let y0 = gutter + row * (h + gutter);

        for (i, &value) in tile.iter().enumerate() {
            let x = x0 + i as u32 % w;
            let y = y0 + i as u32 / w;
            grid.put_pixel(x, y, Luma([to_gray_r(value)]));
        }
    }

    if layout.scale > 1 {
        grid = imageops::resize(&grid, width * layout.scale, height * layout.scale, FilterType::Nearest);
    }

    Ok(grid)
}

/// Writes image grids into the figures directory
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
    layout: GridLayout,
    /// Maximum number of images placed in a training snapshot
    samples: usize,
}

impl SnapshotWriter {
    /// Create a writer for `dir` with the default 6x6 layout and 30 samples
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_layout(dir, GridLayout::default(), 30)
    }

    /// Create a writer with a custom layout
    pub fn with_layout(dir: impl Into<PathBuf>, layout: GridLayout, samples: usize) -> Self {
        Self {
            dir: dir.into(),
            layout,
            samples,
        }
    }

    /// Figures directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the snapshot taken at `epoch`/`batch`
    pub fn path_for(&self, epoch: usize, batch: usize) -> PathBuf {
        self.dir.join(snapshot_file_name(epoch, batch))
    }

    /// Save a training snapshot of the first generated images
    pub fn save(&self, images: &Tensor, epoch: usize, batch: usize) -> Result<PathBuf> {
        let n = images.size()[0].min(self.samples as i64);
        let path = self.path_for(epoch, batch);
        self.write(&images.narrow(0, 0, n), &self.layout, &path)?;
        Ok(path)
    }

    /// Save images under an arbitrary file name with a custom grid shape
    pub fn save_named(&self, images: &Tensor, file_name: &str, rows: u32, cols: u32) -> Result<PathBuf> {
        let layout = GridLayout {
            rows,
            cols,
            ..self.layout
        };
        let path = self.dir.join(file_name);
        self.write(images, &layout, &path)?;
        Ok(path)
    }

    fn write(&self, images: &Tensor, layout: &GridLayout, path: &Path) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let grid = render_grid(images, layout)?;
        grid.save(path)?;
        debug!("Saved snapshot {}", path.display());
        Ok(())
    }
}
