//! DataLoader for batching and iterating over MNIST images
//!
//! Provides batching for GAN training with support for:
//! - Random shuffling (reshuffled every epoch)
//! - Drop last incomplete batch
//! - Iteration over batches

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tch::Tensor;

/// DataLoader for iterating over batched images
pub struct DataLoader {
    /// Full dataset of shape (num_images, 1, 28, 28)
    data: Tensor,
    /// Batch size
    batch_size: usize,
    /// Whether to shuffle data each epoch
    shuffle: bool,
    /// Whether to drop the last incomplete batch
    drop_last: bool,
    /// Current indices for iteration
    indices: Vec<i64>,
    /// Current position in iteration
    current_idx: usize,
    rng: StdRng,
}

impl DataLoader {
    /// Create a new DataLoader
    ///
    /// # Arguments
    ///
    /// * `data` - Tensor whose first dimension indexes samples
    /// * `batch_size` - Number of images per batch
    /// * `shuffle` - Whether to shuffle data each epoch
    /// * `drop_last` - Whether to drop incomplete final batch
    pub fn new(data: Tensor, batch_size: usize, shuffle: bool, drop_last: bool) -> Self {
        Self::with_rng(data, batch_size, shuffle, drop_last, StdRng::from_entropy())
    }

    /// Create a DataLoader whose shuffle order is reproducible
    pub fn seeded(data: Tensor, batch_size: usize, shuffle: bool, drop_last: bool, seed: u64) -> Self {
        Self::with_rng(data, batch_size, shuffle, drop_last, StdRng::seed_from_u64(seed))
    }

    fn with_rng(data: Tensor, batch_size: usize, shuffle: bool, drop_last: bool, rng: StdRng) -> Self {
        let num_samples = data.size()[0];
        let indices: Vec<i64> = (0..num_samples).collect();

        let mut loader = Self {
            data,
            batch_size: batch_size.max(1),
            shuffle,
            drop_last,
            indices,
            current_idx: 0,
            rng,
        };

        if shuffle {
            loader.shuffle_indices();
        }

        loader
    }

    /// Get the number of batches per epoch
    pub fn num_batches(&self) -> usize {
        let num_samples = self.num_samples();
        if self.drop_last {
            num_samples / self.batch_size
        } else {
            num_samples.div_ceil(self.batch_size)
        }
    }

    /// Get total number of samples
    pub fn num_samples(&self) -> usize {
        self.indices.len()
    }

    /// Get batch size
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn shuffle_indices(&mut self) {
        self.indices.shuffle(&mut self.rng);
    }

    /// Reset for new epoch
    pub fn reset(&mut self) {
        self.current_idx = 0;
        if self.shuffle {
            self.shuffle_indices();
        }
    }

    /// Get next batch
    ///
    /// Returns None when epoch is complete
    pub fn next_batch(&mut self) -> Option<Tensor> {
        let num_samples = self.indices.len();
        let start = self.current_idx;

        if start >= num_samples {
            return None;
        }

        let end = (start + self.batch_size).min(num_samples);

        // Skip incomplete batch if drop_last
        if self.drop_last && end - start < self.batch_size {
            return None;
        }

        let index = Tensor::from_slice(&self.indices[start..end]).to_device(self.data.device());
        let batch = self.data.index_select(0, &index);

        self.current_idx = end;
        Some(batch)
    }

    /// Iterate over all batches of a fresh epoch
    pub fn iter(&mut self) -> DataLoaderIter<'_> {
        self.reset();
        DataLoaderIter { loader: self }
    }
}

/// Iterator adapter for DataLoader
pub struct DataLoaderIter<'a> {
    loader: &'a mut DataLoader,
}

impl Iterator for DataLoaderIter<'_> {
    type Item = Tensor;

    fn next(&mut self) -> Option<Self::Item> {
        self.loader.next_batch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{Device, Kind};

    fn numbered(n: i64) -> Tensor {
        Tensor::arange(n, (Kind::Float, Device::Cpu)).view([n, 1, 1, 1])
    }

    fn epoch_values(loader: &mut DataLoader) -> Vec<i64> {
        let mut values: Vec<i64> = Vec::new();
        for batch in loader.iter() {
            let flat: Vec<f32> = batch.flatten(0, -1).try_into().unwrap();
            values.extend(flat.into_iter().map(|v| v as i64));
        }
        values
    }

    #[test]
    fn test_dataloader_basic() {
        let mut loader = DataLoader::new(numbered(10), 3, false, false);

        assert_eq!(loader.num_batches(), 4); // ceil(10/3) = 4
        assert_eq!(loader.num_samples(), 10);
        assert_eq!(loader.batch_size(), 3);

        let mut batch_count = 0;
        while let Some(batch) = loader.next_batch() {
            batch_count += 1;
            if batch_count < 4 {
                assert_eq!(batch.size(), vec![3, 1, 1, 1]);
            } else {
                assert_eq!(batch.size()[0], 1); // Last batch has 1 sample
            }
        }
        assert_eq!(batch_count, 4);
    }

    #[test]
    fn test_dataloader_drop_last() {
        let mut loader = DataLoader::new(numbered(10), 3, false, true);

        assert_eq!(loader.num_batches(), 3); // floor(10/3) = 3
        assert_eq!(loader.iter().count(), 3);
    }

    #[test]
    fn test_shuffled_epoch_covers_every_sample_once() {
        let mut loader = DataLoader::seeded(numbered(50), 8, true, false, 7);

        for _ in 0..2 {
            let mut values = epoch_values(&mut loader);
            values.sort_unstable();
            assert_eq!(values, (0..50).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_shuffle_changes_order() {
        let mut loader = DataLoader::seeded(numbered(100), 10, true, false, 42);
        let first = epoch_values(&mut loader);
        let second = epoch_values(&mut loader);

        assert_ne!(first, (0..100).collect::<Vec<_>>());
        assert_ne!(first, second);
    }

    #[test]
    fn test_seeded_loaders_agree() {
        let mut a = DataLoader::seeded(numbered(30), 4, true, false, 3);
        let mut b = DataLoader::seeded(numbered(30), 4, true, false, 3);

        assert_eq!(epoch_values(&mut a), epoch_values(&mut b));
    }
}
