// DataLoader — batching, seeded shuffling, iteration

use log::debug;
use rand::seq::SliceRandom;

use rayon::prelude::*;

use unlearn_core::index::rng_from_seed;

use crate::dataset::{Dataset, Sample};

/// Configuration for the DataLoader.
#[derive(Debug, Clone)]
pub struct DataLoaderConfig {
    /// Number of samples per batch.
    pub batch_size: usize,
    /// Whether to shuffle indices each epoch.
    pub shuffle: bool,
    /// Whether to drop the last incomplete batch.
    pub drop_last: bool,
    /// Number of parallel workers for sample fetching (0 = sequential).
    pub num_workers: usize,
    /// Seed of the shuffling generator. Epoch `e` shuffles with `seed + e`.
    pub seed: u64,
}

impl Default for DataLoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 128,
            shuffle: true,
            drop_last: false,
            num_workers: 0,
            seed: 1,
        }
    }
}

impl DataLoaderConfig {
    pub fn batch_size(mut self, bs: usize) -> Self {
        self.batch_size = bs;
        self
    }

    pub fn shuffle(mut self, s: bool) -> Self {
        self.shuffle = s;
        self
    }

    pub fn drop_last(mut self, d: bool) -> Self {
        self.drop_last = d;
        self
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn seed(mut self, s: u64) -> Self {
        self.seed = s;
        self
    }
}

/// One batch: `len` samples stacked along a leading batch dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    /// Sample data, flattened, `len * prod(item_shape)` elements.
    pub data: Vec<T>,
    /// Shape of the batch data: `[len, ...item_shape]`.
    pub shape: Vec<usize>,
    /// One label per sample.
    pub targets: Vec<i64>,
}

impl<T> Batch<T> {
    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// A DataLoader owns a Dataset and produces batches from it.
///
/// Traversal order is a pure function of the seed and the epoch number:
/// two loaders built from the same data and config yield identical batches
/// epoch after epoch.
pub struct DataLoader<D: Dataset> {
    dataset: D,
    config: DataLoaderConfig,
    epoch: u64,
}

impl<D: Dataset> DataLoader<D> {
    /// Create a new DataLoader over a dataset.
    ///
    /// # Panics
    /// Panics if `config.batch_size` is zero.
    pub fn new(dataset: D, config: DataLoaderConfig) -> Self {
        assert!(config.batch_size > 0, "DataLoader: batch_size must be > 0");
        debug!(
            "loader over {} ({} samples, batch {}, shuffle {})",
            dataset.name(),
            dataset.len(),
            config.batch_size,
            config.shuffle
        );
        Self {
            dataset,
            config,
            epoch: 0,
        }
    }

    /// The number of batches per epoch.
    pub fn num_batches(&self) -> usize {
        if self.config.drop_last {
            self.dataset.len() / self.config.batch_size
        } else {
            self.dataset.len().div_ceil(self.config.batch_size)
        }
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    pub fn config(&self) -> &DataLoaderConfig {
        &self.config
    }

    /// Number of epochs started so far.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Sample order for `epoch`.
    pub fn epoch_order(&self, epoch: u64) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.dataset.len()).collect();
        if self.config.shuffle {
            let mut rng = rng_from_seed(self.config.seed.wrapping_add(epoch));
            indices.shuffle(&mut rng);
        }
        indices
    }

    /// Fetch a slice of samples, optionally in parallel via rayon.
    fn fetch_samples(&self, indices: &[usize]) -> Vec<Sample<D::Elem>> {
        if self.config.num_workers > 0 && indices.len() > 1 {
            indices.par_iter().map(|&i| self.dataset.get(i)).collect()
        } else {
            indices.iter().map(|&i| self.dataset.get(i)).collect()
        }
    }

    fn collate(&self, indices: &[usize]) -> Batch<D::Elem> {
        let samples = self.fetch_samples(indices);
        let item_len: usize = self.dataset.item_shape().iter().product::<usize>().max(1);

        let mut data = Vec::with_capacity(samples.len() * item_len);
        let mut targets = Vec::with_capacity(samples.len());
        for s in samples {
            data.extend_from_slice(&s.data);
            targets.push(s.label);
        }

        let mut shape = vec![targets.len()];
        shape.extend_from_slice(self.dataset.item_shape());
        Batch {
            data,
            shape,
            targets,
        }
    }

    /// Produce all batches for the next epoch.
    pub fn epoch_batches(&mut self) -> Vec<Batch<D::Elem>> {
        self.iter_epoch().collect()
    }

    /// Start the next epoch and iterate over its batches one at a time.
    pub fn iter_epoch(&mut self) -> BatchIterator<'_, D> {
        let order = self.epoch_order(self.epoch);
        self.epoch += 1;
        BatchIterator {
            loader: self,
            order,
            batch_idx: 0,
        }
    }
}

/// Iterator that yields one batch at a time.
pub struct BatchIterator<'l, D: Dataset> {
    loader: &'l DataLoader<D>,
    order: Vec<usize>,
    batch_idx: usize,
}

impl<'l, D: Dataset> Iterator for BatchIterator<'l, D> {
    type Item = Batch<D::Elem>;

    fn next(&mut self) -> Option<Self::Item> {
        let bs = self.loader.config.batch_size;
        let n = self.order.len();
        let start = self.batch_idx * bs;

        if start >= n {
            return None;
        }

        if self.loader.config.drop_last && start + bs > n {
            return None;
        }

        let end = (start + bs).min(n);
        self.batch_idx += 1;
        Some(self.loader.collate(&self.order[start..end]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unlearn_core::LabeledArray;

    fn ten() -> LabeledArray<u8> {
        let data = (0..10u8).flat_map(|i| [i, i]).collect();
        let targets = (0..10).map(|i| i % 3).collect();
        LabeledArray::new(data, vec![2], targets).unwrap()
    }

    #[test]
    fn test_num_batches() {
        let loader = DataLoader::new(ten(), DataLoaderConfig::default().batch_size(3));
        // 10 / 3 = 3 full + 1 partial = 4
        assert_eq!(loader.num_batches(), 4);
        let loader = DataLoader::new(
            ten(),
            DataLoaderConfig::default().batch_size(3).drop_last(true),
        );
        assert_eq!(loader.num_batches(), 3);
    }

    #[test]
    fn test_unshuffled_batches() {
        let config = DataLoaderConfig::default().batch_size(4).shuffle(false);
        let mut loader = DataLoader::new(ten(), config);
        let batches = loader.epoch_batches();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].shape, vec![4, 2]);
        assert_eq!(batches[0].data, vec![0, 0, 1, 1, 2, 2, 3, 3]);
        assert_eq!(batches[0].targets, vec![0, 1, 2, 0]);
        assert_eq!(batches[2].shape, vec![2, 2]);
        assert_eq!(batches[2].targets, vec![0, 1]);
    }

    #[test]
    fn test_drop_last_skips_partial() {
        let config = DataLoaderConfig::default()
            .batch_size(4)
            .shuffle(false)
            .drop_last(true);
        let mut loader = DataLoader::new(ten(), config);
        assert_eq!(loader.iter_epoch().count(), 2);
    }

    #[test]
    fn test_shuffle_reproducible_across_loaders() {
        let config = DataLoaderConfig::default().batch_size(3).seed(17);
        let mut a = DataLoader::new(ten(), config.clone());
        let mut b = DataLoader::new(ten(), config);
        for _ in 0..3 {
            assert_eq!(a.epoch_batches(), b.epoch_batches());
        }
        assert_eq!(a.epoch(), 3);
    }

    #[test]
    fn test_shuffle_visits_every_sample_once() {
        let mut loader = DataLoader::new(ten(), DataLoaderConfig::default().batch_size(3));
        let mut seen: Vec<u8> = loader
            .iter_epoch()
            .flat_map(|b| b.data.into_iter().step_by(2))
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<u8>>());
    }

    #[test]
    fn test_epochs_reshuffle() {
        let loader = DataLoader::new(ten(), DataLoaderConfig::default().seed(3));
        let orders: Vec<Vec<usize>> = (0..4).map(|e| loader.epoch_order(e)).collect();
        assert!(orders.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_parallel_fetch_keeps_order() {
        let sequential = DataLoaderConfig::default().batch_size(5).seed(2);
        let parallel = sequential.clone().num_workers(4);
        let mut a = DataLoader::new(ten(), sequential);
        let mut b = DataLoader::new(ten(), parallel);
        assert_eq!(a.epoch_batches(), b.epoch_batches());
    }
}
