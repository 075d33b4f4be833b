// Partition builder — stratified train / validation split
//
// For every class 0..K the builder draws floor(fraction * count) of that
// class's samples for validation; whatever is left is train. One generator,
// seeded once, serves all classes in class order, so the split depends only
// on the labels and the seed.
//
// Both partitions are gathered into new buffers with `LabeledArray::select`,
// before anything gets mutated. The forget step later rewrites the train
// partition in place and the validation partition must not notice.

use log::info;

use unlearn_core::index::{
    choose_without_replacement, complement, indexes_of_class, rng_from_seed,
};
use unlearn_core::{Error, LabeledArray, Result};

/// Configuration for [`split_train_valid`].
#[derive(Debug, Clone)]
pub struct PartitionConfig {
    /// Share of each class that goes to validation (truncated per class).
    pub valid_fraction: f64,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            valid_fraction: 0.2,
        }
    }
}

impl PartitionConfig {
    pub fn valid_fraction(mut self, f: f64) -> Self {
        self.valid_fraction = f;
        self
    }
}

/// The two halves of an original train set.
#[derive(Debug, Clone)]
pub struct Partition<T> {
    pub train: LabeledArray<T>,
    pub valid: LabeledArray<T>,
    /// Positions in the original train set, ascending.
    pub train_indexes: Vec<usize>,
    /// Positions in the original train set, class by class in draw order.
    pub valid_indexes: Vec<usize>,
}

/// Validation indexes for labels `targets`: per class, in class order.
pub fn stratified_valid_indexes(
    targets: &[i64],
    seed: u64,
    config: &PartitionConfig,
) -> Result<Vec<usize>> {
    if let Some(index) = targets.iter().position(|&t| t < 0) {
        return Err(Error::NegativeLabel {
            index,
            label: targets[index],
        });
    }

    let num_classes = targets.iter().max().map_or(0, |&m| m + 1);
    let mut rng = rng_from_seed(seed);
    let mut valid = Vec::new();
    for class in 0..num_classes {
        let class_idx = indexes_of_class(targets, class);
        let take = (config.valid_fraction * class_idx.len() as f64) as usize;
        valid.extend(choose_without_replacement(&class_idx, take, &mut rng)?);
    }
    Ok(valid)
}

/// Carve a stratified validation split out of `train`.
pub fn split_train_valid<T: Copy>(
    train: &LabeledArray<T>,
    seed: u64,
    config: &PartitionConfig,
) -> Result<Partition<T>> {
    let valid_indexes = stratified_valid_indexes(train.targets(), seed, config)?;
    let train_indexes = complement(train.len(), &valid_indexes);

    let partition = Partition {
        train: train.select(&train_indexes)?,
        valid: train.select(&valid_indexes)?,
        train_indexes,
        valid_indexes,
    };
    info!(
        "partitioned {} samples into {} train / {} valid",
        train.len(),
        partition.train.len(),
        partition.valid.len()
    );
    Ok(partition)
}
