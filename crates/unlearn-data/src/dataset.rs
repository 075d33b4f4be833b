// Dataset trait — read access to labeled samples

use unlearn_core::LabeledArray;

/// A single sample: its data (flattened) and its label.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<T> {
    /// Sample data, flattened row-major.
    pub data: Vec<T>,
    /// Class label. Negative for samples marked as forgotten.
    pub label: i64,
}

/// A dataset is an indexed collection of samples of one shape.
///
/// Implementations must be `Send + Sync` so the loader can gather samples
/// from several threads.
pub trait Dataset: Send + Sync {
    /// Element type of the sample data (raw pixels are `u8`).
    type Elem: Copy + Send + Sync;

    /// Total number of samples in the dataset.
    fn len(&self) -> usize;

    /// Whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retrieve the sample at position `index`.
    ///
    /// # Panics
    /// May panic if `index >= self.len()`.
    fn get(&self, index: usize) -> Sample<Self::Elem>;

    /// The shape of a single sample (without batch dim).
    fn item_shape(&self) -> &[usize];

    /// Optional human-readable name.
    fn name(&self) -> &str {
        "dataset"
    }
}

impl<T: Copy + Send + Sync> Dataset for LabeledArray<T> {
    type Elem = T;

    fn len(&self) -> usize {
        LabeledArray::len(self)
    }

    fn get(&self, index: usize) -> Sample<T> {
        Sample {
            data: self.item(index).to_vec(),
            label: self.target(index),
        }
    }

    fn item_shape(&self) -> &[usize] {
        LabeledArray::item_shape(self).dims()
    }

    fn name(&self) -> &str {
        "labeled-array"
    }
}
