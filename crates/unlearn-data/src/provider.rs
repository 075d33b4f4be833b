// Dataset providers — named sources of (train, test) arrays
//
// Loading, decoding and augmenting a concrete dataset is the provider's job;
// this crate only sees the resulting `LabeledArray`s. Providers are looked up
// by name in a `Registry` that is filled with explicit `register` calls.
//
//   let mut registry = Registry::builtin();
//   registry.register("cifar10", MyCifarAdapter::new());
//   let (train, test) = registry.get("cifar10")?.load(&root, &options)?;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use unlearn_core::index::indexes_of_class;
use unlearn_core::{Error, LabeledArray, Result, Shape};

/// Dataset-specific options passed through to the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderOptions {
    /// Ask the provider to apply its training-time augmentation.
    #[serde(default)]
    pub augment: bool,
}

/// A source of one named dataset.
pub trait DatasetProvider: Send + Sync {
    /// Load the `(train, test)` pair, reading from `root` if the provider is
    /// file backed.
    fn load(
        &self,
        root: &Path,
        options: &ProviderOptions,
    ) -> Result<(LabeledArray, LabeledArray)>;
}

/// Name → provider table.
#[derive(Default)]
pub struct Registry {
    providers: BTreeMap<String, Arc<dyn DatasetProvider>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the in-memory synthetic datasets:
    /// `synthetic10` (10 classes) and `synthetic_binary` (2 classes).
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("synthetic10", SyntheticProvider::new(10));
        registry.register("synthetic_binary", SyntheticProvider::new(2));
        registry
    }

    /// Register `provider` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, provider: impl DatasetProvider + 'static) {
        self.register_arc(name, Arc::new(provider));
    }

    /// Register an already shared provider.
    pub fn register_arc(&mut self, name: impl Into<String>, provider: Arc<dyn DatasetProvider>) {
        let name = name.into();
        debug!("registering dataset provider {name:?}");
        self.providers.insert(name, provider);
    }

    /// Look up a provider by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn DatasetProvider>> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownDataset {
                name: name.to_string(),
                known: self.names().join(", "),
            })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("providers", &self.names())
            .finish()
    }
}

// SyntheticProvider — deterministic random images

/// Random `u8` images with round-robin labels, generated from a fixed seed.
///
/// Sample `i` of either split has label `i % num_classes`. The train and test
/// splits are drawn from different streams, so they never coincide.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    pub num_classes: usize,
    pub train_per_class: usize,
    pub test_per_class: usize,
    pub item_shape: Shape,
    pub seed: u64,
}

impl SyntheticProvider {
    /// 50 train and 10 test samples per class, 8x8x3 images.
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            train_per_class: 50,
            test_per_class: 10,
            item_shape: Shape::new(vec![8, 8, 3]),
            seed: 0,
        }
    }

    pub fn per_class(mut self, train: usize, test: usize) -> Self {
        self.train_per_class = train;
        self.test_per_class = test;
        self
    }

    pub fn item_shape(mut self, shape: impl Into<Shape>) -> Self {
        self.item_shape = shape.into();
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn generate(&self, per_class: usize, stream: u64) -> Result<LabeledArray> {
        let n = per_class * self.num_classes;
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_mul(2).wrapping_add(stream));
        let data: Vec<u8> = (0..n * self.item_shape.elem_count())
            .map(|_| rng.gen())
            .collect();
        let targets = (0..n).map(|i| (i % self.num_classes) as i64).collect();
        LabeledArray::new(data, self.item_shape.clone(), targets)
    }
}

impl DatasetProvider for SyntheticProvider {
    fn load(
        &self,
        _root: &Path,
        _options: &ProviderOptions,
    ) -> Result<(LabeledArray, LabeledArray)> {
        Ok((
            self.generate(self.train_per_class, 0)?,
            self.generate(self.test_per_class, 1)?,
        ))
    }
}

// InMemoryProvider — caller-supplied arrays

/// Serves copies of a fixed `(train, test)` pair.
#[derive(Debug, Clone)]
pub struct InMemoryProvider {
    train: LabeledArray,
    test: LabeledArray,
}

impl InMemoryProvider {
    pub fn new(train: LabeledArray, test: LabeledArray) -> Self {
        Self { train, test }
    }
}

impl DatasetProvider for InMemoryProvider {
    fn load(
        &self,
        _root: &Path,
        _options: &ProviderOptions,
    ) -> Result<(LabeledArray, LabeledArray)> {
        Ok((self.train.clone(), self.test.clone()))
    }
}

// MixProvider — swap the content of some classes for another dataset's

/// A dataset whose first `num_mixed` classes show another dataset's images.
///
/// The primary dataset keeps its labels and its other classes. For each class
/// `c < num_mixed`, the k-th sample of class `c` in the primary gets the data
/// of the k-th sample of class `c` in the secondary, in both splits. With a
/// `stride`, the primary's `[H, W, C]` images are first subsampled so their
/// shape matches the secondary's.
pub struct MixProvider {
    primary: Arc<dyn DatasetProvider>,
    secondary: Arc<dyn DatasetProvider>,
    num_mixed: usize,
    stride: Option<usize>,
}

impl MixProvider {
    pub fn new(
        primary: Arc<dyn DatasetProvider>,
        secondary: Arc<dyn DatasetProvider>,
        num_mixed: usize,
    ) -> Self {
        Self {
            primary,
            secondary,
            num_mixed,
            stride: None,
        }
    }

    /// Subsample the primary's images by `stride` in both spatial dims.
    pub fn stride(mut self, stride: usize) -> Self {
        self.stride = Some(stride);
        self
    }
}

impl DatasetProvider for MixProvider {
    fn load(
        &self,
        root: &Path,
        options: &ProviderOptions,
    ) -> Result<(LabeledArray, LabeledArray)> {
        let (mut train, mut test) = self.primary.load(root, options)?;
        let (other_train, other_test) = self.secondary.load(root, options)?;

        if let Some(stride) = self.stride {
            train = train.strided_hw(stride)?;
            test = test.strided_hw(stride)?;
        }

        mix_classes(&mut train, &other_train, self.num_mixed)?;
        mix_classes(&mut test, &other_test, self.num_mixed)?;
        Ok((train, test))
    }
}

/// Overwrite the data of classes `0..num_mixed` in `target` with same-class
/// samples of `source`, in order. Labels are untouched.
pub fn mix_classes(
    target: &mut LabeledArray,
    source: &LabeledArray,
    num_mixed: usize,
) -> Result<()> {
    if target.item_shape() != source.item_shape() {
        return Err(Error::ShapeMismatch {
            expected: target.item_shape().clone(),
            got: source.item_shape().clone(),
        });
    }

    for class in 0..num_mixed as i64 {
        let dst = indexes_of_class(target.targets(), class);
        let src = indexes_of_class(source.targets(), class);
        if src.len() < dst.len() {
            return Err(Error::NotEnoughSamples {
                requested: dst.len(),
                available: src.len(),
            });
        }
        for (&d, &s) in dst.iter().zip(&src) {
            target.set_item(d, source.item(s))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = Registry::builtin();
        assert_eq!(registry.names(), vec!["synthetic10", "synthetic_binary"]);
        assert!(registry.contains("synthetic_binary"));
        assert!(!registry.contains("cifar10"));
        let (train, test) = registry
            .get("synthetic10")
            .unwrap()
            .load(Path::new("."), &ProviderOptions::default())
            .unwrap();
        assert_eq!(train.len(), 500);
        assert_eq!(test.len(), 100);
        assert_eq!(train.item_shape().dims(), &[8, 8, 3]);
        assert_eq!(train.max_target(), Some(9));
    }

    #[test]
    fn test_unknown_dataset() {
        let err = Registry::builtin().get("cifar10").err().unwrap();
        match err {
            Error::UnknownDataset { name, known } => {
                assert_eq!(name, "cifar10");
                assert!(known.contains("synthetic10"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = Registry::new();
        registry.register("toy", SyntheticProvider::new(2).per_class(1, 1));
        registry.register("toy", SyntheticProvider::new(3).per_class(1, 1));
        let (train, _) = registry
            .get("toy")
            .unwrap()
            .load(Path::new("."), &ProviderOptions::default())
            .unwrap();
        assert_eq!(train.len(), 3);
    }

    #[test]
    fn test_synthetic_is_deterministic() {
        let p = SyntheticProvider::new(4).seed(9);
        let root = Path::new(".");
        let a = p.load(root, &ProviderOptions::default()).unwrap();
        let b = p.load(root, &ProviderOptions::default()).unwrap();
        assert_eq!(a.0, b.0);
        assert_eq!(a.1, b.1);
        assert_ne!(a.0.item(0), a.1.item(0));
    }

    #[test]
    fn test_mix_classes() {
        let mut target =
            LabeledArray::new(vec![0u8, 0, 0, 0], vec![1], vec![0, 1, 0, 2]).unwrap();
        let source =
            LabeledArray::new(vec![7u8, 8, 9, 6], vec![1], vec![1, 0, 0, 1]).unwrap();
        mix_classes(&mut target, &source, 2).unwrap();
        assert_eq!(target.data(), &[8, 7, 9, 0]);
        assert_eq!(target.targets(), &[0, 1, 0, 2]);
    }

    #[test]
    fn test_mix_needs_enough_source_samples() {
        let mut target = LabeledArray::new(vec![0u8, 0], vec![1], vec![0, 0]).unwrap();
        let source = LabeledArray::new(vec![1u8], vec![1], vec![0]).unwrap();
        assert!(matches!(
            mix_classes(&mut target, &source, 1),
            Err(Error::NotEnoughSamples { .. })
        ));
    }

    #[test]
    fn test_mix_provider_with_stride() {
        let big = SyntheticProvider::new(3).per_class(4, 2).item_shape(vec![4, 4, 1]);
        let small = SyntheticProvider::new(3).per_class(4, 2).item_shape(vec![2, 2, 1]).seed(5);
        let mix = MixProvider::new(Arc::new(big), Arc::new(small.clone()), 2).stride(2);
        let root = Path::new(".");
        let (train, _) = mix.load(root, &ProviderOptions::default()).unwrap();
        let (small_train, _) = small.load(root, &ProviderOptions::default()).unwrap();

        assert_eq!(train.item_shape().dims(), &[2, 2, 1]);
        // round-robin labels line up, so mixed samples equal the source's
        for i in 0..train.len() {
            if train.target(i) < 2 {
                assert_eq!(train.item(i), small_train.item(i));
            }
        }
    }
}
