//! # unlearn-data
//!
//! Forget-set preparation for machine-unlearning experiments.
//!
//! This crate provides:
//! - [`Dataset`] trait — read access to labeled samples
//! - [`DataLoader`] — seeded batching over a dataset
//! - [`forget`] — replacing, marking and confusing training samples
//! - [`partition`] — stratified train / validation split
//! - [`Registry`] / [`DatasetProvider`] — named dataset sources
//! - [`get_loaders`] — the whole pipeline, from a dataset name and
//!   [`LoaderOptions`] to train / validation / test loaders
//!
//! ```ignore
//! let registry = Registry::builtin();
//! let options = LoaderOptions::new("synthetic10")
//!     .class_to_replace(vec![3])
//!     .only_mark(true);
//! let mut loaders = get_loaders(&registry, &options)?;
//! for batch in loaders.train.iter_epoch() {
//!     // batch.data, batch.shape, batch.targets
//! }
//! ```

pub mod assemble;
pub mod config;
pub mod dataset;
pub mod forget;
pub mod loader;
pub mod partition;
pub mod provider;

pub use assemble::{assemble, build_partitions, get_loaders, Loaders, Partitions};
pub use config::{ConfuseSplit, ForgetOptions, ForgetSpec, LoaderOptions};
pub use dataset::{Dataset, Sample};
pub use forget::{
    confuse_class, confuse_sampled, is_marked, mark_label, remove_classes, replace_class,
    replace_indexes, unmark_label,
};
pub use loader::{Batch, DataLoader, DataLoaderConfig};
pub use partition::{split_train_valid, Partition, PartitionConfig};
pub use provider::{
    DatasetProvider, InMemoryProvider, MixProvider, ProviderOptions, Registry, SyntheticProvider,
};
