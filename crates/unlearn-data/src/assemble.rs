// Dataset assembly — from a dataset name to three batch loaders
//
//   options ──parse──> ForgetSpec
//   registry[name].load(root) ──> (train, test)
//   train ──split_train_valid(seed)──> (train, valid)
//   train, test ──apply ForgetSpec(seed - 1)──> forgotten train, test
//   train / valid / test ──> DataLoader (seed)
//
// Parsing and the batch size check happen before anything is loaded, so a
// bad configuration never produces partitions.

use log::info;

use unlearn_core::{Error, LabeledArray, Result};

use crate::config::{ConfuseSplit, ForgetSpec, LoaderOptions};
use crate::forget::{
    confuse_class, confuse_sampled, remove_classes, replace_class, replace_indexes,
};
use crate::loader::{DataLoader, DataLoaderConfig};
use crate::partition::{split_train_valid, PartitionConfig};
use crate::provider::Registry;

/// The three partitions, already wrapped in loaders.
pub struct Loaders {
    pub train: DataLoader<LabeledArray>,
    pub valid: DataLoader<LabeledArray>,
    pub test: DataLoader<LabeledArray>,
    /// Train-partition positions touched by forgetting or confusion, in the
    /// order they were selected.
    pub forgotten: Vec<usize>,
}

/// Partitions before they are wrapped in loaders.
#[derive(Debug, Clone, PartialEq)]
pub struct Partitions {
    pub train: LabeledArray,
    pub valid: LabeledArray,
    pub test: LabeledArray,
    pub forgotten: Vec<usize>,
}

/// Load `options.dataset_name` from `registry`, partition it, apply the
/// forgetting options and build the loaders.
pub fn get_loaders(registry: &Registry, options: &LoaderOptions) -> Result<Loaders> {
    let spec = ForgetSpec::from_options(&options.forget)?;
    assemble(registry, options, &spec)
}

/// [`get_loaders`] with an already decided forgetting mode.
///
/// The forgetting fields of `options.forget` are ignored.
pub fn assemble(
    registry: &Registry,
    options: &LoaderOptions,
    spec: &ForgetSpec,
) -> Result<Loaders> {
    if options.batch_size == 0 {
        return Err(Error::ZeroBatchSize);
    }
    let parts = build_partitions(registry, options, spec)?;

    let base = DataLoaderConfig::default()
        .batch_size(options.batch_size)
        .num_workers(options.num_workers)
        .seed(options.seed);

    Ok(Loaders {
        train: DataLoader::new(parts.train, base.clone().shuffle(options.shuffle)),
        valid: DataLoader::new(parts.valid, base.clone().shuffle(false)),
        test: DataLoader::new(parts.test, base.shuffle(false)),
        forgotten: parts.forgotten,
    })
}

/// Everything [`assemble`] does except building the loaders.
pub fn build_partitions(
    registry: &Registry,
    options: &LoaderOptions,
    spec: &ForgetSpec,
) -> Result<Partitions> {
    let provider = registry.get(&options.dataset_name)?;
    let root = options.resolved_root()?;
    info!("loading {} from {}", options.dataset_name, root.display());
    let (train_set, mut test) = provider.load(&root, &options.provider)?;

    let partition = split_train_valid(&train_set, options.seed, &PartitionConfig::default())?;
    let mut train = partition.train;
    let valid = partition.valid;

    let forgotten = apply_forget_spec(&mut train, &mut test, spec, options)?;

    Ok(Partitions {
        train,
        valid,
        test,
        forgotten,
    })
}

fn apply_forget_spec(
    train: &mut LabeledArray,
    test: &mut LabeledArray,
    spec: &ForgetSpec,
    options: &LoaderOptions,
) -> Result<Vec<usize>> {
    let seed = options.forget_seed();
    let only_mark = options.only_mark;

    match spec {
        ForgetSpec::None => Ok(Vec::new()),
        ForgetSpec::ByClass { classes, count } => {
            let forgotten = replace_class(train, classes, *count, seed, only_mark)?;
            if count.is_none() {
                *test = remove_classes(test, classes)?;
                info!("removed classes {:?} from test, {} samples left", classes, test.len());
            }
            Ok(forgotten)
        }
        ForgetSpec::ClassConfusion { classes } => confuse_class(train, *classes, seed, only_mark),
        ForgetSpec::ByIndex { indexes } => {
            replace_indexes(train, indexes, seed, only_mark)?;
            Ok(indexes.clone())
        }
        ForgetSpec::Confuse {
            classes,
            count,
            split,
        } => {
            info!("confuse mode: classes {:?}, split {:?}", classes, split);
            let confused = confuse_sampled(train, *classes, *count, seed)?;
            if *split == ConfuseSplit::Forget {
                replace_indexes(train, &confused, seed, only_mark)?;
            }
            Ok(confused)
        }
    }
}
