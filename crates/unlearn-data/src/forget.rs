// Forgetting — replace, mark or confuse selected training samples
//
// Two ways to forget a sample:
//
//   replace:  copy data *and* label of a randomly drawn retained sample over
//             it, so the forgotten content is physically gone;
//   mark:     keep the data, turn the label L into the tombstone -(L + 1).
//
// The tombstone is negative for every L >= 0 (including class 0), and the
// same formula maps it back: -(-(L + 1) + 1) = L.
//
// Confusion swaps labels between two classes for a subset of their samples
// before handing that subset to the replacement engine.

use log::{debug, info};
use rand::seq::SliceRandom;

use unlearn_core::index::{
    choose_with_replacement, choose_without_replacement, complement, indexes_of_class,
    indexes_of_classes, rng_from_seed,
};
use unlearn_core::{LabeledArray, Result};

/// Tombstone for label `label`: `-(label + 1)`.
pub fn mark_label(label: i64) -> i64 {
    -(label + 1)
}

/// Original label of a tombstone. The inverse of [`mark_label`].
pub fn unmark_label(marked: i64) -> i64 {
    -(marked + 1)
}

/// Whether `label` is a tombstone.
pub fn is_marked(label: i64) -> bool {
    label < 0
}

/// Forget the samples at `indexes`.
///
/// With `only_mark`, every selected label becomes its tombstone and the data
/// is left alone; an index listed more than once is still marked once.
/// Otherwise one substitute per selected index is drawn (with
/// replacement) from the samples *not* in `indexes`, using a generator
/// seeded with `seed`, and its data and label are copied over the selected
/// sample. Nothing outside `indexes` changes in either mode.
pub fn replace_indexes<T: Copy>(
    dataset: &mut LabeledArray<T>,
    indexes: &[usize],
    seed: u64,
    only_mark: bool,
) -> Result<()> {
    dataset.check_indexes(indexes)?;

    if only_mark {
        // A repeated index is marked once; marking twice restores the label.
        let mut distinct = indexes.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        for i in distinct {
            let label = dataset.target(i);
            dataset.set_target(i, mark_label(label))?;
        }
        return Ok(());
    }

    // Substitutes never come from the set being forgotten, so copying in
    // place can't read an already overwritten sample.
    let pool = complement(dataset.len(), indexes);
    let mut rng = rng_from_seed(seed);
    let substitutes = choose_with_replacement(&pool, indexes.len(), &mut rng)?;
    debug!("substitutes for {} forgotten samples: {:?}", indexes.len(), substitutes);

    for (&dst, &src) in indexes.iter().zip(&substitutes) {
        dataset.copy_sample(dst, src)?;
    }
    Ok(())
}

/// Forget samples of the given classes.
///
/// Collects every index whose label is in `classes` (class-list order, then
/// dataset order). With `count`, only that many of them, drawn without
/// replacement with a generator seeded with `seed`, are forgotten; asking for
/// more than exist is an error. Returns the forgotten indexes.
pub fn replace_class<T: Copy>(
    dataset: &mut LabeledArray<T>,
    classes: &[i64],
    count: Option<usize>,
    seed: u64,
    only_mark: bool,
) -> Result<Vec<usize>> {
    let mut indexes = indexes_of_classes(dataset.targets(), classes);

    if let Some(count) = count {
        let mut rng = rng_from_seed(seed);
        indexes = choose_without_replacement(&indexes, count, &mut rng)?;
        info!("Replacing indexes {:?}", indexes);
    }

    replace_indexes(dataset, &indexes, seed, only_mark)?;
    Ok(indexes)
}

/// Confuse half of two classes, then forget the confused samples.
///
/// The indexes of `a` and of `b` are each shuffled by a fresh generator
/// seeded with `seed` (so equally sized classes get the same permutation),
/// and the first `len / 2` of each are kept. Kept `a` samples are relabeled
/// `b` and kept `b` samples `a`; the kept indexes (`a` part first) then go
/// through [`replace_indexes`] with the same `seed` and `only_mark`.
pub fn confuse_class<T: Copy>(
    dataset: &mut LabeledArray<T>,
    [a, b]: [i64; 2],
    seed: u64,
    only_mark: bool,
) -> Result<Vec<usize>> {
    let mut indexes_a = indexes_of_class(dataset.targets(), a);
    let mut indexes_b = indexes_of_class(dataset.targets(), b);

    indexes_a.shuffle(&mut rng_from_seed(seed));
    indexes_b.shuffle(&mut rng_from_seed(seed));

    indexes_a.truncate(indexes_a.len() / 2);
    indexes_b.truncate(indexes_b.len() / 2);

    swap_labels(dataset, &indexes_a, &indexes_b, a, b)?;

    let mut indexes = indexes_a;
    indexes.extend(indexes_b);
    replace_indexes(dataset, &indexes, seed, only_mark)?;
    Ok(indexes)
}

/// Swap the labels of `count / 2` samples of `a` with `count / 2` of `b`.
///
/// One generator seeded with `seed` draws the `a` samples first, then the
/// `b` samples, each without replacement. Only labels change. Returns the
/// confused indexes, `a` part first.
pub fn confuse_sampled<T: Copy>(
    dataset: &mut LabeledArray<T>,
    [a, b]: [i64; 2],
    count: usize,
    seed: u64,
) -> Result<Vec<usize>> {
    let indexes_a = indexes_of_class(dataset.targets(), a);
    let indexes_b = indexes_of_class(dataset.targets(), b);

    let mut rng = rng_from_seed(seed);
    let sub_a = choose_without_replacement(&indexes_a, count / 2, &mut rng)?;
    let sub_b = choose_without_replacement(&indexes_b, count / 2, &mut rng)?;

    swap_labels(dataset, &sub_a, &sub_b, a, b)?;

    let mut indexes = sub_a;
    indexes.extend(sub_b);
    info!("confused indexes {:?}", indexes);
    Ok(indexes)
}

fn swap_labels<T: Copy>(
    dataset: &mut LabeledArray<T>,
    from_a: &[usize],
    from_b: &[usize],
    a: i64,
    b: i64,
) -> Result<()> {
    for &i in from_a {
        dataset.set_target(i, b)?;
    }
    for &i in from_b {
        dataset.set_target(i, a)?;
    }
    Ok(())
}

/// Drop every sample whose label is in `classes`, keeping the rest in order.
pub fn remove_classes<T: Copy>(
    dataset: &LabeledArray<T>,
    classes: &[i64],
) -> Result<LabeledArray<T>> {
    let removed = indexes_of_classes(dataset.targets(), classes);
    dataset.select(&complement(dataset.len(), &removed))
}
