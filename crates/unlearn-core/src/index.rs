// Index set algebra — which samples a transformation touches
//
// All functions are pure: they read a label slice (or an index pool) and
// return a fresh `Vec<usize>`. Random selection always goes through a
// caller-supplied `StdRng`, so the same seed and the same input order give
// the same output. Inputs that come from a set must be put in ascending
// order first; `complement` already returns them that way.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};

/// The generator behind every stochastic choice in the workspace.
pub fn rng_from_seed(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Ascending positions of `targets` equal to `class`.
pub fn indexes_of_class(targets: &[i64], class: i64) -> Vec<usize> {
    targets
        .iter()
        .enumerate()
        .filter(|&(_, &t)| t == class)
        .map(|(i, _)| i)
        .collect()
}

/// Indexes of every class in `classes`, concatenated in class-list order.
///
/// Within one class the dataset order is kept. A class listed twice
/// contributes its indexes twice.
pub fn indexes_of_classes(targets: &[i64], classes: &[i64]) -> Vec<usize> {
    classes
        .iter()
        .flat_map(|&c| indexes_of_class(targets, c))
        .collect()
}

/// `{0, .., total - 1}` minus `excluded`, ascending.
///
/// Excluded values outside the range are ignored.
pub fn complement(total: usize, excluded: &[usize]) -> Vec<usize> {
    let mut keep = vec![true; total];
    for &i in excluded {
        if i < total {
            keep[i] = false;
        }
    }
    keep.iter()
        .enumerate()
        .filter(|&(_, &k)| k)
        .map(|(i, _)| i)
        .collect()
}

/// Draw `amount` distinct elements of `pool`, uniformly at random.
pub fn choose_without_replacement(
    pool: &[usize],
    amount: usize,
    rng: &mut StdRng,
) -> Result<Vec<usize>> {
    if amount > pool.len() {
        return Err(Error::NotEnoughSamples {
            requested: amount,
            available: pool.len(),
        });
    }
    Ok(index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i])
        .collect())
}

/// Draw `amount` elements of `pool` independently; repeats are possible.
pub fn choose_with_replacement(
    pool: &[usize],
    amount: usize,
    rng: &mut StdRng,
) -> Result<Vec<usize>> {
    if pool.is_empty() && amount > 0 {
        return Err(Error::EmptyPool { requested: amount });
    }
    Ok((0..amount)
        .map(|_| pool[rng.gen_range(0..pool.len())])
        .collect())
}

/// Number of samples per label in `0..num_classes`; other labels are ignored.
pub fn class_counts(targets: &[i64], num_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; num_classes];
    for &t in targets {
        if t >= 0 && (t as usize) < num_classes {
            counts[t as usize] += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexes_of_classes_keeps_class_order() {
        let targets = [0, 1, 2, 1, 0, 2];
        assert_eq!(indexes_of_class(&targets, 1), vec![1, 3]);
        assert_eq!(indexes_of_classes(&targets, &[2, 0]), vec![2, 5, 0, 4]);
        assert!(indexes_of_classes(&targets, &[7]).is_empty());
    }

    #[test]
    fn test_complement() {
        assert_eq!(complement(6, &[4, 1, 9]), vec![0, 2, 3, 5]);
        assert_eq!(complement(3, &[]), vec![0, 1, 2]);
    }

    #[test]
    fn test_choose_without_replacement() {
        let pool = [10, 20, 30, 40, 50];
        let mut rng = rng_from_seed(3);
        let mut picked = choose_without_replacement(&pool, 5, &mut rng).unwrap();
        picked.sort_unstable();
        assert_eq!(picked, pool.to_vec());

        let err = choose_without_replacement(&pool, 6, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            Error::NotEnoughSamples {
                requested: 6,
                available: 5
            }
        ));
    }

    #[test]
    fn test_choose_is_seeded() {
        let pool: Vec<usize> = (0..100).collect();
        let a = choose_without_replacement(&pool, 10, &mut rng_from_seed(7)).unwrap();
        let b = choose_without_replacement(&pool, 10, &mut rng_from_seed(7)).unwrap();
        assert_eq!(a, b);
        let c = choose_with_replacement(&pool, 10, &mut rng_from_seed(7)).unwrap();
        let d = choose_with_replacement(&pool, 10, &mut rng_from_seed(7)).unwrap();
        assert_eq!(c, d);
    }

    #[test]
    fn test_choose_with_replacement_from_empty() {
        let mut rng = rng_from_seed(0);
        assert!(choose_with_replacement(&[], 0, &mut rng).unwrap().is_empty());
        assert!(matches!(
            choose_with_replacement(&[], 1, &mut rng),
            Err(Error::EmptyPool { requested: 1 })
        ));
    }

    #[test]
    fn test_class_counts() {
        assert_eq!(class_counts(&[0, 2, 2, -1, 5], 3), vec![1, 0, 2]);
    }
}
