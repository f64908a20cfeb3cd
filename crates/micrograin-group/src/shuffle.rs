//! Parent id shuffling
//!
//! Parent ids are permuted by `num_ids - 1` independent random
//! transpositions: slot `i` swaps with a uniformly drawn slot in
//! `[1, num_ids)`. This is not Fisher-Yates and does not produce a uniform
//! permutation; the draw sequence is kept as is so a seeded run reproduces
//! the same parent ids. Id 0 is never moved.

use micrograin_core::{DataArray, apply_permutation};
use rand::Rng;
use tracing::debug;

/// Bijection on `[0, num_ids)` fixing 0, built from random transpositions
pub fn parent_id_permutation<R: Rng + ?Sized>(num_ids: usize, rng: &mut R) -> Vec<i32> {
    let mut perm: Vec<i32> = (0..num_ids as i32).collect();
    if num_ids < 2 {
        return perm;
    }
    for i in 1..num_ids {
        let r = rng.gen_range(1..num_ids);
        perm.swap(i, r);
    }
    perm
}

/// Shuffle parent ids `1..=parent_count` in both the feature and cell arrays
///
/// Returns the permutation applied.
pub fn randomize_parent_ids<R: Rng + ?Sized>(
    feature_parent_ids: &mut DataArray<i32>,
    cell_parent_ids: &mut DataArray<i32>,
    parent_count: usize,
    rng: &mut R,
) -> Vec<i32> {
    let perm = parent_id_permutation(parent_count + 1, rng);
    apply_permutation(feature_parent_ids.as_mut_slice(), &perm);
    apply_permutation(cell_parent_ids.as_mut_slice(), &perm);
    debug!(parent_count, "parent ids randomized");
    perm
}

#[cfg(test)]
mod tests {
    use super::*;
    use micrograin_core::is_relabeling;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_permutation_is_relabeling() {
        let mut rng = StdRng::seed_from_u64(21);
        for n in [0, 1, 2, 5, 64] {
            let perm = parent_id_permutation(n, &mut rng);
            assert_eq!(perm.len(), n);
            assert!(is_relabeling(&perm));
        }
    }

    #[test]
    fn test_reproducible() {
        let a = parent_id_permutation(30, &mut StdRng::seed_from_u64(8));
        let b = parent_id_permutation(30, &mut StdRng::seed_from_u64(8));
        assert_eq!(a, b);
    }

    #[test]
    fn test_feature_and_cell_ids_stay_consistent() {
        let mut features = DataArray::from_vec("FeatureParentIds", 1, vec![0, 1, 1, 2, 3]).unwrap();
        let feature_ids = [0, 1, 2, 2, 3, 4, 4];
        let cells: Vec<i32> = feature_ids
            .iter()
            .map(|&f| features.value(f as usize))
            .collect();
        let mut cells = DataArray::from_vec("CellParentIds", 1, cells).unwrap();

        let mut rng = StdRng::seed_from_u64(2);
        randomize_parent_ids(&mut features, &mut cells, 3, &mut rng);
        for (cell, &f) in feature_ids.iter().enumerate() {
            assert_eq!(cells.value(cell), features.value(f as usize));
        }
        assert_eq!(features.value(0), 0);
    }
}
