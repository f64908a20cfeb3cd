//! Feature id randomization
//!
//! Shuffles feature ids after segmentation so neighboring features do not
//! carry consecutive ids. Id 0 (background) is never moved.

use micrograin_core::{DataArray, apply_permutation};
use rand::Rng;
use tracing::debug;

/// Random bijection on `[0, num_ids)` that fixes 0
///
/// Fisher-Yates over positions `1..num_ids`. `perm[old] == new`.
pub fn feature_id_permutation<R: Rng + ?Sized>(num_ids: usize, rng: &mut R) -> Vec<i32> {
    let mut perm: Vec<i32> = (0..num_ids as i32).collect();
    for i in (2..num_ids).rev() {
        let j = rng.gen_range(1..=i);
        perm.swap(i, j);
    }
    perm
}

/// Shuffle the ids `1..=feature_count` of a labeled grid in place
///
/// Returns the permutation applied.
pub fn randomize_feature_ids<R: Rng + ?Sized>(
    feature_ids: &mut DataArray<i32>,
    feature_count: usize,
    rng: &mut R,
) -> Vec<i32> {
    let perm = feature_id_permutation(feature_count + 1, rng);
    apply_permutation(feature_ids.as_mut_slice(), &perm);
    debug!(feature_count, "feature ids randomized");
    perm
}
