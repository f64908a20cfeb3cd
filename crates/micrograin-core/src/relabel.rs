//! Id permutations for relabeling
//!
//! A permutation is stored as a lookup table `perm[old] == new`. The
//! randomization passes only produce bijections on `[0, n)` that fix 0.

/// Inverse lookup table of a bijection
pub fn invert_permutation(perm: &[i32]) -> Vec<i32> {
    let mut inverse = vec![0; perm.len()];
    for (old, &new) in perm.iter().enumerate() {
        inverse[new as usize] = old as i32;
    }
    inverse
}

/// Whether `perm` is a bijection on `[0, perm.len())` that fixes 0
pub fn is_relabeling(perm: &[i32]) -> bool {
    let mut seen = vec![false; perm.len()];
    for &new in perm {
        match usize::try_from(new).ok().and_then(|i| seen.get_mut(i)) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    perm.first().is_none_or(|&first| first == 0)
}

/// Remap every id in `ids` through `perm`
///
/// Ids outside the table (negative sentinels, stale ids) are left untouched.
pub fn apply_permutation(ids: &mut [i32], perm: &[i32]) {
    for id in ids.iter_mut() {
        if let Some(&new) = usize::try_from(*id).ok().and_then(|i| perm.get(i)) {
            *id = new;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_relabeling() {
        assert!(is_relabeling(&[]));
        assert!(is_relabeling(&[0, 2, 1]));
        assert!(!is_relabeling(&[1, 0, 2]));
        assert!(!is_relabeling(&[0, 1, 1]));
        assert!(!is_relabeling(&[0, 3, 1]));
    }

    #[test]
    fn test_out_of_range_ids_untouched() {
        let perm = vec![0, 2, 1];
        let mut ids = vec![-1, 1, 2, 5];
        apply_permutation(&mut ids, &perm);
        assert_eq!(ids, vec![-1, 2, 1, 5]);
    }

    #[test]
    fn test_inverse_round_trip() {
        let perm = vec![0, 3, 1, 4, 2];
        let inverse = invert_permutation(&perm);
        let original = vec![0, 1, 2, 3, 4, 4, 0, -1];
        let mut ids = original.clone();
        apply_permutation(&mut ids, &perm);
        assert_ne!(ids, original);
        apply_permutation(&mut ids, &inverse);
        assert_eq!(ids, original);
    }
}
