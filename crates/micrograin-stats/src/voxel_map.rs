//! Chunked parallel per-voxel maps
//!
//! Every per-voxel statistic in this crate is a pure function of read-only
//! inputs, so the output array is split into z-planes and each plane is
//! filled independently on the rayon pool. The cancellation flag is polled
//! once per plane; planes skipped after cancellation keep their zeros.

use crate::error::StatsResult;
use micrograin_core::{CancelToken, DataArray, Error, Geometry, Outcome};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// Fill a one-component `f32` cell array with `f(voxel_index)`
pub(crate) fn map_voxels<F>(
    geometry: &Geometry,
    name: &str,
    cancel: Option<&CancelToken>,
    f: F,
) -> StatsResult<Outcome<DataArray<f32>>>
where
    F: Fn(usize) -> f32 + Sync,
{
    let mut out = DataArray::new(name, geometry.num_voxels(), 1)?;
    let plane = geometry.plane_len();
    let skipped = AtomicBool::new(false);

    out.as_mut_slice()
        .par_chunks_mut(plane)
        .enumerate()
        .for_each(|(z, slab)| {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                skipped.store(true, Ordering::Relaxed);
                return;
            }
            let base = z * plane;
            for (i, value) in slab.iter_mut().enumerate() {
                *value = f(base + i);
            }
        });

    Ok(Outcome::new(out).with_cancelled(skipped.into_inner()))
}

/// Check that a cell feature id array covers the grid and stays in
/// `[0, num_features)`
pub(crate) fn check_feature_ids(
    geometry: &Geometry,
    feature_ids: &DataArray<i32>,
    num_features: usize,
) -> StatsResult<()> {
    geometry.check_tuples(feature_ids.name(), feature_ids.num_tuples())?;
    feature_ids.check_components(1)?;
    for &feature in feature_ids.as_slice() {
        if feature < 0 || feature as usize >= num_features {
            return Err(Error::IndexOutOfBounds {
                index: feature.max(0) as usize,
                len: num_features,
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_fills_every_plane() {
        let geom = Geometry::new(2, 3, 4).unwrap();
        let out = map_voxels(&geom, "Index", None, |idx| idx as f32).unwrap();
        assert!(!out.cancelled);
        for (idx, &v) in out.value.as_slice().iter().enumerate() {
            assert_eq!(v, idx as f32);
        }
    }

    #[test]
    fn test_cancelled_map_leaves_zeros() {
        let geom = Geometry::new(2, 2, 3).unwrap();
        let token = CancelToken::new();
        token.cancel();
        let out = map_voxels(&geom, "Ones", Some(&token), |_| 1.0).unwrap();
        assert!(out.cancelled);
        assert!(out.value.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_feature_id_range() {
        let geom = Geometry::new(3, 1, 1).unwrap();
        let ids = DataArray::from_vec("FeatureIds", 1, vec![0, 1, 2]).unwrap();
        assert!(check_feature_ids(&geom, &ids, 3).is_ok());
        let err = check_feature_ids(&geom, &ids, 2).unwrap_err();
        assert_eq!(err.code(), -1001);
    }
}
