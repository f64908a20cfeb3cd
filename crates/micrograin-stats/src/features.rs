//! Per-feature statistics
//!
//! Average orientations and phases of segmented features, plus the
//! per-voxel deviation from the feature average. These are the feature
//! arrays the grouping passes consume.

use crate::error::StatsResult;
use crate::voxel_map::{check_feature_ids, map_voxels};
use micrograin_core::labels::BACKGROUND;
use micrograin_core::{CancelToken, DataArray, Orientation, Outcome, VoxelGrid};
use tracing::info;

/// Mean orientation of each feature as `[x, y, z, w]`
///
/// Voxels are visited in index order. Before a voxel is added, its
/// quaternion is replaced by the symmetry equivalent closest to the running
/// mean of its feature, sign aligned. Slots without voxels (including slot 0)
/// hold the identity.
///
/// # Errors
///
/// Returns an error if `feature_ids` does not cover the grid or holds ids
/// outside `[0, num_features)`.
pub fn average_orientations(
    grid: &VoxelGrid<'_>,
    feature_ids: &DataArray<i32>,
    num_features: usize,
) -> StatsResult<DataArray<f32>> {
    check_feature_ids(grid.geometry(), feature_ids, num_features)?;

    let mut sums = vec![[0.0f64; 4]; num_features];
    let mut counts = vec![0usize; num_features];
    for idx in 0..grid.num_voxels() {
        let feature = feature_ids.value(idx);
        if feature == BACKGROUND || !grid.is_eligible(idx) {
            continue;
        }
        let Some(ops) = grid.laue_ops(idx) else {
            continue;
        };
        let f = feature as usize;
        let q = grid.orientation(idx);
        let aligned = if counts[f] == 0 {
            q
        } else {
            let [x, y, z, w] = sums[f];
            match Orientation::from_xyzw(x, y, z, w) {
                Ok(mean) => ops.nearest_equivalent(&mean, &q),
                Err(_) => q,
            }
        };
        let u = aligned.quaternion();
        let sum = &mut sums[f];
        sum[0] += u.i;
        sum[1] += u.j;
        sum[2] += u.k;
        sum[3] += u.w;
        counts[f] += 1;
    }

    let mut avg = DataArray::new("AvgQuats", num_features, 4)?;
    for (f, [x, y, z, w]) in sums.into_iter().enumerate() {
        let mean = Orientation::from_xyzw(x, y, z, w).unwrap_or_default();
        avg.tuple_mut(f).copy_from_slice(&mean.to_xyzw());
    }
    Ok(avg)
}

/// Phase of each feature, taken from its voxels (0 for empty slots)
///
/// # Errors
///
/// Same conditions as [`average_orientations`].
pub fn feature_phases(
    grid: &VoxelGrid<'_>,
    feature_ids: &DataArray<i32>,
    num_features: usize,
) -> StatsResult<DataArray<i32>> {
    check_feature_ids(grid.geometry(), feature_ids, num_features)?;
    let mut phases = DataArray::new("Phases", num_features, 1)?;
    for (idx, &feature) in feature_ids.as_slice().iter().enumerate() {
        if feature != BACKGROUND {
            phases.set_value(feature as usize, grid.phase(idx));
        }
    }
    Ok(phases)
}

/// Misorientation (degrees) of each voxel to its feature's average
///
/// Unassigned and ineligible voxels get 0.
///
/// # Errors
///
/// Returns an error if `avg_quats` does not have 4 components, or
/// `feature_ids` does not cover the grid or references a slot outside
/// `avg_quats`.
pub fn feature_reference_misorientations(
    grid: &VoxelGrid<'_>,
    feature_ids: &DataArray<i32>,
    avg_quats: &DataArray<f32>,
    cancel: Option<&CancelToken>,
) -> StatsResult<Outcome<DataArray<f32>>> {
    avg_quats.check_components(4)?;
    check_feature_ids(grid.geometry(), feature_ids, avg_quats.num_tuples())?;

    let references: Vec<Orientation> = (0..avg_quats.num_tuples())
        .map(|f| Orientation::from_tuple(avg_quats.tuple(f)).unwrap_or_default())
        .collect();

    let outcome = map_voxels(
        grid.geometry(),
        "FeatureReferenceMisorientations",
        cancel,
        |idx| {
            let feature = feature_ids.value(idx);
            if feature == BACKGROUND || !grid.is_eligible(idx) {
                return 0.0;
            }
            grid.laue_ops(idx).map_or(0.0, |ops| {
                ops.misorientation_angle(&grid.orientation(idx), &references[feature as usize])
                    .to_degrees() as f32
            })
        },
    )?;
    info!(
        features = references.len(),
        cancelled = outcome.cancelled,
        "feature reference misorientations finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use micrograin_core::CrystalStructure;
    use micrograin_core::nalgebra::Vector3;
    use micrograin_test::synthetic::SyntheticGrid;

    fn about_z(degrees: f64) -> Orientation {
        Orientation::from_axis_angle(&Vector3::z(), degrees.to_radians())
    }

    fn orientation_at(avg: &DataArray<f32>, f: usize) -> Orientation {
        Orientation::from_tuple(avg.tuple(f)).unwrap()
    }

    #[test]
    fn test_average_of_symmetric_spread() {
        let mut s = SyntheticGrid::uniform(2, 1, 1, CrystalStructure::CubicHigh).unwrap();
        s.set_voxel((0, 0, 0), 1, &about_z(5.0));
        s.set_voxel((1, 0, 0), 1, &about_z(-5.0));
        let grid = s.grid().unwrap();
        let ids = DataArray::with_value("FeatureIds", 2, 1, 1).unwrap();
        let avg = average_orientations(&grid, &ids, 2).unwrap();
        let mean = orientation_at(&avg, 1);
        assert!(mean.quaternion().angle_to(Orientation::identity().quaternion()) < 1e-4);
    }

    #[test]
    fn test_average_uses_nearest_equivalent() {
        let mut s = SyntheticGrid::uniform(2, 1, 1, CrystalStructure::CubicHigh).unwrap();
        s.set_voxel((1, 0, 0), 1, &about_z(92.0));
        let grid = s.grid().unwrap();
        let ids = DataArray::with_value("FeatureIds", 2, 1, 1).unwrap();
        let avg = average_orientations(&grid, &ids, 2).unwrap();
        let mean = orientation_at(&avg, 1);
        let expected = about_z(1.0);
        assert!(mean.quaternion().angle_to(expected.quaternion()) < 1e-4);
    }

    #[test]
    fn test_empty_slots_are_identity() {
        let s = SyntheticGrid::uniform(2, 1, 1, CrystalStructure::CubicHigh).unwrap();
        let grid = s.grid().unwrap();
        let ids = DataArray::from_vec("FeatureIds", 1, vec![1, 1]).unwrap();
        let avg = average_orientations(&grid, &ids, 3).unwrap();
        assert_eq!(avg.num_tuples(), 3);
        assert_eq!(avg.tuple(0), &[0.0, 0.0, 0.0, 1.0]);
        assert_eq!(avg.tuple(2), &[0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_feature_phases() {
        let table = [
            CrystalStructure::Unknown,
            CrystalStructure::CubicHigh,
            CrystalStructure::HexagonalHigh,
        ];
        let mut s = SyntheticGrid::with_structures(4, 1, 1, &table).unwrap();
        s.fill_region([(2, 4), (0, 1), (0, 1)], 2, &Orientation::identity())
            .unwrap();
        s.fill_region([(3, 4), (0, 1), (0, 1)], 0, &Orientation::identity())
            .unwrap();
        let grid = s.grid().unwrap();
        let ids = DataArray::from_vec("FeatureIds", 1, vec![1, 1, 2, 0]).unwrap();
        let phases = feature_phases(&grid, &ids, 3).unwrap();
        assert_eq!(phases.as_slice(), &[0, 1, 2]);
    }

    #[test]
    fn test_reference_misorientation() {
        let mut s = SyntheticGrid::uniform(3, 1, 1, CrystalStructure::CubicHigh).unwrap();
        s.set_voxel((0, 0, 0), 1, &about_z(-2.0));
        s.set_voxel((2, 0, 0), 1, &about_z(2.0));
        let grid = s.grid().unwrap();
        let ids = DataArray::from_vec("FeatureIds", 1, vec![1, 1, 0]).unwrap();
        let avg = average_orientations(&grid, &ids, 2).unwrap();
        let out = feature_reference_misorientations(&grid, &ids, &avg, None).unwrap();
        let dev = out.value.as_slice();
        assert!((dev[0] - 1.0).abs() < 1e-3);
        assert!((dev[1] - 1.0).abs() < 1e-3);
        assert_eq!(dev[2], 0.0);
    }

    #[test]
    fn test_feature_id_out_of_range() {
        let s = SyntheticGrid::uniform(2, 1, 1, CrystalStructure::CubicHigh).unwrap();
        let grid = s.grid().unwrap();
        let ids = DataArray::from_vec("FeatureIds", 1, vec![1, 4]).unwrap();
        assert_eq!(average_orientations(&grid, &ids, 2).unwrap_err().code(), -1001);
        assert_eq!(feature_phases(&grid, &ids, 2).unwrap_err().code(), -1001);
    }
}
