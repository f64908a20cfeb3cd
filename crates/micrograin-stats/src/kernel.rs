//! Kernel-averaged misorientation
//!
//! For every eligible voxel the rectangular window of half-extents
//! `(kx, ky, kz)` is scanned, clipped at the grid faces. Each in-window voxel
//! of the same feature contributes its misorientation angle (degrees) to the
//! center and the output is the mean. The center itself is not sampled.
//! The window is clipped per axis before it is walked, so the work per voxel
//! never exceeds the grid size.

use crate::error::{StatsError, StatsResult};
use crate::voxel_map::map_voxels;
use micrograin_core::labels::BACKGROUND;
use micrograin_core::{CancelToken, DataArray, Outcome, VoxelGrid};
use std::ops::RangeInclusive;
use tracing::info;

/// Options for [`kernel_average_misorientations`]
#[derive(Debug, Clone)]
pub struct KernelOptions {
    /// Window half-extents along x, y and z in voxels
    pub half_extent: (usize, usize, usize),
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self {
            half_extent: (1, 1, 1),
        }
    }
}

impl KernelOptions {
    pub fn new(kx: usize, ky: usize, kz: usize) -> Self {
        Self {
            half_extent: (kx, ky, kz),
        }
    }

    /// Reject a window that holds only the center voxel
    pub fn validate(&self) -> StatsResult<()> {
        if self.half_extent == (0, 0, 0) {
            return Err(StatsError::InvalidParameters(
                "kernel half extent (0, 0, 0) samples no neighbors".to_string(),
            ));
        }
        Ok(())
    }
}

/// Window `[c - k, c + k]` clipped to `[0, n)`
fn clipped(c: usize, k: usize, n: usize) -> RangeInclusive<usize> {
    c.saturating_sub(k)..=c.saturating_add(k).min(n - 1)
}

/// Mean misorientation (degrees) of each voxel to its same-feature window
///
/// Voxels that are ineligible or unassigned (feature id 0), and voxels with
/// no same-feature sample in their window, get 0.
///
/// # Errors
///
/// Returns an error if `feature_ids` does not cover the grid with one
/// component, or the options are invalid.
pub fn kernel_average_misorientations(
    grid: &VoxelGrid<'_>,
    feature_ids: &DataArray<i32>,
    options: &KernelOptions,
    cancel: Option<&CancelToken>,
) -> StatsResult<Outcome<DataArray<f32>>> {
    options.validate()?;
    let geometry = *grid.geometry();
    geometry.check_tuples(feature_ids.name(), feature_ids.num_tuples())?;
    feature_ids.check_components(1)?;

    let (kx, ky, kz) = options.half_extent;
    let (nx, ny, nz) = geometry.dims();
    info!(kx, ky, kz, "kernel average misorientation started");

    let outcome = map_voxels(
        &geometry,
        "KernelAverageMisorientations",
        cancel,
        |idx| {
            let feature = feature_ids.value(idx);
            if feature == BACKGROUND || !grid.is_eligible(idx) {
                return 0.0;
            }
            let Some(ops) = grid.laue_ops(idx) else {
                return 0.0;
            };
            let center = grid.orientation(idx);
            let (x, y, z) = geometry.coords(idx);

            let mut total = 0.0;
            let mut count = 0usize;
            for zn in clipped(z, kz, nz) {
                for yn in clipped(y, ky, ny) {
                    for xn in clipped(x, kx, nx) {
                        let other = geometry.index(xn, yn, zn);
                        if other == idx
                            || feature_ids.value(other) != feature
                            || !grid.is_eligible(other)
                        {
                            continue;
                        }
                        total += ops
                            .misorientation_angle(&center, &grid.orientation(other))
                            .to_degrees();
                        count += 1;
                    }
                }
            }
            if count == 0 {
                0.0
            } else {
                (total / count as f64) as f32
            }
        },
    )?;

    info!(cancelled = outcome.cancelled, "kernel average misorientation finished");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use micrograin_core::nalgebra::Vector3;
    use micrograin_core::{CrystalStructure, Orientation};
    use micrograin_test::synthetic::SyntheticGrid;

    fn about_z(degrees: f64) -> Orientation {
        Orientation::from_axis_angle(&Vector3::z(), degrees.to_radians())
    }

    fn line(angles: &[f64]) -> SyntheticGrid {
        let mut s = SyntheticGrid::uniform(angles.len(), 1, 1, CrystalStructure::CubicHigh).unwrap();
        for (x, &a) in angles.iter().enumerate() {
            s.set_voxel((x, 0, 0), 1, &about_z(a));
        }
        s
    }

    #[test]
    fn test_uniform_grid_is_zero() {
        let s = SyntheticGrid::uniform(3, 3, 1, CrystalStructure::CubicHigh).unwrap();
        let grid = s.grid().unwrap();
        let ids = DataArray::with_value("FeatureIds", 9, 1, 1).unwrap();
        let out = kernel_average_misorientations(&grid, &ids, &KernelOptions::new(1, 1, 0), None)
            .unwrap();
        assert!(!out.cancelled);
        assert!(out.value.as_slice().iter().all(|&v| v.abs() < 1e-4));
    }

    #[test]
    fn test_gradient_mean() {
        let s = line(&[0.0, 1.0, 3.0]);
        let grid = s.grid().unwrap();
        let ids = DataArray::with_value("FeatureIds", 3, 1, 1).unwrap();
        let out = kernel_average_misorientations(&grid, &ids, &KernelOptions::new(1, 0, 0), None)
            .unwrap();
        let kam = out.value.as_slice();
        assert!((kam[0] - 1.0).abs() < 1e-3);
        assert!((kam[1] - 1.5).abs() < 1e-3);
        assert!((kam[2] - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_other_features_excluded() {
        let s = line(&[0.0, 1.0, 30.0]);
        let grid = s.grid().unwrap();
        let ids = DataArray::from_vec("FeatureIds", 1, vec![1, 1, 2]).unwrap();
        let out = kernel_average_misorientations(&grid, &ids, &KernelOptions::default(), None)
            .unwrap();
        let kam = out.value.as_slice();
        assert!((kam[0] - 1.0).abs() < 1e-3);
        assert!((kam[1] - 1.0).abs() < 1e-3);
        assert_eq!(kam[2], 0.0);
    }

    #[test]
    fn test_unassigned_center_is_zero() {
        let s = line(&[0.0, 1.0, 2.0]);
        let grid = s.grid().unwrap();
        let ids = DataArray::from_vec("FeatureIds", 1, vec![1, 0, 1]).unwrap();
        let out =
            kernel_average_misorientations(&grid, &ids, &KernelOptions::new(2, 0, 0), None).unwrap();
        let kam = out.value.as_slice();
        assert_eq!(kam[1], 0.0);
        assert!((kam[0] - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_window_larger_than_grid() {
        // Every voxel sees the whole line: [0, 1, 3] gives means 2, 1.5, 2.5
        let s = line(&[0.0, 1.0, 3.0]);
        let grid = s.grid().unwrap();
        let ids = DataArray::with_value("FeatureIds", 3, 1, 1).unwrap();
        let huge = KernelOptions::new(usize::MAX, usize::MAX, usize::MAX);
        let out = kernel_average_misorientations(&grid, &ids, &huge, None).unwrap();
        let full = kernel_average_misorientations(&grid, &ids, &KernelOptions::new(2, 0, 0), None)
            .unwrap();
        let kam = out.value.as_slice();
        assert_eq!(kam, full.value.as_slice());
        assert!((kam[0] - 2.0).abs() < 1e-3);
        assert!((kam[1] - 1.5).abs() < 1e-3);
        assert!((kam[2] - 2.5).abs() < 1e-3);
    }

    #[test]
    fn test_clipped_window() {
        assert_eq!(clipped(0, 1, 3), 0..=1);
        assert_eq!(clipped(2, 1, 3), 1..=2);
        assert_eq!(clipped(1, usize::MAX, 3), 0..=2);
        assert_eq!(clipped(0, 0, 1), 0..=0);
    }

    #[test]
    fn test_empty_window_rejected() {
        let err = KernelOptions::new(0, 0, 0).validate().unwrap_err();
        assert_eq!(err.code(), -4000);
        assert!(KernelOptions::default().validate().is_ok());
    }

    #[test]
    fn test_size_mismatch() {
        let s = line(&[0.0, 1.0]);
        let grid = s.grid().unwrap();
        let ids = DataArray::with_value("FeatureIds", 3, 1, 1).unwrap();
        let err = kernel_average_misorientations(&grid, &ids, &KernelOptions::default(), None)
            .unwrap_err();
        assert_eq!(err.code(), -1002);
    }

    #[test]
    fn test_cancelled() {
        let s = line(&[0.0, 1.0, 2.0]);
        let grid = s.grid().unwrap();
        let ids = DataArray::with_value("FeatureIds", 3, 1, 1).unwrap();
        let token = CancelToken::new();
        token.cancel();
        let out =
            kernel_average_misorientations(&grid, &ids, &KernelOptions::default(), Some(&token))
                .unwrap();
        assert!(out.cancelled);
        assert!(out.value.as_slice().iter().all(|&v| v == 0.0));
    }
}
